//! Bridge lifecycle vocabulary.

mod lifecycle_state;

pub use lifecycle_state::LifecycleState;
