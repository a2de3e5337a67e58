//! Lifecycle states of the bridge as seen by the controller.

use serde::Serialize;
use std::fmt;

use crate::domain::foundation::StateMachine;

/// Whether the upstream feed is currently wanted.
///
/// `Idle` means no subscribers and an inactive bridge; `Active` means at
/// least one subscriber and a started bridge. There is no terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleState {
    #[default]
    Idle,
    Active,
}

impl LifecycleState {
    pub fn is_active(&self) -> bool {
        matches!(self, LifecycleState::Active)
    }
}

impl StateMachine for LifecycleState {
    fn can_transition_to(&self, target: &Self) -> bool {
        use LifecycleState::*;
        matches!((self, target), (Idle, Active) | (Active, Idle))
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use LifecycleState::*;
        match self {
            Idle => vec![Active],
            Active => vec![Idle],
        }
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LifecycleState::Idle => write!(f, "idle"),
            LifecycleState::Active => write!(f, "active"),
        }
    }
}
