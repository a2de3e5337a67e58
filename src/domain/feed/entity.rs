//! Entity value object carried by dumps and update batches.

use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

/// A single versioned record within a snapshot or update batch.
///
/// Identity is `(entity_class, id)`; `version` grows monotonically per
/// identity so consumers can discard stale updates. Two entities are equal
/// when class, id and version match, regardless of `name` or `type_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    pub entity_class: String,
    pub name: String,
    pub type_id: String,
    pub id: String,
    pub version: u64,
}

impl Entity {
    /// Creates an entity from its five attributes.
    pub fn new(
        entity_class: impl Into<String>,
        name: impl Into<String>,
        type_id: impl Into<String>,
        id: impl Into<String>,
        version: u64,
    ) -> Self {
        Self {
            entity_class: entity_class.into(),
            name: name.into(),
            type_id: type_id.into(),
            id: id.into(),
            version,
        }
    }

    /// Returns true when both entities describe the same record identity.
    pub fn same_identity(&self, other: &Entity) -> bool {
        self.entity_class == other.entity_class && self.id == other.id
    }

    /// Returns true when `self` is a newer version of `other`'s record.
    pub fn supersedes(&self, other: &Entity) -> bool {
        self.same_identity(other) && self.version > other.version
    }
}

impl PartialEq for Entity {
    fn eq(&self, other: &Self) -> bool {
        self.entity_class == other.entity_class
            && self.id == other.id
            && self.version == other.version
    }
}

impl Eq for Entity {}

impl Hash for Entity {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.entity_class.hash(state);
        self.id.hash(state);
        self.version.hash(state);
    }
}
