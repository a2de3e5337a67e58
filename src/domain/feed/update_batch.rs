//! Incremental change set delivered by the upstream feed.

use serde::{Deserialize, Serialize};

use super::Entity;
use crate::domain::foundation::Timestamp;

/// One incremental change set.
///
/// `batch_uuid` is the idempotency key the bridge records after forwarding;
/// `batch_id` is the human-readable batch number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBatch {
    #[serde(rename = "createdTime")]
    pub created_at: Timestamp,
    pub changes: Vec<Entity>,
    pub batch_id: String,
    pub batch_uuid: String,
}

impl UpdateBatch {
    pub fn new(
        created_at: Timestamp,
        changes: Vec<Entity>,
        batch_id: impl Into<String>,
        batch_uuid: impl Into<String>,
    ) -> Self {
        Self {
            created_at,
            changes,
            batch_id: batch_id.into(),
            batch_uuid: batch_uuid.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserializes_wire_payload() {
        let batch: UpdateBatch = serde_json::from_value(json!({
            "createdTime": "2024-01-15T10:30:00.000Z",
            "changes": [
                {"entityClass": "Change", "name": "Change1", "typeId": "1", "id": "42", "version": 50}
            ],
            "batchId": "24",
            "batchUuid": "2424"
        }))
        .unwrap();

        assert_eq!(batch.batch_uuid, "2424");
        assert_eq!(batch.batch_id, "24");
        assert_eq!(batch.len(), 1);
        assert_eq!(batch.changes[0].version, 50);
    }

    #[test]
    fn serializes_created_at_as_created_time() {
        let batch = UpdateBatch::new(Timestamp::now(), vec![], "24", "b1");
        let json = serde_json::to_value(&batch).unwrap();

        assert!(json.get("createdTime").is_some());
        assert!(json.get("createdAt").is_none());
        assert_eq!(json["batchUuid"], "b1");
    }

    #[test]
    fn created_time_is_reemitted_byte_identical() {
        let batch: UpdateBatch = serde_json::from_value(json!({
            "createdTime": "2024-01-15T10:30:00.000Z",
            "changes": [],
            "batchId": "24",
            "batchUuid": "b1"
        }))
        .unwrap();

        let json = serde_json::to_value(&batch).unwrap();

        assert_eq!(json["createdTime"], "2024-01-15T10:30:00.000Z");
    }
}
