//! Full snapshot of entities sent once per activation cycle.

use serde::{Deserialize, Deserializer, Serialize};

use super::Entity;

/// A snapshot batch delivered by the upstream feed after it starts.
///
/// Forwarded verbatim and never retained by the bridge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitialDump {
    /// Whether the snapshot is fully delivered.
    #[serde(rename = "dumpComplete")]
    pub complete: bool,
    pub entities: Vec<Entity>,
    pub batch_id: String,
    /// Remaining snapshot batches. Best-effort metadata: feeds have been
    /// seen sending it as a numeric string, so both forms are accepted.
    #[serde(deserialize_with = "lenient_count")]
    pub batches_left: u64,
}

impl InitialDump {
    /// Creates a dump, taking `batches_left` as reported by the feed.
    pub fn new(
        complete: bool,
        entities: Vec<Entity>,
        batch_id: impl Into<String>,
        batches_left: u64,
    ) -> Self {
        Self {
            complete,
            entities,
            batch_id: batch_id.into(),
            batches_left,
        }
    }

    /// A complete dump should report no batches left.
    pub fn is_consistent(&self) -> bool {
        !self.complete || self.batches_left == 0
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

fn lenient_count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Count {
        Number(u64),
        Text(String),
    }

    match Count::deserialize(deserializer)? {
        Count::Number(n) => Ok(n),
        Count::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn serializes_with_wire_field_names() {
        let dump = InitialDump::new(true, vec![Entity::new("User", "User1", "1", "1000", 100)], "42", 0);
        let json = serde_json::to_value(&dump).unwrap();

        assert_eq!(json["dumpComplete"], true);
        assert_eq!(json["batchId"], "42");
        assert_eq!(json["batchesLeft"], 0);
        assert_eq!(json["entities"][0]["name"], "User1");
    }

    #[test]
    fn accepts_batches_left_as_numeric_string() {
        let dump: InitialDump = serde_json::from_value(json!({
            "dumpComplete": false,
            "entities": [],
            "batchId": "42",
            "batchesLeft": "4242"
        }))
        .unwrap();

        assert_eq!(dump.batches_left, 4242);
        assert!(dump.is_empty());
    }

    #[test]
    fn rejects_non_numeric_batches_left() {
        let result = serde_json::from_value::<InitialDump>(json!({
            "dumpComplete": false,
            "entities": [],
            "batchId": "42",
            "batchesLeft": "many"
        }));

        assert!(result.is_err());
    }

    #[test]
    fn complete_dump_with_batches_left_is_inconsistent() {
        assert!(InitialDump::new(true, vec![], "1", 0).is_consistent());
        assert!(InitialDump::new(false, vec![], "1", 3).is_consistent());
        assert!(!InitialDump::new(true, vec![], "1", 3).is_consistent());
    }
}
