//! Broadcast hub configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Buffer sizes for the subscriber fan-out
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct BroadcastConfig {
    /// Events buffered per subscriber before the slowest ones skip ahead
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,

    /// Presence notifications buffered for the lifecycle controller
    #[serde(default = "default_presence_capacity")]
    pub presence_capacity: usize,
}

impl BroadcastConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.channel_capacity == 0 {
            return Err(ValidationError::InvalidCapacity("channel_capacity"));
        }
        if self.presence_capacity == 0 {
            return Err(ValidationError::InvalidCapacity("presence_capacity"));
        }
        Ok(())
    }
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            channel_capacity: default_channel_capacity(),
            presence_capacity: default_presence_capacity(),
        }
    }
}

fn default_channel_capacity() -> usize {
    256
}

fn default_presence_capacity() -> usize {
    64
}
