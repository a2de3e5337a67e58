//! Upstream feed configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Upstream feed configuration
///
/// Host, port and subscription name are passed through to the feed as
/// opaque strings.
#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamConfig {
    /// Push connector host
    pub host: String,

    /// Push connector port
    pub port: String,

    /// Subscription identifier requested when the bridge starts
    pub subscription_name: String,

    /// Settings for the built-in synthetic feed
    #[serde(default)]
    pub synthetic: SyntheticFeedConfig,
}

impl UpstreamConfig {
    /// `host:port` of the push connector
    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Validate upstream configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.host.trim().is_empty() {
            return Err(ValidationError::MissingRequired("UPSTREAM__HOST"));
        }
        if self.port.trim().is_empty() {
            return Err(ValidationError::MissingRequired("UPSTREAM__PORT"));
        }
        if self.subscription_name.trim().is_empty() {
            return Err(ValidationError::MissingRequired("UPSTREAM__SUBSCRIPTION_NAME"));
        }
        self.synthetic.validate()
    }
}

/// Timing and volume of the synthetic feed
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct SyntheticFeedConfig {
    /// Seconds between initial dumps
    #[serde(default = "default_dump_interval")]
    pub dump_interval_secs: u64,

    /// Seconds between update batches
    #[serde(default = "default_update_interval")]
    pub update_interval_secs: u64,

    /// Entities per initial dump
    #[serde(default = "default_dump_entities")]
    pub dump_entities: usize,

    /// Changes per update batch
    #[serde(default = "default_update_changes")]
    pub update_changes: usize,
}

impl SyntheticFeedConfig {
    pub fn dump_interval(&self) -> Duration {
        Duration::from_secs(self.dump_interval_secs)
    }

    pub fn update_interval(&self) -> Duration {
        Duration::from_secs(self.update_interval_secs)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.dump_interval_secs == 0 {
            return Err(ValidationError::InvalidInterval("dump_interval_secs"));
        }
        if self.update_interval_secs == 0 {
            return Err(ValidationError::InvalidInterval("update_interval_secs"));
        }
        Ok(())
    }
}

impl Default for SyntheticFeedConfig {
    fn default() -> Self {
        Self {
            dump_interval_secs: default_dump_interval(),
            update_interval_secs: default_update_interval(),
            dump_entities: default_dump_entities(),
            update_changes: default_update_changes(),
        }
    }
}

fn default_dump_interval() -> u64 {
    10
}

fn default_update_interval() -> u64 {
    6
}

fn default_dump_entities() -> usize {
    15
}

fn default_update_changes() -> usize {
    20
}
