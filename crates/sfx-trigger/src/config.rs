//! Trigger system configuration

use serde::{Deserialize, Serialize};
use sfx_core::{SfxError, SfxResult};

use crate::emitter::{DEFAULT_EMITTER_PREFIX, ReleaseTiming};

/// Default command queue capacity
pub const DEFAULT_COMMAND_QUEUE_CAPACITY: usize = 4096;

/// Default cap on in-flight sequences
pub const DEFAULT_MAX_ACTIVE_SEQUENCES: usize = 1024;

/// Trigger system configuration
///
/// Every field has a default, so partial JSON is accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TriggerConfig {
    /// Capacity of the handle → processor command queue
    pub command_queue_capacity: usize,
    /// In-flight sequences beyond this are dropped
    pub max_active_sequences: usize,
    /// Fixed RNG seed (`None` = seeded from the OS)
    pub rng_seed: Option<u64>,
    /// Diagnostic emitter names are `<prefix><serial>`
    pub emitter_name_prefix: String,
    /// When delayed one-shots are released
    pub release_timing: ReleaseTiming,
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self {
            command_queue_capacity: DEFAULT_COMMAND_QUEUE_CAPACITY,
            max_active_sequences: DEFAULT_MAX_ACTIVE_SEQUENCES,
            rng_seed: None,
            emitter_name_prefix: DEFAULT_EMITTER_PREFIX.to_string(),
            release_timing: ReleaseTiming::default(),
        }
    }
}

impl TriggerConfig {
    /// Deterministic configuration for tests and replays
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng_seed: Some(seed),
            ..Default::default()
        }
    }

    pub fn with_release_timing(mut self, timing: ReleaseTiming) -> Self {
        self.release_timing = timing;
        self
    }

    pub fn with_max_active_sequences(mut self, max: usize) -> Self {
        self.max_active_sequences = max;
        self
    }

    pub fn with_command_queue_capacity(mut self, capacity: usize) -> Self {
        self.command_queue_capacity = capacity;
        self
    }

    pub fn from_json(json: &str) -> SfxResult<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| SfxError::Serialization(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> SfxResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| SfxError::Serialization(e.to_string()))
    }

    pub fn validate(&self) -> SfxResult<()> {
        if self.command_queue_capacity == 0 {
            return Err(SfxError::Config(
                "command_queue_capacity must be > 0".into(),
            ));
        }
        if self.max_active_sequences == 0 {
            return Err(SfxError::Config("max_active_sequences must be > 0".into()));
        }
        Ok(())
    }
}
