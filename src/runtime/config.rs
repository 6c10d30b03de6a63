use std::{fs, io, path::Path};

use serde::{Deserialize, Serialize};

/// Root stack capacity used when none is configured.
pub const DEFAULT_STACK_CAPACITY: usize = 256;

/// Floor for the collection threshold. Also the threshold a fresh heap starts
/// with.
pub const DEFAULT_MIN_THRESHOLD: usize = 8;

/// VM and collector configuration.
///
/// Every field is optional in JSON; missing fields take their defaults.
///
/// ```json
/// { "stack_capacity": 1024, "min_threshold": 64, "gc_enabled": true }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GcConfig {
    /// Maximum number of root-stack entries.
    pub stack_capacity: usize,
    /// Lower bound of the collection threshold.
    pub min_threshold: usize,
    /// When false, allocation never triggers a collection. Explicit
    /// collections still run.
    pub gc_enabled: bool,
}

impl Default for GcConfig {
    fn default() -> Self {
        Self {
            stack_capacity: DEFAULT_STACK_CAPACITY,
            min_threshold: DEFAULT_MIN_THRESHOLD,
            gc_enabled: true,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] io::Error),

    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: stack_capacity must be at least 1")]
    ZeroStackCapacity,

    #[error("invalid config: min_threshold must be at least 1")]
    ZeroMinThreshold,
}

impl GcConfig {
    pub fn with_stack_capacity(mut self, stack_capacity: usize) -> Self {
        self.stack_capacity = stack_capacity;
        self
    }

    pub fn with_min_threshold(mut self, min_threshold: usize) -> Self {
        self.min_threshold = min_threshold;
        self
    }

    pub fn with_gc_enabled(mut self, gc_enabled: bool) -> Self {
        self.gc_enabled = gc_enabled;
        self
    }

    /// Parses and validates a JSON config document.
    pub fn from_json(source: &str) -> Result<Self, ConfigError> {
        let config: GcConfig = serde_json::from_str(source)?;
        config.validate()
    }

    /// Reads, parses and validates a JSON config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let source = fs::read_to_string(path)?;
        Self::from_json(&source)
    }

    pub fn validate(self) -> Result<Self, ConfigError> {
        if self.stack_capacity == 0 {
            return Err(ConfigError::ZeroStackCapacity);
        }
        if self.min_threshold == 0 {
            return Err(ConfigError::ZeroMinThreshold);
        }
        Ok(self)
    }
}
