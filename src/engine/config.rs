//! Execution engine configuration
//!
//! Loaded from a JSON file, immutable once the engine is built.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;

use crate::batch::{BatchError, BatchResult};

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Maximum units executing at once (default: available parallelism)
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// Deadline for the whole batch in milliseconds (default: none)
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

fn default_max_concurrency() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_concurrency: default_max_concurrency(),
            timeout_ms: None,
        }
    }
}

impl EngineConfig {
    /// Config with a fixed concurrency limit and no timeout
    pub fn with_concurrency(max_concurrency: usize) -> Self {
        Self {
            max_concurrency,
            timeout_ms: None,
        }
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    /// Load configuration from file
    pub fn load(path: &Path) -> BatchResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            BatchError::config_invalid(format!("Failed to read engine config: {}", e))
        })?;

        let config: EngineConfig = serde_json::from_str(&content).map_err(|e| {
            BatchError::config_invalid(format!("Invalid engine config JSON: {}", e))
        })?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> BatchResult<()> {
        if self.max_concurrency == 0 {
            return Err(BatchError::config_invalid("max_concurrency must be > 0"));
        }
        if self.max_concurrency > Semaphore::MAX_PERMITS {
            return Err(BatchError::config_invalid(format!(
                "max_concurrency must be <= {}",
                Semaphore::MAX_PERMITS
            )));
        }
        if self.timeout_ms == Some(0) {
            return Err(BatchError::config_invalid("timeout_ms must be > 0 when set"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::BatchErrorCode;
    use std::io::Write;

    #[test]
    fn test_default_config_is_valid() {
        let config = EngineConfig::default();
        assert!(config.max_concurrency >= 1);
        assert_eq!(config.timeout_ms, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let err = EngineConfig::with_concurrency(0).validate().unwrap_err();
        assert_eq!(err.code(), BatchErrorCode::ShardConfigInvalid);
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let config = EngineConfig::with_concurrency(2).with_timeout_ms(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_applies_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"timeout_ms": 500}}"#).unwrap();

        let config = EngineConfig::load(file.path()).unwrap();
        assert_eq!(config.timeout_ms, Some(500));
        assert!(config.max_concurrency >= 1);
    }

    #[test]
    fn test_load_rejects_bad_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        let err = EngineConfig::load(file.path()).unwrap_err();
        assert!(err.message().contains("Invalid engine config JSON"));
    }
}
