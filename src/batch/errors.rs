//! Batch execution error types
//!
//! Error codes:
//! - SHARD_EXECUTION_FAILED (ERROR)
//! - SHARD_EXECUTION_TIMEOUT (ERROR)
//! - SHARD_WORKER_PANICKED (FATAL)
//! - SHARD_CONFIG_INVALID (ERROR)
//!
//! A batch either yields a full result array or exactly one `BatchError`.

use std::fmt;

use thiserror::Error;

/// Severity levels for batch errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Batch failed, engine remains usable
    Error,
    /// A worker died; engine state is suspect
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "ERROR"),
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchErrorCode {
    /// A unit's statement raised a failure
    ShardExecutionFailed,
    /// The whole batch exceeded its deadline
    ShardExecutionTimeout,
    /// A unit's worker panicked
    ShardWorkerPanicked,
    /// Engine configuration rejected
    ShardConfigInvalid,
}

impl BatchErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            BatchErrorCode::ShardExecutionFailed => "SHARD_EXECUTION_FAILED",
            BatchErrorCode::ShardExecutionTimeout => "SHARD_EXECUTION_TIMEOUT",
            BatchErrorCode::ShardWorkerPanicked => "SHARD_WORKER_PANICKED",
            BatchErrorCode::ShardConfigInvalid => "SHARD_CONFIG_INVALID",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            BatchErrorCode::ShardWorkerPanicked => Severity::Fatal,
            _ => Severity::Error,
        }
    }
}

impl fmt::Display for BatchErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Failure reported by a statement handle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StatementError {
    #[error("Driver error: {0}")]
    Driver(String),

    #[error("Statement closed")]
    Closed,

    #[error("Unsupported by driver: {0}")]
    Unsupported(String),
}

/// Batch error with full context
#[derive(Debug)]
pub struct BatchError {
    code: BatchErrorCode,
    message: String,
    /// Data source of the failing unit, if one is known
    data_source: Option<String>,
    source: Option<StatementError>,
}

impl BatchError {
    fn new(code: BatchErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data_source: None,
            source: None,
        }
    }

    /// Create an execution failed error
    pub fn execution_failed(reason: impl Into<String>) -> Self {
        Self::new(BatchErrorCode::ShardExecutionFailed, reason)
    }

    /// Wrap a statement failure raised on the given data source
    pub fn statement_failed(data_source: impl Into<String>, source: StatementError) -> Self {
        let data_source = data_source.into();
        Self {
            code: BatchErrorCode::ShardExecutionFailed,
            message: format!("Batch failed on data source '{}': {}", data_source, source),
            data_source: Some(data_source),
            source: Some(source),
        }
    }

    /// Create a timeout error
    pub fn timeout(timeout_ms: u64) -> Self {
        Self::new(
            BatchErrorCode::ShardExecutionTimeout,
            format!("Batch did not complete within {}ms", timeout_ms),
        )
    }

    /// Create a worker panic error
    pub fn worker_panicked(reason: impl Into<String>) -> Self {
        Self::new(BatchErrorCode::ShardWorkerPanicked, reason)
    }

    /// Create a configuration error
    pub fn config_invalid(reason: impl Into<String>) -> Self {
        Self::new(BatchErrorCode::ShardConfigInvalid, reason)
    }

    pub fn code(&self) -> BatchErrorCode {
        self.code
    }

    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the data source of the failing unit, if known
    pub fn data_source(&self) -> Option<&str> {
        self.data_source.as_deref()
    }

    /// Returns the underlying statement failure, if any
    pub fn statement_error(&self) -> Option<&StatementError> {
        self.source.as_ref()
    }

    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

impl fmt::Display for BatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.code.severity(),
            self.code.code(),
            self.message
        )
    }
}

impl std::error::Error for BatchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

/// Result type for batch operations
pub type BatchResult<T> = Result<T, BatchError>;
