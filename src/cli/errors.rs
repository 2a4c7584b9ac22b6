//! CLI error types

use std::fmt;
use std::io;

use crate::batch::BatchError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Engine configuration file error
    ConfigError,
    /// I/O error (files, stdout)
    IoError,
    /// Batch plan is malformed
    PlanInvalid,
    /// The replayed batch failed
    BatchFailed,
    /// Async runtime could not start
    RuntimeFailed,
}

impl CliErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "SHARD_CLI_CONFIG_ERROR",
            Self::IoError => "SHARD_CLI_IO_ERROR",
            Self::PlanInvalid => "SHARD_CLI_PLAN_INVALID",
            Self::BatchFailed => "SHARD_CLI_BATCH_FAILED",
            Self::RuntimeFailed => "SHARD_CLI_RUNTIME_FAILED",
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ConfigError, msg)
    }

    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    pub fn plan_invalid(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::PlanInvalid, msg)
    }

    pub fn batch_failed(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::BatchFailed, msg)
    }

    pub fn runtime_failed(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::RuntimeFailed, msg)
    }

    pub fn code(&self) -> &CliErrorCode {
        &self.code
    }

    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::io_error(format!("JSON error: {}", e))
    }
}

impl From<BatchError> for CliError {
    fn from(e: BatchError) -> Self {
        Self::batch_failed(e.to_string())
    }
}

pub type CliResult<T> = Result<T, CliError>;
