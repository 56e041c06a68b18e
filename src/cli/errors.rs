//! CLI error types

use std::fmt;

/// CLI error with a stable code
#[derive(Debug)]
pub struct CliError {
    code: &'static str,
    message: String,
}

impl CliError {
    pub fn config_error(message: impl Into<String>) -> Self {
        Self {
            code: "CONFIG_ERROR",
            message: message.into(),
        }
    }

    pub fn io_error(message: impl Into<String>) -> Self {
        Self {
            code: "IO_ERROR",
            message: message.into(),
        }
    }

    pub fn pipeline_error(message: impl Into<String>) -> Self {
        Self {
            code: "PIPELINE_ERROR",
            message: message.into(),
        }
    }

    pub fn runtime_error(message: impl Into<String>) -> Self {
        Self {
            code: "RUNTIME_ERROR",
            message: message.into(),
        }
    }

    /// Stable code string
    pub fn code_str(&self) -> &'static str {
        self.code
    }

    /// Human-readable message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for CliError {}

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;
