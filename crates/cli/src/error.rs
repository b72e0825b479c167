//! CLI error types.

use std::fmt;

use error_stack::Report;
use msq_adapter_common::error::AdapterError;

#[derive(Debug)]
pub enum CliError {
    /// Configuration file error
    Config(String),
    /// Input file could not be decoded
    Input(String),
    /// IO error
    Io(std::io::Error),
    /// HTTP request error
    Http(String),
    /// Adapter operation failed
    Adapter(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::Input(msg) => write!(f, "Input error: {}", msg),
            CliError::Io(err) => write!(f, "IO error: {}", err),
            CliError::Http(msg) => write!(f, "HTTP error: {}", msg),
            CliError::Adapter(msg) => write!(f, "Adapter error: {}", msg),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::Io(err)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        CliError::Input(err.to_string())
    }
}

impl From<ureq::Error> for CliError {
    fn from(err: ureq::Error) -> Self {
        CliError::Http(err.to_string())
    }
}

impl From<Report<AdapterError>> for CliError {
    fn from(report: Report<AdapterError>) -> Self {
        CliError::Adapter(format!("{report:?}"))
    }
}
