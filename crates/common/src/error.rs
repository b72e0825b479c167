//! Error types for the Mediasquare adapter.
//!
//! Fallible operations return `Result<T, Report<AdapterError>>` so callers get
//! the full context chain from `error-stack`.

use derive_more::{Display, Error};

#[derive(Debug, Display, Error)]
pub enum AdapterError {
    /// Settings could not be loaded or failed validation.
    #[display("Configuration error: {message}")]
    Configuration { message: String },

    /// A bid request handed over by the host is unusable.
    #[display("Invalid request: {message}")]
    InvalidRequest { message: String },

    /// The outbound payload could not be serialized.
    #[display("Serialization error: {message}")]
    Serialization { message: String },
}
