//! Cart error types.

use thiserror::Error;
use trolley_store::StoreError;

/// Errors that can occur in cart operations.
///
/// Not-found conditions are not errors: lookups on missing keys return
/// `None`, and `update`/`remove` on a missing id are silent no-ops.
#[derive(Error, Debug)]
pub enum CartError {
    /// Invalid cart configuration, e.g. an empty session key.
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// A price or quantity value could not be parsed as numeric.
    #[error("Value is not numeric: {0}")]
    Format(String),

    /// An associated-model reference could not be resolved.
    #[error("Cannot instantiate associated model: {0}")]
    Instantiation(String),

    /// The session backend failed.
    #[error("Session store error: {0}")]
    Store(#[from] StoreError),

    /// A value could not be serialized or deserialized.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
