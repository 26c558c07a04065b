//! Store error types.

use thiserror::Error;

/// Errors that can occur when using a session store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The backend failed to perform an operation.
    #[error("Store operation failed: {0}")]
    Backend(String),

    /// Failed to serialize or deserialize a stored value.
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}
