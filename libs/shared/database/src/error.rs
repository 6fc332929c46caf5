use thiserror::Error;

/// Failures at the persistence boundary.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    /// Timeouts, connection failures and 5xx responses. Safe to retry.
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// A uniqueness constraint or an optimistic guard rejected the write.
    #[error("Store write conflict: {0}")]
    Conflict(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    /// The store refused the request (4xx other than 404/409).
    #[error("Store rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Failed to decode store response: {0}")]
    Decode(String),
}

impl StoreError {
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Unavailable(_))
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Decode(err.to_string())
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            StoreError::Decode(err.to_string())
        } else {
            StoreError::Unavailable(err.to_string())
        }
    }
}
