//! Storage error taxonomy.
//!
//! DESIGN
//! ======
//! Nothing here is retried or recovered. Creation and setter calls return
//! these errors to the caller; the synced change handler has no caller and
//! logs them instead.

#[cfg(test)]
#[path = "error_test.rs"]
mod error_test;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// No storage facility is reachable (no window, storage disabled, access denied).
    #[error("storage is unavailable")]
    Unavailable,
    #[error("storage quota exceeded writing key `{key}`")]
    QuotaExceeded { key: String },
    /// The host refused the write for a reason other than quota.
    #[error("storage rejected write for key `{key}`: {reason}")]
    Rejected { key: String, reason: String },
    /// The stored text is not JSON, or not JSON of the expected shape.
    #[error("malformed value stored under key `{key}`: {source}")]
    Malformed {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode value for key `{key}`: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

impl StorageError {
    /// Stable machine-readable code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Unavailable => "E_STORAGE_UNAVAILABLE",
            Self::QuotaExceeded { .. } => "E_STORAGE_QUOTA",
            Self::Rejected { .. } => "E_STORAGE_REJECTED",
            Self::Malformed { .. } => "E_STORAGE_MALFORMED",
            Self::Encode { .. } => "E_STORAGE_ENCODE",
        }
    }

    /// Key the failure relates to, when there is one.
    pub fn key(&self) -> Option<&str> {
        match self {
            Self::Unavailable => None,
            Self::QuotaExceeded { key }
            | Self::Rejected { key, .. }
            | Self::Malformed { key, .. }
            | Self::Encode { key, .. } => Some(key),
        }
    }
}
