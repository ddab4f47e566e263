use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("invalid short code: {0}")]
    InvalidShortCode(String),
}

/// Errors reported by a [`Repository`](crate::Repository) backend.
#[derive(Debug, Clone, Error)]
pub enum StorageError {
    /// The code is already taken. This is a retry signal for the create loop,
    /// never a caller-facing failure.
    #[error("short code already exists: {0}")]
    Conflict(String),
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),
    #[error("storage operation timed out: {0}")]
    Timeout(String),
    #[error("storage query failed: {0}")]
    Query(String),
    #[error("stored data is invalid: {0}")]
    InvalidData(String),
}

impl StorageError {
    /// Whether retrying the same operation may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, StorageError::Unavailable(_) | StorageError::Timeout(_))
    }
}

/// Errors surfaced to callers of a [`Shortener`](crate::Shortener).
///
/// Callers branch on the variant (e.g. `NotFound` to 404, `InvalidInput` to 400),
/// so the kinds are kept distinct all the way up.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ShortenerError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("no free short code found after {attempts} attempts")]
    ExhaustedCapacity { attempts: u32 },
    #[error("short code not found: {0}")]
    NotFound(String),
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),
}

impl From<StorageError> for ShortenerError {
    fn from(value: StorageError) -> Self {
        ShortenerError::StorageUnavailable(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_kinds() {
        assert!(StorageError::Unavailable("io".into()).is_transient());
        assert!(StorageError::Timeout("busy".into()).is_transient());
        assert!(!StorageError::Conflict("abc".into()).is_transient());
        assert!(!StorageError::Query("syntax".into()).is_transient());
        assert!(!StorageError::InvalidData("bad".into()).is_transient());
    }

    #[test]
    fn storage_error_becomes_unavailable() {
        let err: ShortenerError = StorageError::Timeout("pool".into()).into();
        assert!(matches!(err, ShortenerError::StorageUnavailable(msg) if msg.contains("pool")));
    }
}
