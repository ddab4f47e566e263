use crate::error::StorageError;
use crate::shortcode::ShortCode;
use async_trait::async_trait;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// Result type for repository operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// A stored mapping from a short code to its target URL.
///
/// The binding is immutable once stored; a new target means a new link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShortLink {
    /// The unique short code, primary key of the mapping.
    pub code: ShortCode,
    /// The original URL that was shortened.
    pub target_url: String,
    /// When the link was created.
    pub created_at: Timestamp,
}

/// What happens to a code's slot when its link is deleted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DeletePolicy {
    /// The record is marked deleted and the code is never issued again.
    #[default]
    Tombstone,
    /// The record is removed and the code becomes free for reuse.
    Release,
}

/// A read-only view of a repository.
#[async_trait]
pub trait ReadRepository: Send + Sync + 'static {
    /// Retrieves the live link for a given short code.
    /// Returns `None` if the code does not exist or was deleted.
    async fn get(&self, code: &ShortCode) -> Result<Option<ShortLink>>;
}

#[async_trait]
pub trait Repository: ReadRepository {
    /// Inserts a new link if its code is absent.
    ///
    /// The check and the insert must be a single atomic step against the
    /// unique key. Returns `Err(StorageError::Conflict)` if the code is taken.
    async fn insert(&self, link: &ShortLink) -> Result<()>;

    /// Deletes the link for a given short code according to the
    /// repository's [`DeletePolicy`].
    /// Returns `true` if a live record existed and was removed.
    async fn delete(&self, code: &ShortCode) -> Result<bool>;
}
