use crate::repository::ShortLink;
use async_trait::async_trait;

type Result<T> = std::result::Result<T, crate::error::ShortenerError>;

/// The engine interface exposed to callers (an HTTP layer, a CLI, ...).
#[async_trait]
pub trait Shortener: Send + Sync + 'static {
    /// Creates a new short link for `target_url` under a fresh, unique code.
    async fn create(&self, target_url: &str) -> Result<ShortLink>;

    /// Resolves a short code to its target URL.
    /// Fails with `NotFound` if no live link has that code.
    async fn resolve(&self, code: &str) -> Result<String>;

    /// Deletes a short link by its short code.
    /// Fails with `NotFound` if no live link has that code.
    async fn delete(&self, code: &str) -> Result<()>;
}
