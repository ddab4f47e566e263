use crate::settings::ShortenerSettings;
use async_trait::async_trait;
use jiff::Timestamp;
use shortlink_core::{
    Repository, ShortCode, ShortLink, Shortener, ShortenerError, StorageError,
};
use shortlink_generator::Generator;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// A concrete implementation of the `Shortener` trait.
///
/// This service wraps a `Repository` and a `Generator` to handle:
/// - URL validation
/// - Short code generation with collision retry
/// - Bounded retry of transient storage failures
///
/// Uniqueness is decided by the repository's atomic insert. A taken code comes
/// back as a conflict, the candidate is discarded and the generator is asked
/// for another, up to `max_attempts` candidates per request.
#[derive(Debug)]
pub struct ShortenerService<R, G> {
    repository: Arc<R>,
    generator: Arc<G>,
    settings: ShortenerSettings,
}

impl<R, G> Clone for ShortenerService<R, G> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            generator: Arc::clone(&self.generator),
            settings: self.settings.clone(),
        }
    }
}

impl<R: Repository, G: Generator> ShortenerService<R, G> {
    /// Creates a new `ShortenerService` with default settings.
    pub fn new(repository: R, generator: G) -> Self {
        Self::with_settings(repository, generator, ShortenerSettings::default())
    }

    pub fn with_settings(repository: R, generator: G, settings: ShortenerSettings) -> Self {
        Self {
            repository: Arc::new(repository),
            generator: Arc::new(generator),
            settings,
        }
    }

    pub fn settings(&self) -> &ShortenerSettings {
        &self.settings
    }

    fn candidate(&self, collisions: u32) -> ShortCode {
        if collisions == 0 {
            self.generator.generate().into()
        } else {
            self.generator.regenerate(collisions).into()
        }
    }

    /// Runs a storage call, retrying it while it fails transiently.
    ///
    /// Inserts are at-least-once: a transient error reported after the row
    /// committed makes the retry see a conflict, and the caller moves on to a
    /// fresh candidate, leaving the first row behind.
    async fn with_storage_retry<T, F, Fut>(
        &self,
        operation: &'static str,
        mut call: F,
    ) -> Result<T, StorageError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, StorageError>>,
    {
        let mut retries = 0;
        loop {
            match call().await {
                Err(err) if err.is_transient() && retries < self.settings.storage_retries => {
                    retries += 1;
                    warn!(operation, retries, error = %err, "transient storage error, retrying");
                    tokio::time::sleep(self.settings.storage_backoff * retries).await;
                }
                result => return result,
            }
        }
    }
}

/// A code that fails validation cannot belong to any stored link.
fn parse_code(code: &str) -> Result<ShortCode, ShortenerError> {
    ShortCode::new(code).map_err(|_| ShortenerError::NotFound(code.to_string()))
}

#[async_trait]
impl<R: Repository, G: Generator> Shortener for ShortenerService<R, G> {
    async fn create(&self, target_url: &str) -> Result<ShortLink, ShortenerError> {
        self.settings.url_policy.validate(target_url)?;

        // at least one candidate is always tried
        let max_attempts = self.settings.max_attempts.max(1);
        let mut collisions = 0;

        for attempt in 1..=max_attempts {
            let link = ShortLink {
                code: self.candidate(collisions),
                target_url: target_url.to_owned(),
                created_at: Timestamp::now(),
            };

            match self
                .with_storage_retry("insert", || self.repository.insert(&link))
                .await
            {
                Ok(()) => {
                    info!(code = %link.code, attempt, "created short link");
                    return Ok(link);
                }
                Err(StorageError::Conflict(_)) => {
                    collisions += 1;
                    debug!(code = %link.code, attempt, collisions, "short code collision");
                }
                Err(err) => {
                    warn!(code = %link.code, error = %err, "failed to store short link");
                    return Err(err.into());
                }
            }
        }

        warn!(attempts = max_attempts, "no free short code found");
        Err(ShortenerError::ExhaustedCapacity {
            attempts: max_attempts,
        })
    }

    async fn resolve(&self, code: &str) -> Result<String, ShortenerError> {
        let code = parse_code(code)?;

        match self
            .with_storage_retry("get", || self.repository.get(&code))
            .await?
        {
            Some(link) => Ok(link.target_url),
            None => Err(ShortenerError::NotFound(code.to_string())),
        }
    }

    async fn delete(&self, code: &str) -> Result<(), ShortenerError> {
        let code = parse_code(code)?;

        let deleted = self
            .with_storage_retry("delete", || self.repository.delete(&code))
            .await?;

        if !deleted {
            return Err(ShortenerError::NotFound(code.to_string()));
        }

        info!(code = %code, "deleted short link");
        Ok(())
    }
}
