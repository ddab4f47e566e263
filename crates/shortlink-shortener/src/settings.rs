use shortlink_core::ShortenerError;
use std::time::Duration;
use typed_builder::TypedBuilder;
use url::Url;

/// Tuning knobs for [`ShortenerService`](crate::ShortenerService).
#[derive(Debug, Clone, TypedBuilder)]
pub struct ShortenerSettings {
    /// Candidate codes tried per create request before giving up with
    /// `ExhaustedCapacity`.
    #[builder(default = 8)]
    pub max_attempts: u32,
    /// Retries of a single storage call that failed transiently.
    #[builder(default = 3)]
    pub storage_retries: u32,
    /// Base delay between transient retries; the n-th retry waits n times this.
    #[builder(default = Duration::from_millis(20))]
    pub storage_backoff: Duration,
    #[builder(default)]
    pub url_policy: UrlPolicy,
}

impl Default for ShortenerSettings {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Which target URLs are accepted.
///
/// Targets must be absolute URLs with a host. Relative URLs are always
/// rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlPolicy {
    allowed_schemes: Vec<String>,
}

impl Default for UrlPolicy {
    fn default() -> Self {
        Self::with_schemes(["http", "https"])
    }
}

impl UrlPolicy {
    /// Accepts the given schemes (compared case-insensitively).
    pub fn with_schemes<I, S>(schemes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            allowed_schemes: schemes
                .into_iter()
                .map(|s| s.as_ref().to_ascii_lowercase())
                .collect(),
        }
    }

    pub fn allowed_schemes(&self) -> &[String] {
        &self.allowed_schemes
    }

    /// Checks that `target` is a usable absolute URL.
    pub fn validate(&self, target: &str) -> Result<Url, ShortenerError> {
        if target.trim().is_empty() {
            return Err(ShortenerError::InvalidInput(
                "URL cannot be empty".to_string(),
            ));
        }

        // Url::parse would silently trim or percent-encode these
        if target.chars().any(|c| c.is_ascii_whitespace()) {
            return Err(ShortenerError::InvalidInput(format!(
                "URL must not contain whitespace: {:?}",
                target
            )));
        }

        let url = Url::parse(target).map_err(|e| {
            ShortenerError::InvalidInput(format!("not an absolute URL '{}': {e}", target))
        })?;

        // Url lowercases the scheme while parsing
        if !self.allowed_schemes.iter().any(|s| s == url.scheme()) {
            return Err(ShortenerError::InvalidInput(format!(
                "URL scheme must be one of [{}]: {}",
                self.allowed_schemes.join(", "),
                url.scheme()
            )));
        }

        if !url.has_host() {
            return Err(ShortenerError::InvalidInput(format!(
                "URL must have a host: {}",
                target
            )));
        }

        Ok(url)
    }
}
