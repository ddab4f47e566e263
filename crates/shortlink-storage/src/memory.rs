use async_trait::async_trait;
use dashmap::mapref::entry::Entry as MapEntry;
use dashmap::DashMap;
use jiff::Timestamp;
use shortlink_core::repository::{ReadRepository, Repository, Result};
use shortlink_core::{DeletePolicy, ShortCode, ShortLink, StorageError};

/// In-memory storage entry for a link.
#[derive(Debug, Clone)]
struct Entry {
    target_url: String,
    created_at: Timestamp,
    deleted_at: Option<Timestamp>,
}

impl Entry {
    fn is_live(&self) -> bool {
        self.deleted_at.is_none()
    }

    fn to_link(&self, code: &ShortCode) -> ShortLink {
        ShortLink {
            code: code.clone(),
            target_url: self.target_url.clone(),
            created_at: self.created_at,
        }
    }
}

/// In-memory implementation of the Repository trait using DashMap.
///
/// DashMap provides better concurrency than RwLock<HashMap> because it
/// uses sharded locks, allowing concurrent reads and writes to different
/// buckets without blocking. Inserts go through the entry API, which holds the
/// shard's write lock across the vacancy check and the insert.
#[derive(Debug, Clone)]
pub struct InMemoryRepository {
    storage: DashMap<String, Entry>,
    delete_policy: DeletePolicy,
}

impl InMemoryRepository {
    /// Creates a new in-memory repository.
    pub fn new() -> Self {
        Self {
            storage: DashMap::new(),
            delete_policy: DeletePolicy::default(),
        }
    }

    /// Sets how deleted codes are handled.
    pub fn with_delete_policy(mut self, policy: DeletePolicy) -> Self {
        self.delete_policy = policy;
        self
    }

    /// Number of live links.
    pub fn len(&self) -> usize {
        self.storage.iter().filter(|e| e.is_live()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReadRepository for InMemoryRepository {
    async fn get(&self, code: &ShortCode) -> Result<Option<ShortLink>> {
        let Some(entry) = self.storage.get(code.as_str()) else {
            return Ok(None);
        };

        Ok(entry.is_live().then(|| entry.to_link(code)))
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn insert(&self, link: &ShortLink) -> Result<()> {
        // Tombstones keep occupying their slot, so they conflict too.
        match self.storage.entry(link.code.as_str().to_owned()) {
            MapEntry::Occupied(_) => Err(StorageError::Conflict(link.code.to_string())),
            MapEntry::Vacant(slot) => {
                slot.insert(Entry {
                    target_url: link.target_url.clone(),
                    created_at: link.created_at,
                    deleted_at: None,
                });
                Ok(())
            }
        }
    }

    async fn delete(&self, code: &ShortCode) -> Result<bool> {
        let key = code.as_str();

        match self.delete_policy {
            DeletePolicy::Release => Ok(self.storage.remove_if(key, |_, e| e.is_live()).is_some()),
            DeletePolicy::Tombstone => {
                let Some(mut entry) = self.storage.get_mut(key) else {
                    return Ok(false);
                };
                if !entry.is_live() {
                    return Ok(false);
                }
                entry.deleted_at = Some(Timestamp::now());
                Ok(true)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn code(s: &str) -> ShortCode {
        ShortCode::new_unchecked(s)
    }

    fn link(c: &str, url: &str) -> ShortLink {
        ShortLink {
            code: code(c),
            target_url: url.to_string(),
            created_at: Timestamp::now(),
        }
    }

    #[tokio::test]
    async fn save_and_get() {
        let repo = InMemoryRepository::new();
        let stored = link("abc123", "https://example.com");

        repo.insert(&stored).await.unwrap();

        let result = repo.get(&code("abc123")).await.unwrap().unwrap();
        assert_eq!(result, stored);
    }

    #[tokio::test]
    async fn get_nonexistent() {
        let repo = InMemoryRepository::new();

        let result = repo.get(&code("nope")).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn insert_conflict_keeps_original_target() {
        let repo = InMemoryRepository::new();

        repo.insert(&link("abc123", "https://example.com"))
            .await
            .unwrap();

        let err = repo
            .insert(&link("abc123", "https://other.com"))
            .await
            .unwrap_err();

        assert!(matches!(err, StorageError::Conflict(_)));
        let result = repo.get(&code("abc123")).await.unwrap().unwrap();
        assert_eq!(result.target_url, "https://example.com");
    }

    #[tokio::test]
    async fn delete_existing() {
        let repo = InMemoryRepository::new();

        repo.insert(&link("abc123", "https://example.com"))
            .await
            .unwrap();

        assert!(repo.delete(&code("abc123")).await.unwrap());
        assert!(repo.get(&code("abc123")).await.unwrap().is_none());
        assert!(repo.is_empty());
    }

    #[tokio::test]
    async fn delete_nonexistent() {
        let repo = InMemoryRepository::new();

        assert!(!repo.delete(&code("nope")).await.unwrap());
    }

    #[tokio::test]
    async fn tombstoned_code_is_never_reissued() {
        let repo = InMemoryRepository::new();

        repo.insert(&link("abc123", "https://example.com"))
            .await
            .unwrap();
        assert!(repo.delete(&code("abc123")).await.unwrap());
        assert!(!repo.delete(&code("abc123")).await.unwrap());

        let err = repo
            .insert(&link("abc123", "https://other.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Conflict(_)));
    }

    #[tokio::test]
    async fn released_code_can_be_reissued() {
        let repo = InMemoryRepository::new().with_delete_policy(DeletePolicy::Release);

        repo.insert(&link("abc123", "https://example.com"))
            .await
            .unwrap();
        assert!(repo.delete(&code("abc123")).await.unwrap());

        repo.insert(&link("abc123", "https://other.com"))
            .await
            .unwrap();
        let result = repo.get(&code("abc123")).await.unwrap().unwrap();
        assert_eq!(result.target_url, "https://other.com");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_inserts_of_same_code_have_one_winner() {
        let repo = Arc::new(InMemoryRepository::new());
        let mut handles = vec![];

        for i in 0..32u64 {
            let repo = Arc::clone(&repo);
            handles.push(tokio::spawn(async move {
                repo.insert(&link("same", &format!("https://example{}.com", i)))
                    .await
            }));
        }

        let mut wins = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(()) => wins += 1,
                Err(err) => assert!(matches!(err, StorageError::Conflict(_))),
            }
        }

        assert_eq!(wins, 1);
        assert_eq!(repo.len(), 1);
    }

    #[tokio::test]
    async fn concurrent_access() {
        let repo = Arc::new(InMemoryRepository::new());
        let mut handles = vec![];

        for i in 0..10u64 {
            let repo = Arc::clone(&repo);
            let handle = tokio::spawn(async move {
                repo.insert(&link(
                    &format!("code{:03}", i),
                    &format!("https://example{}.com", i),
                ))
                .await
                .unwrap();
            });
            handles.push(handle);
        }

        for i in 0..10u64 {
            let repo = Arc::clone(&repo);
            let handle = tokio::spawn(async move {
                let _ = repo.get(&code(&format!("code{:03}", i))).await;
            });
            handles.push(handle);
        }

        for handle in handles {
            handle.await.unwrap();
        }

        for i in 0..10u64 {
            let result = repo
                .get(&code(&format!("code{:03}", i)))
                .await
                .unwrap()
                .unwrap();
            assert_eq!(result.target_url, format!("https://example{}.com", i));
        }
    }
}
