use std::collections::HashSet;
use std::sync::Arc;

use jiff::Timestamp;
use shortlink_core::{ShortCode, ShortLink};
use shortlink_storage::{
    DeletePolicy, ReadRepository, Repository, SqliteRepository, SqliteSettings, StorageError,
};
use tempfile::TempDir;

struct Fixture {
    _dir: TempDir,
    repo: SqliteRepository,
}

impl Fixture {
    async fn start() -> Self {
        Self::start_with(DeletePolicy::Tombstone).await
    }

    async fn start_with(delete_policy: DeletePolicy) -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let settings = SqliteSettings::builder()
            .path(dir.path().join("links.db"))
            .delete_policy(delete_policy)
            .build();
        let repo = SqliteRepository::connect(settings)
            .await
            .expect("open sqlite");

        Self { _dir: dir, repo }
    }
}

fn code(value: &str) -> ShortCode {
    ShortCode::new_unchecked(value)
}

fn link(value: &str, url: &str) -> ShortLink {
    ShortLink {
        code: code(value),
        target_url: url.to_string(),
        created_at: Timestamp::from_millisecond(Timestamp::now().as_millisecond()).unwrap(),
    }
}

#[tokio::test]
async fn insert_and_get_live_record() {
    let fixture = Fixture::start().await;
    let stored = link("abc123", "https://example.com");

    fixture.repo.insert(&stored).await.unwrap();

    let got = fixture.repo.get(&code("abc123")).await.unwrap().unwrap();
    assert_eq!(got, stored);
}

#[tokio::test]
async fn get_returns_none_for_unknown_code() {
    let fixture = Fixture::start().await;

    assert!(fixture
        .repo
        .get(&code("doesNotExist123"))
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn insert_conflicts_when_code_already_exists() {
    let fixture = Fixture::start().await;

    fixture
        .repo
        .insert(&link("abc123", "https://one.example"))
        .await
        .unwrap();

    let err = fixture
        .repo
        .insert(&link("abc123", "https://two.example"))
        .await
        .unwrap_err();

    assert!(matches!(err, StorageError::Conflict(_)));
    let got = fixture.repo.get(&code("abc123")).await.unwrap().unwrap();
    assert_eq!(got.target_url, "https://one.example");
}

#[tokio::test]
async fn same_target_under_two_codes() {
    let fixture = Fixture::start().await;

    fixture
        .repo
        .insert(&link("first", "https://example.com"))
        .await
        .unwrap();
    fixture
        .repo
        .insert(&link("second", "https://example.com"))
        .await
        .unwrap();

    for c in ["first", "second"] {
        let got = fixture.repo.get(&code(c)).await.unwrap().unwrap();
        assert_eq!(got.target_url, "https://example.com");
    }
}

#[tokio::test]
async fn tombstone_delete_hides_record_and_reserves_code() {
    let fixture = Fixture::start().await;

    fixture
        .repo
        .insert(&link("toDelete", "https://example.com"))
        .await
        .unwrap();

    assert!(fixture.repo.delete(&code("toDelete")).await.unwrap());
    assert!(fixture.repo.get(&code("toDelete")).await.unwrap().is_none());
    assert!(!fixture.repo.delete(&code("toDelete")).await.unwrap());

    let err = fixture
        .repo
        .insert(&link("toDelete", "https://other.example"))
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::Conflict(_)));
}

#[tokio::test]
async fn release_delete_frees_code() {
    let fixture = Fixture::start_with(DeletePolicy::Release).await;

    fixture
        .repo
        .insert(&link("recycled", "https://example.com"))
        .await
        .unwrap();
    assert!(fixture.repo.delete(&code("recycled")).await.unwrap());
    assert!(!fixture.repo.delete(&code("recycled")).await.unwrap());

    fixture
        .repo
        .insert(&link("recycled", "https://other.example"))
        .await
        .unwrap();
    let got = fixture.repo.get(&code("recycled")).await.unwrap().unwrap();
    assert_eq!(got.target_url, "https://other.example");
}

#[tokio::test]
async fn schema_bootstrap_is_idempotent() {
    let fixture = Fixture::start().await;

    fixture
        .repo
        .insert(&link("kept", "https://example.com"))
        .await
        .unwrap();
    fixture.repo.init_schema().await.unwrap();

    assert!(fixture.repo.get(&code("kept")).await.unwrap().is_some());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_inserts_of_same_code_have_one_winner() {
    let fixture = Fixture::start().await;
    let repo = Arc::new(fixture.repo.clone());
    let mut handles = vec![];

    for i in 0..16 {
        let repo = Arc::clone(&repo);
        handles.push(tokio::spawn(async move {
            repo.insert(&link("contested", &format!("https://example{i}.com")))
                .await
        }));
    }

    let mut wins = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(()) => wins += 1,
            Err(err) => assert!(matches!(err, StorageError::Conflict(_)), "{err}"),
        }
    }

    assert_eq!(wins, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_distinct_inserts_are_all_visible() {
    let fixture = Fixture::start().await;
    let repo = Arc::new(fixture.repo.clone());
    let mut handles = vec![];

    for i in 0..32 {
        let repo = Arc::clone(&repo);
        handles.push(tokio::spawn(async move {
            repo.insert(&link(&format!("code{i}"), &format!("https://example{i}.com")))
                .await
                .unwrap();
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let mut seen = HashSet::new();
    for i in 0..32 {
        let got = repo.get(&code(&format!("code{i}"))).await.unwrap().unwrap();
        assert_eq!(got.target_url, format!("https://example{i}.com"));
        seen.insert(got.code);
    }
    assert_eq!(seen.len(), 32);
}
