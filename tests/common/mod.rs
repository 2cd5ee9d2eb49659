//! Shared setup for integration tests: one on-disk SQLite database per test

#![allow(dead_code)]

use scriptorium::entities::{CreatePage, CreatePost, PublishStatus};
use scriptorium::{Config, Database};
use tempfile::TempDir;

pub struct TestDb {
    pub db: Database,
    // Held so the database file outlives the test
    _dir: TempDir,
}

pub async fn setup() -> TestDb {
    scriptorium::logging::init_for_tests();

    let dir = tempfile::tempdir().expect("create temp dir");
    let config = Config::for_path(dir.path().join("scriptorium.db"));
    let db = Database::connect(&config).await.expect("connect to test database");

    let sync = db.sync_all_schemas().await;
    assert!(sync.errors.is_empty(), "schema sync failed: {:?}", sync.errors);

    TestDb { db, _dir: dir }
}

pub fn new_post(slug: &str, status: PublishStatus) -> CreatePost {
    CreatePost {
        author_id: "author-1".to_string(),
        title: format!("Post {slug}"),
        slug: slug.to_string(),
        content: format!("Body of {slug}"),
        excerpt: None,
        status: Some(status),
    }
}

pub fn new_page(slug: &str, menu_order: i64) -> CreatePage {
    CreatePage {
        title: format!("Page {slug}"),
        slug: slug.to_string(),
        menu_order,
        ..Default::default()
    }
}
