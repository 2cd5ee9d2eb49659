//! Scriptorium bootstrap: connect, create missing tables, report health

use anyhow::Result;
use scriptorium::{Config, Database};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load()?;

    scriptorium::logging::init("scriptorium=info");
    tracing::info!("Starting Scriptorium");

    if let Some(dir) = database_dir(&config.database_url) {
        tokio::fs::create_dir_all(dir).await?;
    }

    let db = Database::connect_with_retry(&config).await?;
    let sync = db.sync_all_schemas().await;
    for error in &sync.errors {
        tracing::error!(%error, "Schema sync error");
    }

    db.health().await?;

    let models = db.models();
    tracing::info!(
        posts = models.posts.count(&[]).await?,
        pages = models.pages.count(&[]).await?,
        users = models.users.count(&[]).await?,
        "Database ready"
    );

    db.close().await;
    Ok(())
}

/// Parent directory of a file-backed database, if it has one
fn database_dir(url: &str) -> Option<std::path::PathBuf> {
    let path = url.strip_prefix("sqlite://").or_else(|| url.strip_prefix("sqlite:")).unwrap_or(url);
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() || path.contains(":memory:") {
        return None;
    }
    std::path::Path::new(path)
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(|p| p.to_path_buf())
}
