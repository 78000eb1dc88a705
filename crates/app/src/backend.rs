use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use services::AppServices;

use crate::config::{AppConfig, Backend};

/// Open the configured store and build services over it.
///
/// # Errors
///
/// Fails if the `SQLite` database cannot be prepared or migrated.
pub async fn open_services(config: &AppConfig) -> anyhow::Result<AppServices> {
    match config.backend {
        Backend::Memory => {
            tracing::debug!("using in-memory question store");
            Ok(AppServices::in_memory(config.seed))
        }
        Backend::Json => {
            tracing::debug!(path = %config.store_path.display(), "using JSON question store");
            Ok(AppServices::new_json_file(&config.store_path, config.seed))
        }
        Backend::Sqlite => {
            let url = normalize_sqlite_url(&config.database_url);
            prepare_sqlite_file(&url)?;
            tracing::debug!(url = %url, "using sqlite question store");
            AppServices::new_sqlite(&url, config.seed)
                .await
                .with_context(|| format!("opening {url}"))
        }
    }
}

fn is_in_memory(url: &str) -> bool {
    url == "sqlite::memory:" || url.contains("mode=memory")
}

/// Turn `sqlite:relative.db` or a bare path into an absolute `sqlite://` URL.
pub fn normalize_sqlite_url(raw: &str) -> String {
    let raw = raw.trim();
    if is_in_memory(raw) || raw.starts_with("sqlite://") {
        return raw.to_owned();
    }

    let path = Path::new(raw.strip_prefix("sqlite:").unwrap_or(raw));
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

/// `SQLite` will not create a missing file or its directory; do it up front.
fn prepare_sqlite_file(url: &str) -> anyhow::Result<()> {
    if is_in_memory(url) {
        return Ok(());
    }

    let Some(path) = url.strip_prefix("sqlite://") else {
        bail!("unsupported database url `{url}`");
    };
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        bail!("database url `{url}` has no path");
    }

    let path = Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)
            .with_context(|| format!("creating {}", path.display()))?;
    }
    Ok(())
}
