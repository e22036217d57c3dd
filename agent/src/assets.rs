//! `download-files`: fetch catalog images into the local cache
//!
//! Files land in `<cache>/illustrations/<key>.<ext>`. Existing files are kept,
//! so repeated runs only fetch what is missing.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use crate::config::AgentConfig;
use crate::illustration::{Illustration, IllustrationCatalog};

const DEFAULT_CACHE_DIR: &str = "cache";
const ILLUSTRATIONS_DIR: &str = "illustrations";
const DEFAULT_EXTENSION: &str = "png";

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("Failed to create cache directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to download illustration '{key}': {source}")]
    Download {
        key: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Outcome of a download run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DownloadReport {
    pub downloaded: Vec<PathBuf>,
    pub skipped: Vec<PathBuf>,
}

/// Directory that holds cached illustrations for `config`
pub fn illustration_cache_dir(config: &AgentConfig) -> PathBuf {
    config
        .cache_path
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CACHE_DIR))
        .join(ILLUSTRATIONS_DIR)
}

/// File name for an illustration, keeping the URL's extension when it has one
pub fn cached_file_name(illustration: &Illustration) -> String {
    let extension = url::Url::parse(&illustration.url)
        .ok()
        .and_then(|url| {
            url.path_segments()
                .and_then(|mut segments| segments.next_back().map(str::to_string))
        })
        .and_then(|segment| {
            Path::new(&segment)
                .extension()
                .and_then(|ext| ext.to_str())
                .map(str::to_ascii_lowercase)
        })
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .unwrap_or_else(|| DEFAULT_EXTENSION.to_string());

    format!("{}.{extension}", illustration.key)
}

/// Download every catalog image that is not cached yet
pub async fn download_illustrations(
    client: &reqwest::Client,
    catalog: &IllustrationCatalog,
    cache_dir: &Path,
) -> Result<DownloadReport, AssetError> {
    tokio::fs::create_dir_all(cache_dir)
        .await
        .map_err(|source| AssetError::CreateDir {
            path: cache_dir.to_path_buf(),
            source,
        })?;

    let mut report = DownloadReport::default();

    for illustration in catalog.iter() {
        let path = cache_dir.join(cached_file_name(illustration));

        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            debug!(key = %illustration.key, path = %path.display(), "Already cached");
            report.skipped.push(path);
            continue;
        }

        info!(key = %illustration.key, url = %illustration.url, "Downloading illustration");
        let bytes = fetch(client, illustration)
            .await
            .map_err(|source| AssetError::Download {
                key: illustration.key.clone(),
                source,
            })?;

        tokio::fs::write(&path, &bytes)
            .await
            .map_err(|source| AssetError::Write {
                path: path.clone(),
                source,
            })?;
        report.downloaded.push(path);
    }

    info!(
        downloaded = report.downloaded.len(),
        skipped = report.skipped.len(),
        "Illustration cache ready"
    );
    Ok(report)
}

async fn fetch(
    client: &reqwest::Client,
    illustration: &Illustration,
) -> Result<Vec<u8>, reqwest::Error> {
    let body = client
        .get(&illustration.url)
        .send()
        .await?
        .error_for_status()?
        .bytes()
        .await?;
    Ok(body.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn illustration(key: &str, url: &str) -> Illustration {
        Illustration {
            key: key.to_string(),
            url: url.to_string(),
            description: String::new(),
            topics: Vec::new(),
        }
    }

    #[test]
    fn test_cached_file_name_keeps_extension() {
        assert_eq!(
            cached_file_name(&illustration("pythagoras", "https://example.com/a/Triangle.SVG")),
            "pythagoras.svg"
        );
        assert_eq!(
            cached_file_name(&illustration("circle", "https://example.com/img?id=3")),
            "circle.png"
        );
    }

    #[test]
    fn test_cache_dir_default_and_configured() {
        let mut config = AgentConfig::default();
        assert_eq!(
            illustration_cache_dir(&config),
            PathBuf::from("cache/illustrations")
        );

        config.cache_path = Some(PathBuf::from("/var/cache/vyna"));
        assert_eq!(
            illustration_cache_dir(&config),
            PathBuf::from("/var/cache/vyna/illustrations")
        );
    }
}
