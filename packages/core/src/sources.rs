//! Target list and email template loading.
//!
//! Both documents are read once at startup. Any failure here is a
//! configuration error and stops the process before the scheduler starts.

use std::path::Path;

use reqwest::Url;
use serde::Deserialize;

use crate::error::AppError;
use crate::monitor::{EmailTemplate, Target};

#[derive(Debug, Deserialize)]
struct TargetsDocument {
    urls: Vec<Target>,
}

/// Load the ordered target list from a `{ "urls": [{ "url": ... }] }` file.
pub async fn load_targets(path: &Path) -> Result<Vec<Target>, AppError> {
    let contents = read(path).await?;
    parse_targets(&contents, path)
}

/// Load the alert email template from a `{ "subject", "body" }` file.
pub async fn load_template(path: &Path) -> Result<EmailTemplate, AppError> {
    let contents = read(path).await?;
    serde_json::from_str(&contents).map_err(|source| AppError::Parse {
        path: path.display().to_string(),
        source,
    })
}

fn parse_targets(contents: &str, path: &Path) -> Result<Vec<Target>, AppError> {
    let document: TargetsDocument =
        serde_json::from_str(contents).map_err(|source| AppError::Parse {
            path: path.display().to_string(),
            source,
        })?;

    for target in &document.urls {
        let url = Url::parse(&target.url).map_err(|err| {
            AppError::config(format!("Invalid URL '{}' in {}: {}", target.url, path.display(), err))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(AppError::config(format!(
                "Unsupported scheme for '{}' in {}",
                target.url,
                path.display()
            )));
        }
    }

    if document.urls.is_empty() {
        tracing::warn!("No targets configured in {}", path.display());
    }

    Ok(document.urls)
}

async fn read(path: &Path) -> Result<String, AppError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| AppError::Io {
            path: path.display().to_string(),
            source,
        })
}
