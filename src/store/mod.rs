use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;
use tracing::debug;

use crate::models::JobListing;

/// Save a whole collection as a JSON array, stamped like
/// `brightermondayjobs_20161114-103302.json`, and return the path.
pub async fn save_jobs(dir: &Path, jobs: &[JobListing]) -> Result<PathBuf> {
    let stamp = Local::now().format("%Y%m%d-%H%M%S");
    let path = dir.join(format!("brightermondayjobs_{stamp}.json"));
    debug!("Saving {} listings to {}", jobs.len(), path.display());

    let json = serde_json::to_string_pretty(jobs).context("Failed to serialize job listings")?;
    tokio::fs::write(&path, json)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}

/// Reload a saved collection, in file order. A missing file and malformed
/// JSON both fail here, before any search touches the data.
pub async fn load_jobs(path: &Path) -> Result<Vec<JobListing>> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read job listings file {}", path.display()))?;
    let jobs: Vec<JobListing> = serde_json::from_str(&raw)
        .with_context(|| format!("Malformed job listings file {}", path.display()))?;
    Ok(jobs)
}
