use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    /// A listing without a title. Callers drop these from the batch.
    #[error("Malformed fragment: {0}")]
    MalformedFragment(String),

    #[error("Malformed snapshot {}: {reason}", path.display())]
    MalformedSnapshot { path: PathBuf, reason: String },

    #[error("No movie_output snapshot found in {}", dir.display())]
    NoSnapshotFound { dir: PathBuf },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "scrape")]
    #[error("Fetch error: {0}")]
    Fetch(#[from] reqwest::Error),

    #[cfg(feature = "scrape")]
    #[error("HTML error: {0}")]
    Html(String),
}

impl CatalogError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, CatalogError::NoSnapshotFound { .. })
    }

    pub(crate) fn malformed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        CatalogError::MalformedSnapshot {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CatalogError>;
