///! Error type shared by the scrape → normalize → render pipeline

use std::time::Duration;
use thiserror::Error;

/// Which league-page table a lookup was after
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    Standings,
    Fixtures,
}

impl std::fmt::Display for TableKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TableKind::Standings => write!(f, "standings"),
            TableKind::Fixtures => write!(f, "fixtures"),
        }
    }
}

#[derive(Error, Debug)]
pub enum NessfixError {
    /// The page (or its fixtures table) did not become ready within the budget.
    #[error("Timed out after {}s waiting for the fixtures table at {url}", waited.as_secs())]
    FetchTimeout { url: String, waited: Duration },

    #[error("No {0} table found on the page")]
    MissingTable(TableKind),

    #[error("Snapshot {0:?} not found, run `nessfix scrape` first")]
    MissingSnapshot(std::path::PathBuf),

    #[error("Headless browser failure: {0}")]
    Browser(String),

    #[error("HTTP fetch failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Render failed: {0}")]
    Render(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, NessfixError>;
