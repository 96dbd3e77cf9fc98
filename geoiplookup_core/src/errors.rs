//! Error type for store access and population runs

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Stage of a population run, reported with the error that ended it.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Stage {
    EnsurePartitions,
    Fetch,
    ParseAndLoad,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::EnsurePartitions => "ensure partitions",
            Stage::Fetch => "fetch",
            Stage::ParseAndLoad => "parse and load",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to open store: {0}")]
    Open(#[from] redb::DatabaseError),
    #[error("store transaction failed: {0}")]
    Transaction(#[from] redb::TransactionError),
    #[error("store partition error: {0}")]
    Partition(#[from] redb::TableError),
    #[error("store storage error: {0}")]
    Storage(#[from] redb::StorageError),
    #[error("store commit failed: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("failed to get geoip data from {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("failed to get geoip data from {url} with status {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },
    #[error("invalid source url {0}")]
    InvalidUrl(String),
    #[error("local file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("task did not complete: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("population failed during {stage}: {source}")]
    Populate {
        stage: Stage,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn at(self, stage: Stage) -> Self {
        Error::Populate {
            stage,
            source: Box::new(self),
        }
    }

    /// Stage a population error was raised in, if any.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Error::Populate { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}
