//! Handler configuration

use crate::constants::{DEFAULT_DATA_DIR, DEFAULT_DB_PATH, RIR_URLS};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct Options {
    /// Store file; created on first open.
    pub db_path: PathBuf,
    /// When false, population reuses files already present in `data_dir`.
    pub download_rir_files: bool,
    pub http_client: reqwest::Client,
    /// Delegation file URLs, one per RIR.
    pub sources: Vec<String>,
    /// Where delegation files are written and read.
    pub data_dir: PathBuf,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            download_rir_files: true,
            http_client: reqwest::Client::new(),
            sources: RIR_URLS.iter().map(|u| u.to_string()).collect(),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
        }
    }
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_db_path(mut self, path: impl AsRef<Path>) -> Self {
        self.db_path = path.as_ref().to_path_buf();
        self
    }

    pub fn with_download_rir_files(mut self, download: bool) -> Self {
        self.download_rir_files = download;
        self
    }

    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http_client = client;
        self
    }

    pub fn with_sources<I, S>(mut self, sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sources = sources.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_data_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.data_dir = dir.as_ref().to_path_buf();
        self
    }
}
