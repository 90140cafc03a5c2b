//! Runtime configuration for the lookup CLI

use reqwest::Client;
use std::path::PathBuf;
use std::time::Duration;

use crate::cache::FileStore;

/// Default backend base URL
pub const DEFAULT_API_URL: &str = "http://localhost:8080/api";

/// Settings shared by every command
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the dashboard backend
    pub api_url: String,
    /// Directory for the persistent cache tier; `None` uses the XDG cache dir
    pub cache_dir: Option<PathBuf>,
    /// Per-request HTTP timeout
    pub request_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            cache_dir: None,
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl Config {
    /// Builds the on-disk store for the persistent tier
    ///
    /// Returns `None` when no directory was given and the XDG cache dir is unknown.
    pub fn file_store(&self) -> Option<FileStore> {
        match &self.cache_dir {
            Some(dir) => Some(FileStore::with_dir(dir.clone())),
            None => FileStore::new(),
        }
    }

    /// Builds the HTTP client used by the lookup clients
    pub fn http_client(&self) -> reqwest::Result<Client> {
        Client::builder().timeout(self.request_timeout).build()
    }
}
