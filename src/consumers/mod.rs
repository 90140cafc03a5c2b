//! Cached lookups against the dashboard backend
//!
//! Each client owns its cache key namespace and TTL, and shares one [`TtlCache`]
//! with the rest of the process.
//!
//! [`TtlCache`]: crate::cache::TtlCache

pub mod banks;
pub mod countries;
pub mod selector;

pub use banks::{Bank, BankClient, BANK_CACHE_TTL};
pub use countries::{find_by_dial_code, Country, CountryClient, COUNTRY_CACHE_TTL};
pub use selector::Selector;

use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when fetching lookup data
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed or returned an error status
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Caller passed an argument that cannot form a request
    #[error("Invalid request: {0}")]
    InvalidInput(String),
}

/// Envelope used by the backend for list endpoints
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    data: T,
}

/// Joins a base URL and a path without doubling slashes
fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), path)
}
