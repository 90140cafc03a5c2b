//! Country and phone dialing code lookup

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use super::{endpoint, ApiError, ApiResponse};
use crate::cache::TtlCache;

/// Time-to-live for the country list (24 hours)
pub const COUNTRY_CACHE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Cache key for the country list
const CACHE_KEY: &str = "country_codes_v1";

/// A country with its international dialing code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    pub name: String,
    /// ISO 3166-1 alpha-2 code, e.g. "NG"
    pub iso2: String,
    /// Dialing code including the leading '+', e.g. "+234"
    pub dial_code: String,
}

/// Client for the backend's country list endpoint
#[derive(Debug, Clone)]
pub struct CountryClient {
    http_client: Client,
    cache: Arc<TtlCache>,
    base_url: String,
}

impl CountryClient {
    pub fn new(http_client: Client, cache: Arc<TtlCache>, base_url: impl Into<String>) -> Self {
        Self {
            http_client,
            cache,
            base_url: base_url.into(),
        }
    }

    /// Cache key under which the country list is stored
    pub fn cache_key() -> &'static str {
        CACHE_KEY
    }

    /// Fetches all countries with their dialing codes
    pub async fn fetch_countries(&self, force_refresh: bool) -> Result<Vec<Country>, ApiError> {
        self.cache
            .get(
                CACHE_KEY,
                COUNTRY_CACHE_TTL,
                || self.fetch_from_api(),
                force_refresh,
            )
            .await
    }

    async fn fetch_from_api(&self) -> Result<Vec<Country>, ApiError> {
        let response = self
            .http_client
            .get(endpoint(&self.base_url, "countries"))
            .send()
            .await?
            .error_for_status()?
            .json::<ApiResponse<Vec<Country>>>()
            .await?;

        Ok(response.data)
    }
}

/// Finds the countries using a dialing code
///
/// The leading '+' is optional in `dial_code`. Several countries can share a code
/// (e.g. "+1"), so every match is returned.
pub fn find_by_dial_code<'a>(countries: &'a [Country], dial_code: &str) -> Vec<&'a Country> {
    let wanted = dial_code.trim().trim_start_matches('+');
    if wanted.is_empty() {
        return Vec::new();
    }

    countries
        .iter()
        .filter(|c| c.dial_code.trim_start_matches('+') == wanted)
        .collect()
}
