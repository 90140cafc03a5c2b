//! Bank list lookup, cached per country

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use super::{endpoint, ApiError, ApiResponse};
use crate::cache::TtlCache;

/// Time-to-live for bank lists (12 hours)
pub const BANK_CACHE_TTL: Duration = Duration::from_millis(43_200_000);

/// Prefix for bank list cache keys; bump the version when `Bank` changes shape
const CACHE_KEY_PREFIX: &str = "bank_cache_v2_";

/// A bank offered for payouts in a given country
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bank {
    pub id: u64,
    /// Bank sort/routing code
    pub code: String,
    pub name: String,
}

/// Client for the backend's bank list endpoint
#[derive(Debug, Clone)]
pub struct BankClient {
    /// HTTP client for making requests
    http_client: Client,
    /// Shared request cache
    cache: Arc<TtlCache>,
    /// Base URL for the API
    base_url: String,
}

impl BankClient {
    pub fn new(http_client: Client, cache: Arc<TtlCache>, base_url: impl Into<String>) -> Self {
        Self {
            http_client,
            cache,
            base_url: base_url.into(),
        }
    }

    /// Generates the cache key for a country
    pub fn cache_key(country: &str) -> String {
        format!("{}{}", CACHE_KEY_PREFIX, normalize_country(country))
    }

    /// Fetches the banks available in `country`
    ///
    /// Served from cache while the 12 hour entry is fresh unless `force_refresh` is set.
    pub async fn fetch_banks(
        &self,
        country: &str,
        force_refresh: bool,
    ) -> Result<Vec<Bank>, ApiError> {
        let country = normalize_country(country);
        if country.is_empty() {
            return Err(ApiError::InvalidInput("country must not be empty".to_string()));
        }

        self.cache
            .get(
                &Self::cache_key(&country),
                BANK_CACHE_TTL,
                || self.fetch_from_api(&country),
                force_refresh,
            )
            .await
    }

    async fn fetch_from_api(&self, country: &str) -> Result<Vec<Bank>, ApiError> {
        let response = self
            .http_client
            .get(endpoint(&self.base_url, "banks"))
            .query(&[("country", country)])
            .send()
            .await?
            .error_for_status()?
            .json::<ApiResponse<Vec<Bank>>>()
            .await?;

        Ok(response.data)
    }
}

fn normalize_country(country: &str) -> String {
    country.trim().to_lowercase()
}
