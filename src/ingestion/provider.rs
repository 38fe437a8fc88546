//! Client for the upstream canteen menu provider.
//!
//! The provider answers one request per canteen number with a nested
//! per-date, per-record payload. Dates arrive as `dd.MM.yyyy` strings.

use chrono::NaiveDate;
use serde::Deserialize;
use std::time::Duration;

use crate::errors::{ApiError, Result};

/// Hard cap on one provider round-trip; a timed-out fetch fails that
/// canteen's run only (see pipeline::run_once).
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderDay {
    /// `dd.MM.yyyy`, parsed via `parse_provider_date`.
    pub date: String,
    pub meals: Vec<ProviderMeal>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderMeal {
    pub name: String,
    /// Raw meal-type code: soup/addition marker or a main-course number.
    #[serde(rename = "type")]
    pub meal_type: String,
}

pub fn client() -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder().timeout(FETCH_TIMEOUT).build()
}

/// Fetches the menu payload for one canteen, identified by its
/// provider-assigned number.
pub async fn fetch_menu(
    client: &reqwest::Client,
    base_url: &str,
    canteen_number: &str,
) -> Result<Vec<ProviderDay>> {
    let url = format!("{}/{}", base_url.trim_end_matches('/'), canteen_number);

    let response = client.get(&url).send().await?.error_for_status()?;
    let days: Vec<ProviderDay> = response.json().await?;
    Ok(days)
}

pub fn parse_provider_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%d.%m.%Y")
        .map_err(|e| ApiError::Upstream(format!("unparseable provider date {:?}: {}", raw, e)))
}
