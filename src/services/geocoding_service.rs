use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::Client;
use serde::Deserialize;

use crate::error::ServiceError;
use crate::models::location::LatLng;
use crate::services::http_client::{normalize_base_url, send_json};
use crate::services::log_redaction::redact_secrets;

pub const GOOGLE_MAPS_BASE_URL: &str = "https://maps.googleapis.com/maps/api";
const GEOCODE_TIMEOUT_SECS: u64 = 5;

/// Resolves free text to a coordinate. Never fails: `LatLng::ZERO` means unknown.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, address: &str) -> LatLng;
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    geometry: GeocodeGeometry,
}

#[derive(Debug, Deserialize)]
struct GeocodeGeometry {
    location: LatLng,
}

/// Google Geocoding API client, optionally scoped to one region for stable results.
pub struct GoogleGeocoder {
    client: Client,
    api_key: String,
    region: Option<String>,
    base_url: String,
}

impl GoogleGeocoder {
    pub fn new(client: Client, api_key: &str, region: Option<&str>) -> Self {
        Self::with_base_url(client, api_key, region, GOOGLE_MAPS_BASE_URL)
    }

    /// Point the client at another host (a mock server in tests).
    pub fn with_base_url(client: Client, api_key: &str, region: Option<&str>, base_url: &str) -> Self {
        Self {
            client,
            api_key: api_key.to_owned(),
            region: region.map(str::to_owned).filter(|r| !r.is_empty()),
            base_url: normalize_base_url(base_url),
        }
    }

    /// Single attempt, no retries.
    pub async fn try_geocode(&self, address: &str) -> Result<LatLng, ServiceError> {
        let mut params = vec![("address", address), ("key", self.api_key.as_str())];
        if let Some(region) = &self.region {
            params.push(("region", region.as_str()));
        }

        let request = self
            .client
            .get(format!("{}/geocode/json", self.base_url))
            .query(&params)
            .timeout(Duration::from_secs(GEOCODE_TIMEOUT_SECS));

        let response: GeocodeResponse = send_json(request, "geocode").await?;
        match response.status.as_str() {
            "OK" => response
                .results
                .first()
                .map(|r| r.geometry.location)
                .ok_or_else(|| ServiceError::Api("geocode returned no results".to_string())),
            other => Err(ServiceError::Api(format!("geocode status {}", other))),
        }
    }
}

#[async_trait]
impl Geocoder for GoogleGeocoder {
    async fn geocode(&self, address: &str) -> LatLng {
        if address.trim().is_empty() {
            return LatLng::ZERO;
        }
        match self.try_geocode(address).await {
            Ok(location) => {
                debug!("Geocoded '{}' to ({:.4}, {:.4})", address, location.lat, location.lng);
                location
            }
            Err(e) => {
                warn!("Geocoding '{}' failed: {}", address, redact_secrets(&e.to_string()));
                LatLng::ZERO
            }
        }
    }
}
