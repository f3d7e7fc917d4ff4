use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::Deserialize;

use crate::error::ServiceError;
use crate::models::location::LatLng;
use crate::services::geocoding_service::GOOGLE_MAPS_BASE_URL;
use crate::services::http_client::{normalize_base_url, send_json};

const PLACES_TIMEOUT_SECS: u64 = 15;
const PHOTO_MAX_WIDTH: u32 = 800;
const DETAILS_FIELDS: &str = "place_id,name,formatted_address,rating,user_ratings_total,photos,geometry,types,price_level,formatted_phone_number,website,opening_hours,reviews";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaceSearchQuery {
    pub query: String,
    pub bias: Option<LatLng>,
    pub radius_m: u32,
    pub place_type: Option<String>,
}

/// A search candidate or a details record; details carry the optional contact fields.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct PlaceResult {
    pub place_id: String,
    pub name: String,
    pub formatted_address: String,
    pub vicinity: String,
    pub geometry: Option<PlaceGeometry>,
    pub types: Vec<String>,
    pub rating: Option<f64>,
    pub user_ratings_total: Option<u32>,
    pub price_level: Option<u8>,
    pub photos: Vec<PlacePhoto>,
    pub formatted_phone_number: String,
    pub website: String,
    pub opening_hours: Option<OpeningHours>,
    pub reviews: Vec<RawReview>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq)]
pub struct PlaceGeometry {
    #[serde(default)]
    pub location: LatLng,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct PlacePhoto {
    pub photo_reference: String,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct OpeningHours {
    pub weekday_text: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct RawReview {
    pub author_name: String,
    pub rating: f64,
    pub text: String,
    pub relative_time_description: String,
}

impl PlaceResult {
    pub fn location(&self) -> LatLng {
        self.geometry.map(|g| g.location).unwrap_or(LatLng::ZERO)
    }

    pub fn address(&self) -> &str {
        if self.formatted_address.is_empty() {
            &self.vicinity
        } else {
            &self.formatted_address
        }
    }

    pub fn first_photo_reference(&self) -> Option<&str> {
        self.photos
            .iter()
            .map(|p| p.photo_reference.as_str())
            .find(|r| !r.is_empty())
    }
}

/// Place search provider. Statuses like `ZERO_RESULTS` are empty results, not errors.
#[async_trait]
pub trait PlacesApi: Send + Sync {
    async fn text_search(&self, query: &PlaceSearchQuery) -> Result<Vec<PlaceResult>, ServiceError>;

    /// `Ok(None)` when the provider has no details for the id.
    async fn place_details(&self, place_id: &str) -> Result<Option<PlaceResult>, ServiceError>;

    async fn nearby_search(
        &self,
        center: LatLng,
        radius_m: u32,
        place_type: Option<&str>,
    ) -> Result<Vec<PlaceResult>, ServiceError>;

    fn photo_url(&self, photo_reference: &str) -> String;
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    status: String,
    #[serde(default)]
    results: Vec<PlaceResult>,
    #[serde(default)]
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DetailsResponse {
    status: String,
    #[serde(default)]
    result: Option<PlaceResult>,
}

pub struct GooglePlacesClient {
    client: Client,
    api_key: String,
    language: String,
    base_url: String,
}

impl GooglePlacesClient {
    pub fn new(client: Client, api_key: &str, language: &str) -> Self {
        Self::with_base_url(client, api_key, language, GOOGLE_MAPS_BASE_URL)
    }

    pub fn with_base_url(client: Client, api_key: &str, language: &str, base_url: &str) -> Self {
        Self {
            client,
            api_key: api_key.to_owned(),
            language: language.to_owned(),
            base_url: normalize_base_url(base_url),
        }
    }

    async fn search(&self, endpoint: &str, params: Vec<(&str, String)>) -> Result<Vec<PlaceResult>, ServiceError> {
        let request = self
            .client
            .get(format!("{}/place/{}/json", self.base_url, endpoint))
            .query(&params)
            .query(&[("key", self.api_key.as_str()), ("language", self.language.as_str())])
            .timeout(Duration::from_secs(PLACES_TIMEOUT_SECS));

        let response: SearchResponse = send_json(request, endpoint).await?;
        match response.status.as_str() {
            "OK" => Ok(response.results),
            "ZERO_RESULTS" => Ok(Vec::new()),
            status => Err(ServiceError::Api(format!(
                "{} status {}{}",
                endpoint,
                status,
                response.error_message.map(|m| format!(": {}", m)).unwrap_or_default()
            ))),
        }
    }
}

fn location_param(location: LatLng) -> String {
    format!("{},{}", location.lat, location.lng)
}

#[async_trait]
impl PlacesApi for GooglePlacesClient {
    async fn text_search(&self, query: &PlaceSearchQuery) -> Result<Vec<PlaceResult>, ServiceError> {
        let mut params = vec![("query", query.query.clone())];
        if let Some(bias) = query.bias.and_then(LatLng::known) {
            params.push(("location", location_param(bias)));
            params.push(("radius", query.radius_m.to_string()));
        }
        if let Some(place_type) = &query.place_type {
            params.push(("type", place_type.clone()));
        }
        self.search("textsearch", params).await
    }

    async fn place_details(&self, place_id: &str) -> Result<Option<PlaceResult>, ServiceError> {
        let request = self
            .client
            .get(format!("{}/place/details/json", self.base_url))
            .query(&[
                ("place_id", place_id),
                ("fields", DETAILS_FIELDS),
                ("language", self.language.as_str()),
                ("key", self.api_key.as_str()),
            ])
            .timeout(Duration::from_secs(PLACES_TIMEOUT_SECS));

        let response: DetailsResponse = send_json(request, "details").await?;
        if response.status != "OK" {
            debug!("Place details for {} returned status {}", place_id, response.status);
            return Ok(None);
        }
        Ok(response.result)
    }

    async fn nearby_search(
        &self,
        center: LatLng,
        radius_m: u32,
        place_type: Option<&str>,
    ) -> Result<Vec<PlaceResult>, ServiceError> {
        let mut params = vec![
            ("location", location_param(center)),
            ("radius", radius_m.to_string()),
        ];
        if let Some(place_type) = place_type {
            params.push(("type", place_type.to_string()));
        }
        self.search("nearbysearch", params).await
    }

    fn photo_url(&self, photo_reference: &str) -> String {
        format!(
            "{}/place/photo?maxwidth={}&photo_reference={}&key={}",
            self.base_url, PHOTO_MAX_WIDTH, photo_reference, self.api_key
        )
    }
}
