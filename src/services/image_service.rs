use std::time::Duration;

use log::{debug, info, warn};
use reqwest::Client;
use serde::Deserialize;
use url::Url;

use crate::error::ServiceError;
use crate::services::http_client::{normalize_base_url, send_json};
use crate::services::log_redaction::redact_secrets;

pub const UNSPLASH_BASE_URL: &str = "https://api.unsplash.com";
const PLACEHOLDER_BASE_URL: &str = "https://picsum.photos";
const IMAGE_TIMEOUT_SECS: u64 = 10;

const VIETNAMESE_CITIES: &[&str] = &[
    "hà nội",
    "hanoi",
    "sài gòn",
    "saigon",
    "hồ chí minh",
    "ho chi minh",
    "đà nẵng",
    "da nang",
    "huế",
    "hue",
    "nha trang",
    "vũng tàu",
    "vung tau",
];

#[derive(Debug, Deserialize)]
struct SearchPhotosResponse {
    #[serde(default)]
    results: Vec<Photo>,
}

#[derive(Debug, Deserialize)]
struct Photo {
    urls: PhotoUrls,
}

#[derive(Debug, Deserialize)]
struct PhotoUrls {
    regular: String,
}

/// Cover images for a trip destination. Without an access key only the placeholder is used.
pub struct ImageService {
    client: Client,
    access_key: Option<String>,
    base_url: String,
}

impl ImageService {
    pub fn new(client: Client, access_key: Option<&str>) -> Self {
        Self::with_base_url(client, access_key, UNSPLASH_BASE_URL)
    }

    pub fn with_base_url(client: Client, access_key: Option<&str>, base_url: &str) -> Self {
        Self {
            client,
            access_key: access_key.map(str::to_owned).filter(|k| !k.is_empty()),
            base_url: normalize_base_url(base_url),
        }
    }

    pub fn has_search(&self) -> bool {
        self.access_key.is_some()
    }

    /// Never fails: any search problem falls back to a seeded placeholder.
    pub async fn cover_image(&self, destination: &str) -> String {
        if let Some(key) = &self.access_key {
            match self.search(key, destination).await {
                Ok(Some(url)) => {
                    info!("Found cover image for '{}'", destination);
                    return url;
                }
                Ok(None) => debug!("No cover image results for '{}'", destination),
                Err(e) => warn!(
                    "Cover image search for '{}' failed: {}",
                    destination,
                    redact_secrets(&e.to_string())
                ),
            }
        }
        placeholder_image(destination)
    }

    async fn search(&self, key: &str, destination: &str) -> Result<Option<String>, ServiceError> {
        let query = cover_query(destination);
        let request = self
            .client
            .get(format!("{}/search/photos", self.base_url))
            .query(&[
                ("client_id", key),
                ("query", query.as_str()),
                ("per_page", "1"),
                ("orientation", "landscape"),
                ("content_filter", "high"),
            ])
            .timeout(Duration::from_secs(IMAGE_TIMEOUT_SECS));

        let response: SearchPhotosResponse = send_json(request, "unsplash search").await?;
        Ok(response.results.into_iter().next().map(|photo| photo.urls.regular))
    }
}

pub fn cover_query(destination: &str) -> String {
    let lowered = destination.to_lowercase();
    if VIETNAMESE_CITIES.iter().any(|city| lowered.contains(city)) {
        format!("{} Vietnam cityscape", destination.trim())
    } else {
        format!("{} travel landmark cityscape", destination.trim())
    }
}

/// Deterministic placeholder keyed by the destination.
pub fn placeholder_image(destination: &str) -> String {
    let seed: String = destination
        .chars()
        .filter(|c| *c != ' ' && *c != ',')
        .collect::<String>()
        .to_lowercase();

    let fallback = format!("{}/seed/{}/1200/800", PLACEHOLDER_BASE_URL, seed);
    let Ok(mut url) = Url::parse(PLACEHOLDER_BASE_URL) else {
        return fallback;
    };
    match url.path_segments_mut() {
        Ok(mut segments) => {
            segments.clear().extend(["seed", seed.as_str(), "1200", "800"]);
        }
        Err(()) => return fallback,
    }
    url.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::http_client::build_http_client;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_cover_query_suffix() {
        assert_eq!(cover_query("Đà Nẵng"), "Đà Nẵng Vietnam cityscape");
        assert_eq!(cover_query("Hue, Vietnam"), "Hue, Vietnam Vietnam cityscape");
        assert_eq!(cover_query("Kyoto"), "Kyoto travel landmark cityscape");
    }

    #[test]
    fn test_placeholder_is_seeded() {
        assert_eq!(
            placeholder_image("Nha Trang, Khanh Hoa"),
            "https://picsum.photos/seed/nhatrangkhanhhoa/1200/800"
        );
        assert_eq!(placeholder_image("Kyoto"), placeholder_image("kyoto"));
    }

    #[test]
    fn test_no_key_uses_placeholder() {
        let images = ImageService::new(Client::new(), None);
        assert!(!images.has_search());
        let url = tokio_test::block_on(images.cover_image("Sapa"));
        assert_eq!(url, "https://picsum.photos/seed/sapa/1200/800");
    }

    #[tokio::test]
    async fn test_unsplash_result_is_used() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search/photos"))
            .and(query_param("query", "Hanoi Vietnam cityscape"))
            .and(query_param("client_id", "ukey"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [{"urls": {"regular": "https://images.example/hanoi.jpg"}}]
            })))
            .mount(&server)
            .await;

        let images = ImageService::with_base_url(build_http_client().unwrap(), Some("ukey"), &server.uri());
        assert_eq!(images.cover_image("Hanoi").await, "https://images.example/hanoi.jpg");
    }

    #[tokio::test]
    async fn test_unsplash_failure_falls_back() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(query_param("query", "Kyoto travel landmark cityscape"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
            .with_priority(1)
            .mount(&server)
            .await;

        let images = ImageService::with_base_url(build_http_client().unwrap(), Some("ukey"), &server.uri());
        assert_eq!(images.cover_image("Huế").await, placeholder_image("Huế"));
        assert_eq!(images.cover_image("Kyoto").await, "https://picsum.photos/seed/kyoto/1200/800");
    }
}
