use std::sync::Arc;

use actix_web::web;
use reqwest::Client;
use serde::Serialize;

use crate::config::AppConfig;
use crate::services::geocoding_service::{Geocoder, GoogleGeocoder};
use crate::services::image_service::ImageService;
use crate::services::itinerary_generation_service::{ItineraryGenerationConfig, ItineraryGenerator};
use crate::services::llm_service::GeminiClient;
use crate::services::place_resolver::PlaceResolver;
use crate::services::places_service::GooglePlacesClient;
use crate::services::weather_service::{
    OpenMeteoProvider, WeatherApiProvider, WeatherProvider, WeatherService,
};

pub mod health;
pub mod itinerary;

/// Which external providers this process was started with. Reported by `/health`.
#[derive(Debug, Clone, Serialize)]
pub struct ProviderStatus {
    pub maps: bool,
    pub llm_model: String,
    pub weather: Vec<&'static str>,
    pub image_search: bool,
}

/// Collaborators shared by every request; built once at startup.
pub struct AppState {
    pub generator: ItineraryGenerator,
    pub resolver: Arc<PlaceResolver>,
    pub providers: ProviderStatus,
}

impl AppState {
    pub fn from_config(config: &AppConfig, http: Client) -> Self {
        let geocoder: Arc<dyn Geocoder> = Arc::new(GoogleGeocoder::new(
            http.clone(),
            &config.google_maps_api_key,
            Some(config.geocode_region.as_str()),
        ));
        let places = Arc::new(GooglePlacesClient::new(
            http.clone(),
            &config.google_maps_api_key,
            &config.places_language,
        ));
        let resolver = Arc::new(PlaceResolver::new(places, geocoder.clone()));

        let mut weather_providers: Vec<Arc<dyn WeatherProvider>> = Vec::new();
        if let Some(key) = &config.weather_api_key {
            weather_providers.push(Arc::new(WeatherApiProvider::new(http.clone(), key)));
        }
        weather_providers.push(Arc::new(OpenMeteoProvider::new(http.clone())));
        let weather = Arc::new(WeatherService::new(weather_providers));

        let images = Arc::new(ImageService::new(http.clone(), config.unsplash_access_key.as_deref()));
        let llm = Arc::new(GeminiClient::new(http, &config.gemini_api_key, &config.gemini_model));

        let providers = ProviderStatus {
            maps: !config.google_maps_api_key.is_empty(),
            llm_model: llm.model().to_string(),
            weather: weather.provider_names(),
            image_search: images.has_search(),
        };

        let generator = ItineraryGenerator::with_config(
            llm,
            geocoder,
            resolver.clone(),
            weather,
            images,
            ItineraryGenerationConfig::from(config),
        );

        Self {
            generator,
            resolver,
            providers,
        }
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health::health_check)).service(
        web::scope("/api")
            .route("/plan-trip", web::post().to(itinerary::plan_trip))
            .route("/resolve-place", web::post().to(itinerary::resolve_place))
            .route("/suggest-places", web::post().to(itinerary::suggest_places)),
    );
}
