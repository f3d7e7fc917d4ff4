#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use actix_web::{web, App};
use async_trait::async_trait;
use reqwest::Client;

use pocket_atlas_api::error::ServiceError;
use pocket_atlas_api::models::location::LatLng;
use pocket_atlas_api::routes::{self, AppState, ProviderStatus};
use pocket_atlas_api::services::geocoding_service::Geocoder;
use pocket_atlas_api::services::image_service::ImageService;
use pocket_atlas_api::services::itinerary_generation_service::{
    ItineraryGenerationConfig, ItineraryGenerator,
};
use pocket_atlas_api::services::llm_service::TextGenerator;
use pocket_atlas_api::services::place_resolver::PlaceResolver;
use pocket_atlas_api::services::places_service::{
    PlaceGeometry, PlaceResult, PlaceSearchQuery, PlacesApi,
};
use pocket_atlas_api::services::weather_service::{RawForecastDay, WeatherProvider, WeatherService};

pub const DALAT: LatLng = LatLng { lat: 11.9404, lng: 108.4583 };

pub const PLAN_RESPONSE: &str = r#"Đây là kế hoạch cho bạn:
```json
{
  "trip_name": "Đà Lạt mộng mơ",
  "overview": "Hai ngày giữa phố núi.",
  "total_estimated_cost": 3500000,
  "days": [
    {"day": "1", "title": "Ngày 1", "activities": [
      {"time": "08:00 - 10:00", "place": "Chợ Đà Lạt", "estimated_cost": 100000},
      {"time": "10:00 - 12:00", "place": "Di chuyển"},
      {"time": "10:00 - 12:00", "place": "Hồ Xuân Hương (VD: đi dạo quanh hồ)"},
      {"time": "13:00 - 15:00", "place": "Chợ Đà Lạt"}
    ]},
    {"day": 5, "title": "Ngày 2", "activities": [
      {"time": "07:00 - 08:00", "place": "Đồi chè Cầu Đất"}
    ]}
  ],
  "packing_list": ["Áo khoác", "Giày thể thao"],
  "travel_tips": "Mang theo ô"
}
```
Chúc bạn có chuyến đi vui vẻ!"#;

pub struct FakeGeocoder {
    pub location: LatLng,
    pub calls: AtomicUsize,
}

impl FakeGeocoder {
    pub fn new(location: LatLng) -> Arc<Self> {
        Arc::new(Self { location, calls: AtomicUsize::new(0) })
    }
}

#[async_trait]
impl Geocoder for FakeGeocoder {
    async fn geocode(&self, _address: &str) -> LatLng {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.location
    }
}

/// Answers text searches whose query starts with a known place name.
pub struct FakePlaces {
    pub known: HashMap<String, PlaceResult>,
    pub searches: AtomicUsize,
    pub biased_searches: AtomicUsize,
}

impl FakePlaces {
    pub fn dalat() -> Arc<Self> {
        let known = [
            ("Chợ Đà Lạt", "cho-da-lat", 11.9429, 108.4370),
            ("Hồ Xuân Hương", "ho-xuan-huong", 11.9419, 108.4442),
            ("Đồi chè Cầu Đất", "cau-dat", 11.8340, 108.5620),
        ]
        .into_iter()
        .map(|(name, id, lat, lng)| {
            (
                name.to_string(),
                PlaceResult {
                    place_id: id.to_string(),
                    name: name.to_string(),
                    formatted_address: format!("{}, Đà Lạt", name),
                    geometry: Some(PlaceGeometry { location: LatLng::new(lat, lng) }),
                    types: vec!["tourist_attraction".to_string()],
                    rating: Some(4.5),
                    ..Default::default()
                },
            )
        })
        .collect();

        Arc::new(Self {
            known,
            searches: AtomicUsize::new(0),
            biased_searches: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl PlacesApi for FakePlaces {
    async fn text_search(&self, query: &PlaceSearchQuery) -> Result<Vec<PlaceResult>, ServiceError> {
        self.searches.fetch_add(1, Ordering::SeqCst);
        if query.bias.is_some() {
            self.biased_searches.fetch_add(1, Ordering::SeqCst);
        }
        Ok(self
            .known
            .iter()
            .filter(|(name, _)| query.query.starts_with(name.as_str()))
            .map(|(_, place)| place.clone())
            .collect())
    }

    async fn place_details(&self, _place_id: &str) -> Result<Option<PlaceResult>, ServiceError> {
        Ok(None)
    }

    async fn nearby_search(
        &self,
        _center: LatLng,
        _radius_m: u32,
        _place_type: Option<&str>,
    ) -> Result<Vec<PlaceResult>, ServiceError> {
        let mut places: Vec<PlaceResult> = self.known.values().cloned().collect();
        places.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(places)
    }

    fn photo_url(&self, photo_reference: &str) -> String {
        format!("https://photos.test/{}", photo_reference)
    }
}

/// Returns a canned response, or fails when `response` is `None`.
pub struct FakeLlm {
    pub response: Option<String>,
    pub calls: AtomicUsize,
}

impl FakeLlm {
    pub fn answering(response: &str) -> Arc<Self> {
        Arc::new(Self { response: Some(response.to_string()), calls: AtomicUsize::new(0) })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self { response: None, calls: AtomicUsize::new(0) })
    }
}

#[async_trait]
impl TextGenerator for FakeLlm {
    async fn generate(&self, _prompt: &str) -> Result<String, ServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.response.clone().ok_or(ServiceError::Status {
            status: 429,
            body: "quota exceeded for key=[REDACTED]".to_string(),
        })
    }
}

pub struct FakeWeather {
    pub calls: AtomicUsize,
}

#[async_trait]
impl WeatherProvider for FakeWeather {
    fn name(&self) -> &'static str {
        "fake-weather"
    }

    fn max_days(&self) -> u32 {
        7
    }

    async fn fetch(&self, _center: LatLng, days: u32) -> Result<Vec<RawForecastDay>, ServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok((0..days)
            .map(|i| RawForecastDay {
                date: format!("2026-10-{}", 20 + i),
                temp_max: 24.0,
                temp_min: 16.0,
                condition: (if i % 2 == 0 { "Light rain shower" } else { "Sunny" }).to_string(),
                rain_chance: 40.0,
                humidity: 85.0,
                precipitation: 0.5,
            })
            .collect())
    }
}

pub struct TestApp {
    pub geocoder: Arc<FakeGeocoder>,
    pub places: Arc<FakePlaces>,
    pub llm: Arc<FakeLlm>,
    pub weather: Arc<FakeWeather>,
}

impl TestApp {
    pub fn new(llm: Arc<FakeLlm>) -> Self {
        Self::with_center(llm, DALAT)
    }

    pub fn with_center(llm: Arc<FakeLlm>, center: LatLng) -> Self {
        Self {
            geocoder: FakeGeocoder::new(center),
            places: FakePlaces::dalat(),
            llm,
            weather: Arc::new(FakeWeather { calls: AtomicUsize::new(0) }),
        }
    }

    pub fn resolver(&self) -> Arc<PlaceResolver> {
        Arc::new(PlaceResolver::new(self.places.clone(), self.geocoder.clone()))
    }

    pub fn generator(&self) -> ItineraryGenerator {
        let config = ItineraryGenerationConfig {
            place_timeout: Duration::from_secs(2),
            ..Default::default()
        };
        ItineraryGenerator::with_config(
            self.llm.clone(),
            self.geocoder.clone(),
            self.resolver(),
            Arc::new(WeatherService::new(vec![self.weather.clone() as Arc<dyn WeatherProvider>])),
            Arc::new(ImageService::new(Client::new(), None)),
            config,
        )
    }

    pub fn state(&self) -> AppState {
        AppState {
            generator: self.generator(),
            resolver: self.resolver(),
            providers: ProviderStatus {
                maps: true,
                llm_model: "fake-model".to_string(),
                weather: vec!["fake-weather"],
                image_search: false,
            },
        }
    }

    pub fn create_app(
        &self,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .app_data(web::Data::new(self.state()))
            .configure(routes::configure)
    }
}
