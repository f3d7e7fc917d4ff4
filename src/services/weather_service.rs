//! Daily forecasts from WeatherAPI.com with an Open-Meteo fallback.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use log::{info, warn};
use reqwest::Client;
use serde::Deserialize;

use crate::error::ServiceError;
use crate::models::location::LatLng;
use crate::models::weather::{suggestion_for, DayForecast};
use crate::services::http_client::{normalize_base_url, send_json};
use crate::services::log_redaction::redact_secrets;

pub const WEATHER_API_BASE_URL: &str = "https://api.weatherapi.com/v1";
pub const OPEN_METEO_BASE_URL: &str = "https://api.open-meteo.com/v1";
const WEATHER_TIMEOUT_SECS: u64 = 10;

const RAIN_KEYWORDS: &[&str] = &["rain", "drizzle", "shower", "thunder", "storm"];
const SUNNY_KEYWORDS: &[&str] = &["sunny", "clear"];
const RAIN_CHANCE_THRESHOLD: f64 = 50.0;
const PRECIPITATION_THRESHOLD_MM: f64 = 1.0;

/// One provider day before classification.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawForecastDay {
    pub date: String,
    pub temp_max: f64,
    pub temp_min: f64,
    pub condition: String,
    pub rain_chance: f64,
    pub humidity: f64,
    pub precipitation: f64,
}

#[async_trait]
pub trait WeatherProvider: Send + Sync {
    fn name(&self) -> &'static str;

    /// Longest forecast the provider serves; requests are capped to it.
    fn max_days(&self) -> u32;

    async fn fetch(&self, center: LatLng, days: u32) -> Result<Vec<RawForecastDay>, ServiceError>;
}

/// Tries each provider in order; an empty list means no provider answered.
pub struct WeatherService {
    providers: Vec<Arc<dyn WeatherProvider>>,
}

impl WeatherService {
    pub fn new(providers: Vec<Arc<dyn WeatherProvider>>) -> Self {
        Self { providers }
    }

    pub fn provider_names(&self) -> Vec<&'static str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    pub async fn forecast(&self, center: LatLng, days: u32) -> Vec<DayForecast> {
        if days == 0 || !center.is_known() {
            return Vec::new();
        }

        for provider in &self.providers {
            let requested = days.min(provider.max_days());
            match provider.fetch(center, requested).await {
                Ok(raw) if !raw.is_empty() => {
                    info!("Weather from {}: {} days", provider.name(), raw.len());
                    return raw
                        .into_iter()
                        .take(requested as usize)
                        .enumerate()
                        .map(|(index, day)| classify(index, day))
                        .collect();
                }
                Ok(_) => warn!("Weather provider {} returned no days", provider.name()),
                Err(e) => warn!(
                    "Weather provider {} failed: {}",
                    provider.name(),
                    redact_secrets(&e.to_string())
                ),
            }
        }
        Vec::new()
    }
}

fn classify(index: usize, raw: RawForecastDay) -> DayForecast {
    let condition = raw.condition.to_lowercase();
    let is_rainy = RAIN_KEYWORDS.iter().any(|k| condition.contains(k))
        || raw.rain_chance >= RAIN_CHANCE_THRESHOLD
        || raw.precipitation >= PRECIPITATION_THRESHOLD_MM;
    let is_sunny = SUNNY_KEYWORDS.iter().any(|k| condition.contains(k));

    let day_name = NaiveDate::parse_from_str(&raw.date, "%Y-%m-%d")
        .map(|date| date.format("%A").to_string())
        .unwrap_or_default();

    DayForecast {
        day: u32::try_from(index + 1).unwrap_or(u32::MAX),
        date: raw.date,
        day_name,
        temp_max: raw.temp_max.round() as i32,
        temp_min: raw.temp_min.round() as i32,
        condition: raw.condition,
        rain_chance: raw.rain_chance.round().clamp(0.0, 100.0) as u8,
        humidity: raw.humidity.round().clamp(0.0, 100.0) as u8,
        precipitation: (raw.precipitation * 10.0).round() / 10.0,
        is_rainy,
        is_sunny,
        suggestion: suggestion_for(is_rainy, is_sunny).to_string(),
    }
}

fn coords(center: LatLng) -> String {
    format!("{},{}", center.lat, center.lng)
}

#[derive(Debug, Deserialize)]
struct WeatherApiResponse {
    #[serde(default)]
    forecast: WeatherApiForecast,
}

#[derive(Debug, Default, Deserialize)]
struct WeatherApiForecast {
    #[serde(default)]
    forecastday: Vec<WeatherApiDay>,
}

#[derive(Debug, Deserialize)]
struct WeatherApiDay {
    #[serde(default)]
    date: String,
    #[serde(default)]
    day: WeatherApiDaySummary,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WeatherApiDaySummary {
    maxtemp_c: f64,
    mintemp_c: f64,
    totalprecip_mm: f64,
    avghumidity: f64,
    daily_chance_of_rain: f64,
    condition: WeatherApiCondition,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WeatherApiCondition {
    text: String,
}

pub struct WeatherApiProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

impl WeatherApiProvider {
    pub fn new(client: Client, api_key: &str) -> Self {
        Self::with_base_url(client, api_key, WEATHER_API_BASE_URL)
    }

    pub fn with_base_url(client: Client, api_key: &str, base_url: &str) -> Self {
        Self {
            client,
            api_key: api_key.to_owned(),
            base_url: normalize_base_url(base_url),
        }
    }
}

#[async_trait]
impl WeatherProvider for WeatherApiProvider {
    fn name(&self) -> &'static str {
        "weatherapi"
    }

    fn max_days(&self) -> u32 {
        7
    }

    async fn fetch(&self, center: LatLng, days: u32) -> Result<Vec<RawForecastDay>, ServiceError> {
        let request = self
            .client
            .get(format!("{}/forecast.json", self.base_url))
            .query(&[
                ("key", self.api_key.clone()),
                ("q", coords(center)),
                ("days", days.to_string()),
                ("aqi", "no".to_string()),
                ("alerts", "no".to_string()),
            ])
            .timeout(Duration::from_secs(WEATHER_TIMEOUT_SECS));

        let response: WeatherApiResponse = send_json(request, "weatherapi forecast").await?;
        Ok(response
            .forecast
            .forecastday
            .into_iter()
            .map(|day| RawForecastDay {
                date: day.date,
                temp_max: day.day.maxtemp_c,
                temp_min: day.day.mintemp_c,
                condition: if day.day.condition.text.is_empty() {
                    "Clear".to_string()
                } else {
                    day.day.condition.text
                },
                rain_chance: day.day.daily_chance_of_rain,
                humidity: day.day.avghumidity,
                precipitation: day.day.totalprecip_mm,
            })
            .collect())
    }
}

#[derive(Debug, Deserialize)]
struct OpenMeteoResponse {
    daily: OpenMeteoDaily,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct OpenMeteoDaily {
    time: Vec<String>,
    weathercode: Vec<Option<u32>>,
    temperature_2m_max: Vec<Option<f64>>,
    temperature_2m_min: Vec<Option<f64>>,
    precipitation_sum: Vec<Option<f64>>,
    precipitation_probability_max: Vec<Option<f64>>,
    relative_humidity_2m_mean: Vec<Option<f64>>,
}

fn nth(values: &[Option<f64>], index: usize) -> f64 {
    values.get(index).copied().flatten().unwrap_or(0.0)
}

/// WMO weather interpretation code to an English condition.
pub fn wmo_condition(code: u32) -> &'static str {
    match code {
        0 => "Clear sky",
        1 => "Mainly clear",
        2 => "Partly cloudy",
        3 => "Overcast",
        45 | 48 => "Fog",
        51 | 53 | 55 => "Drizzle",
        56 | 57 => "Freezing drizzle",
        61 | 63 | 65 => "Rain",
        66 | 67 => "Freezing rain",
        71 | 73 | 75 | 77 => "Snow",
        80..=82 => "Rain showers",
        85 | 86 => "Snow showers",
        95 => "Thunderstorm",
        96 | 99 => "Thunderstorm with hail",
        _ => "Unknown",
    }
}

/// Keyless fallback provider.
pub struct OpenMeteoProvider {
    client: Client,
    base_url: String,
}

impl OpenMeteoProvider {
    pub fn new(client: Client) -> Self {
        Self::with_base_url(client, OPEN_METEO_BASE_URL)
    }

    pub fn with_base_url(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: normalize_base_url(base_url),
        }
    }
}

#[async_trait]
impl WeatherProvider for OpenMeteoProvider {
    fn name(&self) -> &'static str {
        "open-meteo"
    }

    fn max_days(&self) -> u32 {
        16
    }

    async fn fetch(&self, center: LatLng, days: u32) -> Result<Vec<RawForecastDay>, ServiceError> {
        let request = self
            .client
            .get(format!("{}/forecast", self.base_url))
            .query(&[
                ("latitude", center.lat.to_string()),
                ("longitude", center.lng.to_string()),
                (
                    "daily",
                    "weathercode,temperature_2m_max,temperature_2m_min,precipitation_sum,precipitation_probability_max,relative_humidity_2m_mean"
                        .to_string(),
                ),
                ("timezone", "auto".to_string()),
                ("forecast_days", days.to_string()),
            ])
            .timeout(Duration::from_secs(WEATHER_TIMEOUT_SECS));

        let response: OpenMeteoResponse = send_json(request, "open-meteo forecast").await?;
        let daily = response.daily;
        Ok(daily
            .time
            .iter()
            .enumerate()
            .map(|(i, date)| RawForecastDay {
                date: date.clone(),
                temp_max: nth(&daily.temperature_2m_max, i),
                temp_min: nth(&daily.temperature_2m_min, i),
                condition: daily
                    .weathercode
                    .get(i)
                    .copied()
                    .flatten()
                    .map_or("Unknown", wmo_condition)
                    .to_string(),
                rain_chance: nth(&daily.precipitation_probability_max, i),
                humidity: nth(&daily.relative_humidity_2m_mean, i),
                precipitation: nth(&daily.precipitation_sum, i),
            })
            .collect())
    }
}
