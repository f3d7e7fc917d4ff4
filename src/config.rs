use std::env;
use std::time::Duration;

use crate::error::ConfigError;

const HOST: &str = "0.0.0.0";
const PORT: u16 = 8080;
const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
const DEFAULT_BATCH_SIZE: usize = 5;
const DEFAULT_MAX_ACTIVITIES_PER_DAY: usize = 8;
const DEFAULT_WEATHER_LEAD_DAYS: i64 = 3;
const DEFAULT_PLACE_TIMEOUT_SECS: u64 = 15;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub google_maps_api_key: String,
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub weather_api_key: Option<String>,
    pub unsplash_access_key: Option<String>,
    pub geocode_region: String,
    pub places_language: String,
    pub enrich_batch_size: usize,
    pub max_activities_per_day: usize,
    pub weather_lead_days: i64,
    pub place_timeout: Duration,
}

impl AppConfig {
    /// Read configuration from the environment. Only the map and LLM keys are required.
    pub fn from_env() -> Result<Self, ConfigError> {
        let google_maps_api_key = required("GOOGLE_MAPS_API_KEY")?;
        let gemini_api_key = required("GEMINI_API_KEY")?;

        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| HOST.to_string()),
            port: parsed("PORT").unwrap_or(PORT),
            google_maps_api_key,
            gemini_api_key,
            gemini_model: env::var("GEMINI_MODEL")
                .unwrap_or_else(|_| DEFAULT_GEMINI_MODEL.to_string()),
            weather_api_key: optional("WEATHER_API_KEY"),
            unsplash_access_key: optional("UNSPLASH_ACCESS_KEY"),
            geocode_region: env::var("GEOCODE_REGION").unwrap_or_else(|_| "vn".to_string()),
            places_language: env::var("PLACES_LANGUAGE").unwrap_or_else(|_| "vi".to_string()),
            enrich_batch_size: parsed("ENRICH_BATCH_SIZE")
                .unwrap_or(DEFAULT_BATCH_SIZE)
                .max(1),
            max_activities_per_day: parsed("MAX_ACTIVITIES_PER_DAY")
                .unwrap_or(DEFAULT_MAX_ACTIVITIES_PER_DAY),
            weather_lead_days: parsed("WEATHER_LEAD_DAYS").unwrap_or(DEFAULT_WEATHER_LEAD_DAYS),
            place_timeout: Duration::from_secs(
                parsed("PLACE_TIMEOUT_SECS").unwrap_or(DEFAULT_PLACE_TIMEOUT_SECS),
            ),
        })
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    optional(name).ok_or(ConfigError::Missing(name))
}

fn optional(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parsed<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|s| s.trim().parse().ok())
}
