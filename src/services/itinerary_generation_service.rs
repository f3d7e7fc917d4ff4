use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, NaiveDate};
use log::{debug, info};

use crate::config::AppConfig;
use crate::error::PlanError;
use crate::models::itinerary::TripPlan;
use crate::models::location::LatLng;
use crate::models::trip_request::TripRequest;
use crate::models::weather::DayForecast;
use crate::services::enrichment_service::{EnrichmentService, DEFAULT_BATCH_SIZE, DEFAULT_PLACE_TIMEOUT};
use crate::services::geocoding_service::Geocoder;
use crate::services::image_service::ImageService;
use crate::services::json_extraction::parse_trip_plan;
use crate::services::llm_service::{build_trip_prompt, TextGenerator};
use crate::services::place_resolver::PlaceLookup;
use crate::services::plan_sanitizer::{
    cap_activities, remove_placeholders, renumber_days, DEFAULT_MAX_ACTIVITIES_PER_DAY,
};
use crate::services::schedule_service::apply_buffers;
use crate::services::weather_service::WeatherService;

const DEFAULT_WEATHER_LEAD_DAYS: i64 = 3;

#[derive(Clone, Debug)]
pub struct ItineraryGenerationConfig {
    pub max_activities_per_day: usize,
    pub batch_size: usize,
    /// Weather is only fetched for trips starting within this many days of today.
    pub weather_lead_days: i64,
    pub place_timeout: Duration,
}

impl Default for ItineraryGenerationConfig {
    fn default() -> Self {
        Self {
            max_activities_per_day: DEFAULT_MAX_ACTIVITIES_PER_DAY,
            batch_size: DEFAULT_BATCH_SIZE,
            weather_lead_days: DEFAULT_WEATHER_LEAD_DAYS,
            place_timeout: DEFAULT_PLACE_TIMEOUT,
        }
    }
}

impl From<&AppConfig> for ItineraryGenerationConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            max_activities_per_day: config.max_activities_per_day,
            batch_size: config.enrich_batch_size,
            weather_lead_days: config.weather_lead_days,
            place_timeout: config.place_timeout,
        }
    }
}

/// Turns a trip request into an enriched, schedule-consistent [`TripPlan`].
pub struct ItineraryGenerator {
    llm: Arc<dyn TextGenerator>,
    geocoder: Arc<dyn Geocoder>,
    enrichment: EnrichmentService,
    weather: Arc<WeatherService>,
    images: Arc<ImageService>,
    config: ItineraryGenerationConfig,
}

impl ItineraryGenerator {
    pub fn new(
        llm: Arc<dyn TextGenerator>,
        geocoder: Arc<dyn Geocoder>,
        lookup: Arc<dyn PlaceLookup>,
        weather: Arc<WeatherService>,
        images: Arc<ImageService>,
    ) -> Self {
        Self::with_config(llm, geocoder, lookup, weather, images, ItineraryGenerationConfig::default())
    }

    pub fn with_config(
        llm: Arc<dyn TextGenerator>,
        geocoder: Arc<dyn Geocoder>,
        lookup: Arc<dyn PlaceLookup>,
        weather: Arc<WeatherService>,
        images: Arc<ImageService>,
        config: ItineraryGenerationConfig,
    ) -> Self {
        let enrichment = EnrichmentService::new(
            lookup,
            geocoder.clone(),
            config.batch_size,
            config.place_timeout,
        );
        Self {
            llm,
            geocoder,
            enrichment,
            weather,
            images,
            config,
        }
    }

    pub fn config(&self) -> &ItineraryGenerationConfig {
        &self.config
    }

    /// Validate, prompt the model, then post-process its answer.
    ///
    /// # Errors
    ///
    /// `InvalidRequest` before any external call, `Generation` when the model call fails,
    /// and the extraction errors of [`parse_trip_plan`]. Enrichment problems never fail.
    pub async fn generate_and_enrich(&self, request: &TripRequest) -> Result<TripPlan, PlanError> {
        request.validate().map_err(PlanError::InvalidRequest)?;

        info!(
            "Generating {}-day trip to {}",
            request.duration,
            request.destination.trim()
        );
        let prompt = build_trip_prompt(request);
        let raw = self.llm.generate(&prompt).await?;

        self.post_process(&raw, request).await
    }

    pub async fn post_process(&self, raw: &str, request: &TripRequest) -> Result<TripPlan, PlanError> {
        self.post_process_on(raw, request, Local::now().date_naive()).await
    }

    /// [`post_process`](Self::post_process) with an explicit "today" for the weather window.
    pub async fn post_process_on(
        &self,
        raw: &str,
        request: &TripRequest,
        today: NaiveDate,
    ) -> Result<TripPlan, PlanError> {
        let mut plan = parse_trip_plan(raw)?;

        remove_placeholders(&mut plan);
        cap_activities(&mut plan, self.config.max_activities_per_day);
        renumber_days(&mut plan);
        apply_buffers(
            &mut plan,
            Some(request.active_time_start),
            Some(request.active_time_end),
            request.travel_mode.as_deref(),
        );

        let destination = request.destination.trim();
        let center = self.geocoder.geocode(destination).await;
        let fetch_weather = center.is_known()
            && request
                .parsed_start_date()
                .is_some_and(|start| within_weather_window(start, today, self.config.weather_lead_days));
        if !fetch_weather {
            debug!("Skipping weather for {} starting {}", destination, request.start_date);
        }

        let (forecast, _, cover_image) = futures::join!(
            self.forecast(fetch_weather, center, request.duration),
            self.enrichment.enrich_with_center(&mut plan, destination, center),
            self.images.cover_image(destination),
        );

        plan.weather_forecast = forecast;
        plan.cover_image = Some(cover_image);

        info!(
            "Planned {} days with {} activities and {} forecast days",
            plan.days.len(),
            plan.activity_count(),
            plan.weather_forecast.len()
        );
        Ok(plan)
    }

    async fn forecast(&self, enabled: bool, center: LatLng, days: u32) -> Vec<DayForecast> {
        if enabled {
            self.weather.forecast(center, days).await
        } else {
            Vec::new()
        }
    }
}

/// `0 <= start - today <= lead_days`.
pub fn within_weather_window(start: NaiveDate, today: NaiveDate, lead_days: i64) -> bool {
    let lead = (start - today).num_days();
    (0..=lead_days).contains(&lead)
}
