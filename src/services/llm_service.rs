use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::ServiceError;
use crate::models::trip_request::TripRequest;
use crate::services::http_client::{normalize_base_url, send_json};

pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const GENERATION_TIMEOUT_SECS: u64 = 120;

/// A text-in, text-out language model.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, ServiceError>;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_p: f32,
    top_k: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

/// Gemini `generateContent` over REST.
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(client: Client, api_key: &str, model: &str) -> Self {
        Self::with_base_url(client, api_key, model, GEMINI_BASE_URL)
    }

    pub fn with_base_url(client: Client, api_key: &str, model: &str, base_url: &str) -> Self {
        Self {
            client,
            api_key: api_key.to_owned(),
            model: model.to_owned(),
            base_url: normalize_base_url(base_url),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, ServiceError> {
        let body = GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.8,
                top_p: 0.95,
                top_k: 40,
            },
        };

        let request = self
            .client
            .post(format!("{}/models/{}:generateContent", self.base_url, self.model))
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .timeout(Duration::from_secs(GENERATION_TIMEOUT_SECS));

        let response: GenerateResponse = send_json(request, "gemini generateContent").await?;
        let text: String = response
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| content.parts.into_iter().map(|part| part.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(ServiceError::Api("model returned an empty response".to_string()));
        }
        debug!("Model returned {} characters", text.len());
        Ok(text.trim().to_string())
    }
}

/// Prompt asking for a day-by-day plan in the JSON shape `TripPlan` decodes.
pub fn build_trip_prompt(request: &TripRequest) -> String {
    let categories = if request.categories.is_empty() {
        "all categories".to_string()
    } else {
        request.categories.join(", ")
    };
    let group_size = request
        .group_size
        .map_or("not specified".to_string(), |n| n.to_string());
    let travel_mode = request
        .travel_mode
        .as_deref()
        .filter(|m| !m.trim().is_empty())
        .unwrap_or("not specified");
    let preferences = if request.preferences.trim().is_empty() {
        "none"
    } else {
        request.preferences.trim()
    };
    let (cost_min, cost_max) = request.budget.cost_range_vnd();

    format!(
        r#"You are an experienced travel planner. Create a realistic, detailed itinerary.

TRIP
- Destination: {destination}
- Duration: {duration} days
- Start date: {start_date}
- Budget: {budget}
- Activity level: {activity}
- Travel group: {group}
- Group size: {group_size}
- Travel mode: {travel_mode}
- Preferred categories: {categories}
- Active hours: {active_start:02}:00 - {active_end:02}:00
- Other preferences: {preferences}

RULES
1. Every "place" must be the exact name of a real venue that can be found on Google Maps.
   No examples in parentheses, no "e.g.", no generic entries such as "Check in", "Shopping" or "Travel".
2. Times use "HH:MM - HH:MM". Activities last 1.5 to 3 hours and stay inside the active hours.
   Leave 15 to 45 minutes between consecutive activities.
3. Every activity has a concrete cost between {cost_min} and {cost_max} VND, written as an amount with "đ".
4. Write descriptions, tips, packing_list and travel_tips in Vietnamese.

Return ONLY this JSON, with no other text:
{{
  "trip_name": "string",
  "overview": "2-3 sentences",
  "total_estimated_cost": "5.000.000 - 7.000.000 đ",
  "days": [
    {{
      "day": 1,
      "title": "string",
      "activities": [
        {{
          "time": "08:00 - 10:00",
          "place": "exact place name",
          "description": "string",
          "estimated_cost": "100.000 - 200.000 đ",
          "tips": "string"
        }}
      ]
    }}
  ],
  "packing_list": ["5-8 items"],
  "travel_tips": ["5-7 tips"]
}}
"#,
        destination = request.destination.trim(),
        duration = request.duration,
        start_date = request.start_date,
        budget = request.budget.description(),
        activity = request.activity_level.description(),
        group = request.travel_group.description(),
        group_size = group_size,
        travel_mode = travel_mode,
        categories = categories,
        active_start = request.active_time_start,
        active_end = request.active_time_end,
        preferences = preferences,
        cost_min = cost_min,
        cost_max = cost_max,
    )
}
