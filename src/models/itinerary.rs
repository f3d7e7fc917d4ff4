use serde::{Deserialize, Deserializer, Serialize};

use crate::models::{place::ResolvedPlace, weather::DayForecast};

/// Root itinerary aggregate, decoded from the model output and mutated in place by
/// every post-processing stage.
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct TripPlan {
    #[serde(default, deserialize_with = "deserialize_loose_string")]
    pub trip_name: String,
    #[serde(default, deserialize_with = "deserialize_loose_string")]
    pub overview: String,
    #[serde(default, deserialize_with = "deserialize_loose_string")]
    pub total_estimated_cost: String,
    #[serde(default)]
    pub days: Vec<DayPlan>,
    #[serde(default)]
    pub weather_forecast: Vec<DayForecast>,
    #[serde(default, deserialize_with = "deserialize_loose_string_list")]
    pub packing_list: Vec<String>,
    #[serde(default, deserialize_with = "deserialize_loose_string_list")]
    pub travel_tips: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct DayPlan {
    #[serde(default, deserialize_with = "deserialize_day_number")]
    pub day: u32,
    #[serde(default, deserialize_with = "deserialize_loose_string")]
    pub title: String,
    #[serde(default)]
    pub activities: Vec<Activity>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct Activity {
    /// "HH:MM - HH:MM", local wall clock.
    #[serde(default, deserialize_with = "deserialize_loose_string")]
    pub time: String,
    /// Place name as written by the model; the enrichment key.
    #[serde(default, deserialize_with = "deserialize_loose_string")]
    pub place: String,
    #[serde(default, deserialize_with = "deserialize_loose_string")]
    pub description: String,
    #[serde(default, deserialize_with = "deserialize_loose_string")]
    pub estimated_cost: String,
    #[serde(default, deserialize_with = "deserialize_loose_string")]
    pub tips: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place_details: Option<ResolvedPlace>,
}

impl TripPlan {
    pub fn activity_count(&self) -> usize {
        self.days.iter().map(|day| day.activities.len()).sum()
    }
}

impl Activity {
    pub fn new(time: &str, place: &str) -> Self {
        Self {
            time: time.to_string(),
            place: place.to_string(),
            ..Default::default()
        }
    }
}

// Models write numbers where text is expected ("estimated_cost": 150000), so text
// fields accept any scalar and render it back as a string.
fn deserialize_loose_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<serde_json::Value> = Option::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => String::new(),
        Some(value) => value_to_text(value),
    })
}

fn deserialize_loose_string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<serde_json::Value> = Option::deserialize(deserializer)?;
    match value {
        Some(serde_json::Value::Array(items)) => Ok(items
            .into_iter()
            .filter(|item| !item.is_null())
            .map(value_to_text)
            .collect()),
        Some(serde_json::Value::String(s)) if !s.trim().is_empty() => Ok(vec![s]),
        _ => Ok(Vec::new()),
    }
}

// Custom deserializer to accept 1, 1.0 and "1" as a day number
fn deserialize_day_number<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<serde_json::Value> = Option::deserialize(deserializer)?;
    match value {
        Some(serde_json::Value::Number(n)) => {
            if let Some(i) = n.as_u64() {
                Ok(u32::try_from(i).unwrap_or(0))
            } else if let Some(f) = n.as_f64() {
                Ok(if f.is_sign_positive() { f.round() as u32 } else { 0 })
            } else {
                Ok(0)
            }
        }
        Some(serde_json::Value::String(s)) => Ok(s
            .trim()
            .trim_start_matches(|c: char| !c.is_ascii_digit())
            .parse()
            .unwrap_or(0)),
        _ => Ok(0),
    }
}

fn value_to_text(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}
