use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const MAX_TRIP_DAYS: u32 = 30;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TripRequest {
    pub destination: String,
    pub duration: u32,
    pub budget: BudgetLevel,
    /// `YYYY-MM-DD`
    pub start_date: String,
    #[serde(default)]
    pub preferences: String,
    #[serde(default)]
    pub activity_level: ActivityLevel,
    #[serde(default)]
    pub travel_group: TravelGroup,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub group_size: Option<u32>,
    #[serde(default)]
    pub travel_mode: Option<String>,
    #[serde(default = "default_active_time_start")]
    pub active_time_start: u8,
    #[serde(default = "default_active_time_end")]
    pub active_time_end: u8,
}

fn default_active_time_start() -> u8 {
    9
}

fn default_active_time_end() -> u8 {
    21
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BudgetLevel {
    Low,
    Medium,
    High,
}

impl BudgetLevel {
    pub fn description(&self) -> &'static str {
        match self {
            BudgetLevel::Low => "budget (free sights, street food, public transport)",
            BudgetLevel::Medium => "moderate (balance of quality and cost, varied dining)",
            BudgetLevel::High => "premium (4-5 star stays, fine dining, private transport)",
        }
    }

    /// Typical per-activity spend in VND
    pub fn cost_range_vnd(&self) -> (u32, u32) {
        match self {
            BudgetLevel::Low => (50_000, 150_000),
            BudgetLevel::Medium => (150_000, 500_000),
            BudgetLevel::High => (500_000, 2_000_000),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ActivityLevel {
    Low,
    #[default]
    Medium,
    High,
}

impl ActivityLevel {
    pub fn description(&self) -> &'static str {
        match self {
            ActivityLevel::Low => "relaxed (little physical activity, plenty of rest)",
            ActivityLevel::Medium => "balanced (sightseeing mixed with rest)",
            ActivityLevel::High => "active (hiking, adventure, long days)",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TravelGroup {
    #[default]
    Solo,
    Couple,
    Family,
    Friends,
}

impl TravelGroup {
    pub fn description(&self) -> &'static str {
        match self {
            TravelGroup::Solo => "solo traveller (flexible, free to explore)",
            TravelGroup::Couple => "couple (romantic, private)",
            TravelGroup::Family => "family (all ages, safe)",
            TravelGroup::Friends => "group of friends (lively, social)",
        }
    }
}

impl TripRequest {
    /// Check the request before any external call is made.
    pub fn validate(&self) -> Result<(), String> {
        if self.destination.trim().is_empty() {
            return Err("destination must not be empty".to_string());
        }
        if self.duration == 0 || self.duration > MAX_TRIP_DAYS {
            return Err(format!("duration must be between 1 and {} days", MAX_TRIP_DAYS));
        }
        if self.active_time_start > 23 || self.active_time_end > 23 {
            return Err("active hours must be between 0 and 23".to_string());
        }
        if self.active_time_start >= self.active_time_end {
            return Err("active_time_start must be earlier than active_time_end".to_string());
        }
        Ok(())
    }

    pub fn parsed_start_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.start_date.trim(), "%Y-%m-%d").ok()
    }
}
