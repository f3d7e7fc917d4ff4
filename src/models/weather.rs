use serde::{Deserialize, Serialize};

pub const SUGGESTION_INDOOR: &str = "Indoor activities recommended";
pub const SUGGESTION_OUTDOOR: &str = "Great for outdoor activities";
pub const SUGGESTION_MIXED: &str = "Mixed activities suitable";

/// One forecast day, aligned by `day` with `DayPlan::day`.
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct DayForecast {
    pub day: u32,
    pub date: String,
    pub day_name: String,
    pub temp_max: i32,
    pub temp_min: i32,
    pub condition: String,
    pub rain_chance: u8,
    pub humidity: u8,
    pub precipitation: f64,
    pub is_rainy: bool,
    pub is_sunny: bool,
    pub suggestion: String,
}

/// Rainy wins over sunny when both flags are set.
pub fn suggestion_for(is_rainy: bool, is_sunny: bool) -> &'static str {
    if is_rainy {
        SUGGESTION_INDOOR
    } else if is_sunny {
        SUGGESTION_OUTDOOR
    } else {
        SUGGESTION_MIXED
    }
}
