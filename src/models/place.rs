use serde::{Deserialize, Serialize};

use crate::models::location::LatLng;

/// Normalized place record produced by the place resolver.
///
/// Every field has a zero/empty default; `lat == lng == 0` means the place was not found.
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct ResolvedPlace {
    pub name: String,
    pub address: String,
    pub lat: f64,
    pub lng: f64,
    pub rating: f64,
    pub total_ratings: u32,
    pub photo_url: String,
    pub types: Vec<String>,
    pub price_level: u8,
    pub phone: String,
    pub website: String,
    pub opening_hours: Vec<String>,
    pub reviews: Vec<PlaceReview>,
    pub google_maps_link: String,
    pub booking_link: String,
    pub is_hotel: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct PlaceReview {
    pub author: String,
    pub rating: f64,
    pub text: String,
    pub time: String,
}

impl ResolvedPlace {
    /// The all-defaults record returned whenever a place cannot be resolved.
    pub fn not_found(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn location(&self) -> LatLng {
        LatLng::new(self.lat, self.lng)
    }

    pub fn is_found(&self) -> bool {
        self.location().is_known()
    }
}
