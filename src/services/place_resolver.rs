//! Turns a free-text place name from the model into a [`ResolvedPlace`].

use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, warn};
use url::Url;

use crate::error::ServiceError;
use crate::models::location::LatLng;
use crate::models::place::{PlaceReview, ResolvedPlace};
use crate::services::geocoding_service::Geocoder;
use crate::services::log_redaction::redact_secrets;
use crate::services::places_service::{PlaceResult, PlaceSearchQuery, PlacesApi};
use crate::services::text_sanitizer::sanitize;

pub const MIN_QUERY_CHARS: usize = 3;
pub const MAX_CANDIDATES: usize = 5;
pub const MAX_REVIEWS: usize = 3;
pub const REVIEW_MAX_CHARS: usize = 200;
pub const SEARCH_BIAS_RADIUS_M: u32 = 30_000;
pub const NEARBY_RADIUS_M: u32 = 5_000;
pub const DEFAULT_SUGGESTION_LIMIT: usize = 6;
pub const MAX_SUGGESTION_LIMIT: usize = 20;

const LODGING_TYPES: &[&str] = &["lodging", "hotel", "resort", "guest_house", "motel"];
const LODGING_KEYWORDS: &[&str] = &[
    "khách sạn",
    "khach san",
    "nhà nghỉ",
    "nha nghi",
    "homestay",
    "resort",
    "hostel",
    "hotel",
    "motel",
    "villa",
    "guest house",
    "guesthouse",
];
const LODGING_HINTS: &[&str] = &["lodging", "hotel", "accommodation", "khách sạn", "lưu trú"];

const BOOKING_SEARCH_URL: &str = "https://www.booking.com/searchresults.html";
const MAPS_SEARCH_URL: &str = "https://www.google.com/maps/search/";

/// Resolves one place name. Never fails; unresolvable names yield [`ResolvedPlace::not_found`].
///
/// A `location_bias` of `None` makes the resolver geocode `destination` itself; a zero
/// bias means the center is already known to be unavailable and the search runs unbiased.
#[async_trait]
pub trait PlaceLookup: Send + Sync {
    async fn resolve(
        &self,
        place_name: &str,
        destination: &str,
        location_bias: Option<LatLng>,
        type_hint: Option<&str>,
    ) -> ResolvedPlace;
}

pub struct PlaceResolver {
    places: Arc<dyn PlacesApi>,
    geocoder: Arc<dyn Geocoder>,
}

impl PlaceResolver {
    pub fn new(places: Arc<dyn PlacesApi>, geocoder: Arc<dyn Geocoder>) -> Self {
        Self { places, geocoder }
    }

    async fn search_center(&self, destination: &str, location_bias: Option<LatLng>) -> Option<LatLng> {
        match location_bias {
            Some(bias) => bias.known(),
            None => self.geocoder.geocode(destination).await.known(),
        }
    }

    async fn try_resolve(
        &self,
        place_name: &str,
        query: &str,
        destination: &str,
        center: Option<LatLng>,
        lodging: bool,
    ) -> Result<ResolvedPlace, ServiceError> {
        let search = PlaceSearchQuery {
            query: format!("{} {}", query, destination.trim()).trim().to_string(),
            bias: center,
            radius_m: SEARCH_BIAS_RADIUS_M,
            place_type: lodging.then(|| "lodging".to_string()),
        };

        let candidates = self.places.text_search(&search).await?;
        let Some(candidate) = pick_candidate(candidates, center) else {
            debug!("No place found for '{}'", query);
            return Ok(ResolvedPlace::not_found(place_name));
        };

        let details = if candidate.place_id.is_empty() {
            None
        } else {
            self.places.place_details(&candidate.place_id).await?
        };

        Ok(self.build_record(place_name, destination, &candidate, details, lodging))
    }

    fn build_record(
        &self,
        place_name: &str,
        destination: &str,
        candidate: &PlaceResult,
        details: Option<PlaceResult>,
        lodging_hint: bool,
    ) -> ResolvedPlace {
        let details = details.unwrap_or_else(|| candidate.clone());

        let name = first_non_empty(&[details.name.as_str(), candidate.name.as_str(), place_name]).to_string();
        let address = first_non_empty(&[details.address(), candidate.address()]).to_string();
        let location = details.location().known().unwrap_or_else(|| candidate.location());
        let types = if details.types.is_empty() {
            candidate.types.clone()
        } else {
            details.types.clone()
        };
        let photo_url = details
            .first_photo_reference()
            .or_else(|| candidate.first_photo_reference())
            .map(|reference| self.places.photo_url(reference))
            .unwrap_or_default();

        let is_hotel = lodging_hint || types.iter().any(|t| LODGING_TYPES.contains(&t.as_str()));
        let booking_link = if is_hotel {
            booking_search_link(&format!("{} {}", name, destination.trim()), None, None, None)
        } else {
            String::new()
        };

        let place_id = first_non_empty(&[details.place_id.as_str(), candidate.place_id.as_str()]);
        let google_maps_link = if location.is_known() {
            maps_link(location, place_id)
        } else {
            String::new()
        };

        ResolvedPlace {
            name,
            address,
            lat: location.lat,
            lng: location.lng,
            rating: details.rating.or(candidate.rating).unwrap_or(0.0),
            total_ratings: details.user_ratings_total.or(candidate.user_ratings_total).unwrap_or(0),
            photo_url,
            types,
            price_level: details.price_level.or(candidate.price_level).unwrap_or(0),
            phone: details.formatted_phone_number.clone(),
            website: details.website.clone(),
            opening_hours: details
                .opening_hours
                .as_ref()
                .map(|hours| hours.weekday_text.clone())
                .unwrap_or_default(),
            reviews: details
                .reviews
                .iter()
                .take(MAX_REVIEWS)
                .map(|review| PlaceReview {
                    author: review.author_name.clone(),
                    rating: review.rating,
                    text: truncate_review(&review.text),
                    time: review.relative_time_description.clone(),
                })
                .collect(),
            google_maps_link,
            booking_link,
            is_hotel,
        }
    }

    /// Places near the destination center, without per-place details calls.
    pub async fn suggest_nearby(
        &self,
        destination: &str,
        location_bias: Option<LatLng>,
        type_hint: Option<&str>,
        limit: Option<usize>,
    ) -> Vec<ResolvedPlace> {
        let Some(center) = self.search_center(destination, location_bias).await else {
            debug!("No center for '{}', skipping nearby suggestions", destination);
            return Vec::new();
        };

        let hint = type_hint.map(str::trim).filter(|h| !h.is_empty());
        let lodging = hint.is_some_and(is_lodging_hint);
        let place_type = if lodging { Some("lodging") } else { hint };
        let limit = limit
            .unwrap_or(DEFAULT_SUGGESTION_LIMIT)
            .clamp(1, MAX_SUGGESTION_LIMIT);

        match self.places.nearby_search(center, NEARBY_RADIUS_M, place_type).await {
            Ok(results) => results
                .iter()
                .filter(|result| !result.name.trim().is_empty())
                .take(limit)
                .map(|result| self.build_record(&result.name, destination, result, None, lodging))
                .collect(),
            Err(e) => {
                warn!(
                    "Nearby search around '{}' failed: {}",
                    destination,
                    redact_secrets(&e.to_string())
                );
                Vec::new()
            }
        }
    }
}

#[async_trait]
impl PlaceLookup for PlaceResolver {
    async fn resolve(
        &self,
        place_name: &str,
        destination: &str,
        location_bias: Option<LatLng>,
        type_hint: Option<&str>,
    ) -> ResolvedPlace {
        let query = sanitize(place_name);
        if query.chars().count() < MIN_QUERY_CHARS {
            debug!("Skipping lookup for short place name '{}'", place_name);
            return ResolvedPlace::not_found(place_name);
        }

        let center = self.search_center(destination, location_bias).await;
        let lodging = wants_lodging(&query, type_hint);

        match self.try_resolve(place_name, &query, destination, center, lodging).await {
            Ok(place) => place,
            Err(e) => {
                warn!(
                    "Place lookup for '{}' failed: {}",
                    place_name,
                    redact_secrets(&e.to_string())
                );
                ResolvedPlace::not_found(place_name)
            }
        }
    }
}

/// Nearest of the first few candidates to `center`; the first candidate when no center is known.
fn pick_candidate(candidates: Vec<PlaceResult>, center: Option<LatLng>) -> Option<PlaceResult> {
    let candidates = candidates.into_iter().take(MAX_CANDIDATES);
    match center {
        None => candidates.into_iter().next(),
        Some(center) => candidates.min_by(|a, b| {
            distance_or_max(a, center)
                .partial_cmp(&distance_or_max(b, center))
                .unwrap_or(std::cmp::Ordering::Equal)
        }),
    }
}

fn distance_or_max(candidate: &PlaceResult, center: LatLng) -> f64 {
    candidate
        .location()
        .known()
        .map_or(f64::MAX, |location| location.distance_km(&center))
}

fn is_lodging_hint(hint: &str) -> bool {
    let hint = hint.to_lowercase();
    LODGING_HINTS.iter().any(|h| hint == *h)
}

fn wants_lodging(query: &str, type_hint: Option<&str>) -> bool {
    if type_hint.is_some_and(is_lodging_hint) {
        return true;
    }
    let query = query.to_lowercase();
    LODGING_KEYWORDS.iter().any(|keyword| query.contains(keyword))
}

fn first_non_empty<'a>(values: &[&'a str]) -> &'a str {
    values
        .iter()
        .copied()
        .find(|v| !v.trim().is_empty())
        .unwrap_or("")
}

fn truncate_review(text: &str) -> String {
    if text.chars().count() > REVIEW_MAX_CHARS {
        let mut truncated: String = text.chars().take(REVIEW_MAX_CHARS).collect();
        truncated.push_str("...");
        truncated
    } else {
        text.to_string()
    }
}

fn maps_link(location: LatLng, place_id: &str) -> String {
    let query = format!("{},{}", location.lat, location.lng);
    let mut params = vec![("api", "1"), ("query", query.as_str())];
    if !place_id.is_empty() {
        params.push(("query_place_id", place_id));
    }
    Url::parse_with_params(MAPS_SEARCH_URL, &params)
        .map(String::from)
        .unwrap_or_default()
}

/// Booking.com search link; dates are `YYYY-MM-DD` and only added when present.
pub fn booking_search_link(
    search: &str,
    checkin: Option<&str>,
    checkout: Option<&str>,
    guests: Option<u32>,
) -> String {
    let mut params: Vec<(&str, String)> = vec![("ss", search.trim().to_string())];
    if let Some(checkin) = checkin.filter(|d| !d.is_empty()) {
        params.push(("checkin", checkin.to_string()));
    }
    if let Some(checkout) = checkout.filter(|d| !d.is_empty()) {
        params.push(("checkout", checkout.to_string()));
    }
    if let Some(guests) = guests.filter(|g| *g > 0) {
        params.push(("group_adults", guests.to_string()));
    }
    Url::parse_with_params(BOOKING_SEARCH_URL, &params)
        .map(String::from)
        .unwrap_or_default()
}
