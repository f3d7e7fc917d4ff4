use actix_web::{web, HttpResponse};
use log::error;
use serde::{Deserialize, Serialize};

use crate::error::PlanError;
use crate::models::location::LatLng;
use crate::models::place::ResolvedPlace;
use crate::models::trip_request::TripRequest;
use crate::routes::AppState;
use crate::services::log_redaction::redact_secrets;
use crate::services::place_resolver::PlaceLookup;

#[derive(Debug, Deserialize)]
pub struct ResolvePlaceRequest {
    pub place_name: String,
    pub destination: String,
    #[serde(default)]
    pub location_coords: Option<LatLng>,
    #[serde(default)]
    pub place_type_hint: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SuggestPlacesRequest {
    pub destination: String,
    #[serde(default)]
    pub location_coords: Option<LatLng>,
    #[serde(default)]
    pub place_type_hint: Option<String>,
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SuggestPlacesResponse {
    pub places: Vec<ResolvedPlace>,
}

/*
    POST /api/plan-trip
*/
pub async fn plan_trip(
    state: web::Data<AppState>,
    body: web::Json<TripRequest>,
) -> Result<HttpResponse, PlanError> {
    match state.generator.generate_and_enrich(&body).await {
        Ok(plan) => Ok(HttpResponse::Ok().json(plan)),
        Err(err) => {
            error!("Trip planning for '{}' failed: {}", body.destination, redact_secrets(&err.to_string()));
            Err(err)
        }
    }
}

/*
    POST /api/resolve-place
*/
pub async fn resolve_place(
    state: web::Data<AppState>,
    body: web::Json<ResolvePlaceRequest>,
) -> HttpResponse {
    // Zero coordinates from the client mean "unknown": geocode the destination instead.
    let place = state
        .resolver
        .resolve(
            &body.place_name,
            &body.destination,
            body.location_coords.and_then(LatLng::known),
            body.place_type_hint.as_deref(),
        )
        .await;
    HttpResponse::Ok().json(place)
}

/*
    POST /api/suggest-places
*/
pub async fn suggest_places(
    state: web::Data<AppState>,
    body: web::Json<SuggestPlacesRequest>,
) -> HttpResponse {
    let places = state
        .resolver
        .suggest_nearby(
            &body.destination,
            body.location_coords.and_then(LatLng::known),
            body.place_type_hint.as_deref(),
            body.limit,
        )
        .await;
    HttpResponse::Ok().json(SuggestPlacesResponse { places })
}
