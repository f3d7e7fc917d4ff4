use actix_web::{web, HttpResponse, Responder};
use serde::Serialize;

use crate::routes::{AppState, ProviderStatus};

#[derive(Serialize)]
struct HealthStatus {
    status: &'static str,
    version: &'static str,
    providers: ProviderStatus,
}

/// Liveness plus configured providers. Never calls the providers.
pub async fn health_check(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(HealthStatus {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        providers: state.providers.clone(),
    })
}
