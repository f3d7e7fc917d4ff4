pub mod enrichment_service;
pub mod geocoding_service;
pub mod http_client;
pub mod image_service;
pub mod itinerary_generation_service;
pub mod json_extraction;
pub mod llm_service;
pub mod log_redaction;
pub mod place_resolver;
pub mod places_service;
pub mod plan_sanitizer;
pub mod schedule_service;
pub mod text_sanitizer;
pub mod weather_service;
