pub mod itinerary;
pub mod location;
pub mod place;
pub mod trip_request;
pub mod weather;
