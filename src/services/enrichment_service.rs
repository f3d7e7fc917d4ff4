use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use log::{info, warn};
use tokio::time::timeout;

use crate::models::itinerary::TripPlan;
use crate::models::location::LatLng;
use crate::models::place::ResolvedPlace;
use crate::services::geocoding_service::Geocoder;
use crate::services::place_resolver::PlaceLookup;

pub const DEFAULT_BATCH_SIZE: usize = 5;
pub const DEFAULT_PLACE_TIMEOUT: Duration = Duration::from_secs(15);

/// Attaches a [`ResolvedPlace`] to every activity, resolving each distinct place name once.
pub struct EnrichmentService {
    lookup: Arc<dyn PlaceLookup>,
    geocoder: Arc<dyn Geocoder>,
    batch_size: usize,
    place_timeout: Duration,
}

impl EnrichmentService {
    pub fn new(
        lookup: Arc<dyn PlaceLookup>,
        geocoder: Arc<dyn Geocoder>,
        batch_size: usize,
        place_timeout: Duration,
    ) -> Self {
        Self {
            lookup,
            geocoder,
            batch_size: batch_size.max(1),
            place_timeout,
        }
    }

    /// Geocode the destination once, then enrich. Returns the number of lookups made.
    pub async fn enrich(&self, plan: &mut TripPlan, destination: &str) -> usize {
        let center = self.geocoder.geocode(destination).await;
        self.enrich_with_center(plan, destination, center).await
    }

    /// Enrich with an already geocoded destination center, shared by every lookup.
    /// `LatLng::ZERO` runs the searches unbiased without geocoding again.
    ///
    /// Lookups run in batches of at most `batch_size`; a batch starts after the previous
    /// one finishes. A lookup that exceeds the per-place timeout becomes a default record.
    pub async fn enrich_with_center(
        &self,
        plan: &mut TripPlan,
        destination: &str,
        center: LatLng,
    ) -> usize {
        let names = distinct_places(plan);
        let mut resolved: HashMap<String, ResolvedPlace> = HashMap::with_capacity(names.len());

        for batch in names.chunks(self.batch_size) {
            let lookups = batch
                .iter()
                .map(|name| self.resolve_one(name, destination, center));
            let places = join_all(lookups).await;
            resolved.extend(batch.iter().cloned().zip(places));
        }

        for activity in plan.days.iter_mut().flat_map(|day| day.activities.iter_mut()) {
            activity.place_details = resolved.get(&activity.place).cloned();
        }

        let found = resolved.values().filter(|place| place.is_found()).count();
        info!(
            "Enriched {} activities from {} distinct places ({} found)",
            plan.activity_count(),
            names.len(),
            found
        );
        names.len()
    }

    async fn resolve_one(&self, name: &str, destination: &str, center: LatLng) -> ResolvedPlace {
        match timeout(self.place_timeout, self.lookup.resolve(name, destination, Some(center), None)).await {
            Ok(place) => place,
            Err(_) => {
                warn!("Place lookup for '{}' timed out after {:?}", name, self.place_timeout);
                ResolvedPlace::not_found(name)
            }
        }
    }
}

// Exact-string identity, first-seen order.
fn distinct_places(plan: &TripPlan) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for activity in plan.days.iter().flat_map(|day| day.activities.iter()) {
        if !names.contains(&activity.place) {
            names.push(activity.place.clone());
        }
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::itinerary::{Activity, DayPlan};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct CountingLookup {
        calls: Mutex<Vec<String>>,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
        delay: Duration,
        slow_place: Option<String>,
    }

    #[async_trait]
    impl PlaceLookup for CountingLookup {
        async fn resolve(
            &self,
            place_name: &str,
            _destination: &str,
            _location_bias: Option<LatLng>,
            _type_hint: Option<&str>,
        ) -> ResolvedPlace {
            self.calls.lock().unwrap().push(place_name.to_string());
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);

            let delay = if self.slow_place.as_deref() == Some(place_name) {
                Duration::from_millis(500)
            } else {
                self.delay
            };
            tokio::time::sleep(delay).await;

            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            ResolvedPlace {
                name: place_name.to_string(),
                lat: 10.0,
                lng: 106.0,
                ..Default::default()
            }
        }
    }

    struct CountingGeocoder(AtomicUsize);

    #[async_trait]
    impl Geocoder for CountingGeocoder {
        async fn geocode(&self, _address: &str) -> LatLng {
            self.0.fetch_add(1, Ordering::SeqCst);
            LatLng::new(10.77, 106.70)
        }
    }

    fn plan(days: &[&[&str]]) -> TripPlan {
        TripPlan {
            days: days
                .iter()
                .enumerate()
                .map(|(i, places)| DayPlan {
                    day: i as u32 + 1,
                    title: String::new(),
                    activities: places.iter().map(|p| Activity::new("09:00 - 10:00", p)).collect(),
                })
                .collect(),
            ..Default::default()
        }
    }

    fn service(lookup: Arc<CountingLookup>, geocoder: Arc<CountingGeocoder>, batch: usize) -> EnrichmentService {
        EnrichmentService::new(lookup, geocoder, batch, Duration::from_millis(100))
    }

    #[tokio::test]
    async fn test_duplicate_places_resolved_once() {
        let lookup = Arc::new(CountingLookup::default());
        let geocoder = Arc::new(CountingGeocoder(AtomicUsize::new(0)));
        let mut plan = plan(&[&["Chợ Bến Thành", "Nhà thờ Đức Bà"], &["Chợ Bến Thành"]]);

        let lookups = service(lookup.clone(), geocoder.clone(), 5)
            .enrich(&mut plan, "Hồ Chí Minh")
            .await;

        assert_eq!(lookups, 2);
        assert_eq!(
            *lookup.calls.lock().unwrap(),
            vec!["Chợ Bến Thành".to_string(), "Nhà thờ Đức Bà".to_string()]
        );
        assert_eq!(geocoder.0.load(Ordering::SeqCst), 1);
        assert_eq!(
            plan.days[0].activities[0].place_details,
            plan.days[1].activities[0].place_details
        );
        assert!(plan
            .days
            .iter()
            .flat_map(|d| d.activities.iter())
            .all(|a| a.place_details.is_some()));
    }

    #[tokio::test]
    async fn test_batches_bound_concurrency() {
        let lookup = Arc::new(CountingLookup {
            delay: Duration::from_millis(10),
            ..Default::default()
        });
        let geocoder = Arc::new(CountingGeocoder(AtomicUsize::new(0)));
        let names: Vec<String> = (0..12).map(|i| format!("Place {}", i)).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let mut plan = plan(&[&refs[..6], &refs[6..]]);

        let lookups = service(lookup.clone(), geocoder, 4)
            .enrich_with_center(&mut plan, "Huế", LatLng::new(16.46, 107.59))
            .await;

        assert_eq!(lookups, 12);
        assert_eq!(lookup.calls.lock().unwrap().len(), 12);
        assert!(lookup.max_in_flight.load(Ordering::SeqCst) <= 4);
    }

    #[tokio::test]
    async fn test_slow_lookup_becomes_default_record() {
        let lookup = Arc::new(CountingLookup {
            slow_place: Some("Cầu Vàng".to_string()),
            ..Default::default()
        });
        let geocoder = Arc::new(CountingGeocoder(AtomicUsize::new(0)));
        let mut plan = plan(&[&["Cầu Vàng", "Bà Nà Hills"]]);

        service(lookup, geocoder, 5)
            .enrich_with_center(&mut plan, "Đà Nẵng", LatLng::ZERO)
            .await;

        let slow = plan.days[0].activities[0].place_details.clone().unwrap();
        assert_eq!(slow, ResolvedPlace::not_found("Cầu Vàng"));
        let fast = plan.days[0].activities[1].place_details.clone().unwrap();
        assert!(fast.is_found());
    }

    #[tokio::test]
    async fn test_empty_plan_makes_no_lookups() {
        let lookup = Arc::new(CountingLookup::default());
        let geocoder = Arc::new(CountingGeocoder(AtomicUsize::new(0)));
        let mut plan = TripPlan::default();

        assert_eq!(service(lookup.clone(), geocoder, 5).enrich_with_center(&mut plan, "Huế", LatLng::ZERO).await, 0);
        assert!(lookup.calls.lock().unwrap().is_empty());
    }
}
