use serde::{Deserialize, Serialize};

const EARTH_RADIUS_KM: f64 = 6371.0;

/// A WGS84 coordinate. `(0, 0)` is the "unknown" sentinel used across the pipeline.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, Default, PartialEq)]
pub struct LatLng {
    #[serde(default)]
    pub lat: f64,
    #[serde(default)]
    pub lng: f64,
}

impl LatLng {
    pub const ZERO: LatLng = LatLng { lat: 0.0, lng: 0.0 };

    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn is_known(&self) -> bool {
        self.lat != 0.0 || self.lng != 0.0
    }

    /// `Some(self)` when the coordinate is not the zero sentinel.
    pub fn known(self) -> Option<Self> {
        self.is_known().then_some(self)
    }

    /// Great-circle distance using the Haversine formula
    pub fn distance_km(&self, other: &LatLng) -> f64 {
        let lat1_rad = self.lat.to_radians();
        let lat2_rad = other.lat.to_radians();
        let delta_lat = (other.lat - self.lat).to_radians();
        let delta_lng = (other.lng - self.lng).to_radians();

        let a = (delta_lat / 2.0).sin().powi(2)
            + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

        EARTH_RADIUS_KM * c
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_unknown() {
        assert!(!LatLng::ZERO.is_known());
        assert_eq!(LatLng::ZERO.known(), None);
        assert!(LatLng::new(0.0, 105.8).is_known());
    }

    #[test]
    fn hanoi_to_saigon_distance() {
        let hanoi = LatLng::new(21.0285, 105.8542);
        let saigon = LatLng::new(10.8231, 106.6297);
        let d = hanoi.distance_km(&saigon);
        assert!((1130.0..1150.0).contains(&d), "unexpected distance {d}");
        assert_eq!(hanoi.distance_km(&hanoi), 0.0);
    }
}
