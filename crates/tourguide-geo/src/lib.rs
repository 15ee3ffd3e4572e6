//! Tour Guide Geo
//!
//! Coordinates, great-circle distance and the geolocation provider.

pub mod distance;
pub mod geolocation;

pub use distance::{
    compute_distance_meters, format_distance, is_within_radius, EARTH_RADIUS_METERS,
};
pub use geolocation::{
    FixOutcome, FixedSource, GeolocationError, GeolocationManager, GeolocationOptions,
    GeolocationProvider, LocationState, PendingFix, PositionSource, RefreshTicket,
    UnavailableSource,
};

use serde::{Deserialize, Serialize};

/// Geographic point in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

impl std::fmt::Display for LatLng {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.4}, {:.4}", self.lat, self.lng)
    }
}

/// The user's position, which is unknown until a fix arrives
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum UserPosition {
    Present(LatLng),
    #[default]
    Absent,
}

impl UserPosition {
    pub fn is_present(&self) -> bool {
        matches!(self, Self::Present(_))
    }

    pub fn coords(&self) -> Option<LatLng> {
        match self {
            Self::Present(coords) => Some(*coords),
            Self::Absent => None,
        }
    }

    /// Distance from the user to `target`, if the user is located
    pub fn distance_to(&self, target: LatLng) -> Option<f64> {
        self.coords().map(|from| compute_distance_meters(from, target))
    }
}

impl From<LatLng> for UserPosition {
    fn from(coords: LatLng) -> Self {
        Self::Present(coords)
    }
}

impl From<Option<LatLng>> for UserPosition {
    fn from(coords: Option<LatLng>) -> Self {
        coords.map_or(Self::Absent, Self::Present)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_position_absent_by_default() {
        let pos = UserPosition::default();
        assert!(!pos.is_present());
        assert_eq!(pos.distance_to(LatLng::new(0.0, 0.0)), None);
    }

    #[test]
    fn test_user_position_from_option() {
        let here = LatLng::new(6.1550, -75.3739);
        assert_eq!(UserPosition::from(Some(here)), UserPosition::Present(here));
        assert_eq!(UserPosition::from(None), UserPosition::Absent);
    }

    #[test]
    fn test_latlng_display() {
        assert_eq!(LatLng::new(6.155, -75.3739).to_string(), "6.1550, -75.3739");
    }

    #[test]
    fn test_latlng_json_shape() {
        let json = serde_json::to_string(&LatLng::new(1.5, -2.0)).unwrap();
        assert_eq!(json, r#"{"lat":1.5,"lng":-2.0}"#);
    }
}
