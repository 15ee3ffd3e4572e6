//! Great-circle distance
//!
//! Haversine on a spherical earth. Good to well under a meter at the
//! radii the guide cares about.

use crate::LatLng;

/// Mean earth radius in meters
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Distance in meters between two points
pub fn compute_distance_meters(a: LatLng, b: LatLng) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();

    let s_lat = (d_lat / 2.0).sin();
    let s_lng = (d_lng / 2.0).sin();
    // Rounding can push h slightly past 1 for antipodal points
    let h = (s_lat * s_lat + lat1.cos() * lat2.cos() * s_lng * s_lng).clamp(0.0, 1.0);

    2.0 * EARTH_RADIUS_METERS * h.sqrt().asin()
}

/// Whether `b` lies within `radius_meters` of `a` (inclusive)
pub fn is_within_radius(a: LatLng, b: LatLng, radius_meters: f64) -> bool {
    compute_distance_meters(a, b) <= radius_meters
}

/// Human readable distance for list and marker labels
pub fn format_distance(meters: f64) -> String {
    if meters < 10.0 {
        format!("{:.1} m", meters)
    } else if meters < 1000.0 {
        format!("{:.0} m", meters)
    } else {
        format!("{:.1} km", meters / 1000.0)
    }
}
