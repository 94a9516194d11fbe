//! Geographic position type and distance math
//!
//! A fix is a latitude/longitude pair in decimal degrees plus an optional
//! platform timestamp. Distance between fixes uses the haversine formula
//! on a spherical Earth, which is accurate to well under 0.5% at the
//! displacement scales the update gate cares about.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Mean Earth radius (metres)
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A single geographic fix
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Latitude in decimal degrees, south negative
    pub lat: f64,
    /// Longitude in decimal degrees, west negative
    pub lon: f64,
    /// Platform timestamp of the fix (milliseconds), `None` for seeded values
    pub timestamp_ms: Option<u64>,
}

impl Position {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self {
            lat,
            lon,
            timestamp_ms: None,
        }
    }

    pub fn at(lat: f64, lon: f64, timestamp_ms: u64) -> Self {
        Self {
            lat,
            lon,
            timestamp_ms: Some(timestamp_ms),
        }
    }
}

/// Display renders the on-screen coordinate form: `(lat,lon)` at two
/// decimal places, matching the label the UI surfaces next to the
/// send button.
impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.2},{:.2})", self.lat, self.lon)
    }
}

/// Great-circle distance between two fixes in metres.
pub fn haversine_distance_m(a: &Position, b: &Position) -> f64 {
    let lat_a = a.lat.to_radians();
    let lat_b = b.lat.to_radians();
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lon = (b.lon - a.lon).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_lon / 2.0).sin().powi(2);

    // h can creep above 1.0 from rounding on antipodal pairs; clamp before asin.
    2.0 * EARTH_RADIUS_M * h.sqrt().min(1.0).asin()
}
