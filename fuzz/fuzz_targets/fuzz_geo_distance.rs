//! Fuzz target: coordinate rendering and great-circle distance
//!
//! Feeds arbitrary f64 bit patterns (including NaN, infinities, and
//! out-of-range degrees) through the display path and the distance
//! function, asserting that:
//! - rendering never panics
//! - the distance is always finite, non-negative, and bounded by half
//!   the Earth's circumference
//!
//! cargo fuzz run fuzz_geo_distance

#![no_main]

use libfuzzer_sys::fuzz_target;
use locaware::geo::{Position, haversine_distance_m};

fuzz_target!(|data: &[u8]| {
    if data.len() < 32 {
        return;
    }
    let a = Position::new(
        f64::from_le_bytes(data[0..8].try_into().unwrap()),
        f64::from_le_bytes(data[8..16].try_into().unwrap()),
    );
    let b = Position::new(
        f64::from_le_bytes(data[16..24].try_into().unwrap()),
        f64::from_le_bytes(data[24..32].try_into().unwrap()),
    );

    let _ = a.to_string();
    let _ = b.to_string();

    let d = haversine_distance_m(&a, &b);
    assert!(d.is_finite(), "distance must be defined for any input");
    assert!(d >= 0.0, "negative distance {d}");
    assert!(d <= 2.1e7, "distance {d} exceeds the antipodal bound");
});
