//! Fuzz target: message body composition
//!
//! Splits the input into coordinate bits and an arbitrary UTF-8
//! template, then composes the outbound body, asserting that:
//! - composition never panics, including on non-finite coordinates
//! - a composed body always fits the single-segment bound
//! - both placeholders are consumed whenever composition succeeds
//!
//! cargo fuzz run fuzz_body_template

#![no_main]

use libfuzzer_sys::fuzz_target;
use locaware::config::BODY_MAX_LEN;
use locaware::dispatcher::compose_body;
use locaware::geo::Position;

fuzz_target!(|data: &[u8]| {
    if data.len() < 16 {
        return;
    }
    let lat = f64::from_le_bytes(data[0..8].try_into().unwrap());
    let lon = f64::from_le_bytes(data[8..16].try_into().unwrap());
    let Ok(template) = core::str::from_utf8(&data[16..]) else {
        return;
    };

    let position = Position::new(lat, lon);
    if let Ok(body) = compose_body(template, &position) {
        assert!(
            body.len() <= BODY_MAX_LEN,
            "composed body exceeds the segment bound"
        );
        assert!(
            !body.contains("{lat}") && !body.contains("{lon}"),
            "placeholder survived substitution"
        );
    }
});
