//! Application configuration parameters
//!
//! All tunable parameters for the location/messaging core.
//! Values can be overridden via the persisted store or a JSON config file
//! passed to the demo binary.

use serde::{Deserialize, Serialize};

/// Maximum recipient length accepted by the outbound message type.
pub const RECIPIENT_MAX_LEN: usize = 24;

/// Maximum body length of a single outbound message segment.
pub const BODY_MAX_LEN: usize = 160;

/// Core application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    // --- Messaging ---
    /// Destination number for outbound coordinate messages
    pub recipient_number: String,
    /// Message body template; `{lat}` and `{lon}` are substituted at send time
    pub body_template: String,

    // --- Location ---
    /// Positioning provider requested from the platform
    pub provider: String,
    /// Minimum interval between forwarded fixes (milliseconds)
    pub update_interval_ms: u32,
    /// Minimum displacement between forwarded fixes (metres)
    pub min_displacement_m: f64,

    // --- Timing ---
    /// Control loop interval (milliseconds)
    pub control_tick_ms: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            // Messaging
            recipient_number: "0781633004".to_string(),
            body_template: "My current location is {lat}, {lon}".to_string(),

            // Location
            provider: "gps".to_string(),
            update_interval_ms: 30_000, // 30 s
            min_displacement_m: 10.0,

            // Timing
            control_tick_ms: 250, // 4 Hz
        }
    }
}
