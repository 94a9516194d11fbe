//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter       | Implements       | Connects to                  |
//! |---------------|------------------|------------------------------|
//! | `gnss`        | GnssPort         | Scripted fix timeline        |
//! | `log_sink`    | EventSink        | Terminal log output          |
//! | `modem`       | SmsPort          | Scripted radio results       |
//! | `permissions` | CapabilityPort   | Scripted user decisions      |
//! | `platform`    | Gnss+Sms+Cap     | Composite simulated device   |
//! | `store`       | ConfigPort       | In-memory key/value store    |
//! |               | StoragePort      |                              |
//! | `time`        | (clock queries)  | `std::time::Instant`         |
//!
//! The simulated adapters share one convention: the main loop calls
//! `advance(now_ms)` once per cycle with monotonic time, and each sim
//! resolves whatever its script says is due by then.  The port methods
//! themselves never look at the clock.

pub mod gnss;
pub mod log_sink;
pub mod modem;
pub mod permissions;
pub mod platform;
pub mod store;
pub mod time;
