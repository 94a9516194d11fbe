//! Port traits — the hexagonal boundary between domain logic and the platform.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AppService (domain)
//! ```
//!
//! Driven adapters (GNSS receiver, SMS radio, permission system, event sinks,
//! storage) implement these traits.  The [`AppService`](super::service::AppService)
//! consumes them via generics, so the domain core never touches a real platform
//! API directly.
//!
//! ## Capability notes
//!
//! - **GnssPort** implementations MUST refuse `last_known` and `start_updates`
//!   when the location capability is not granted — the domain re-checks, but
//!   the platform boundary is the authoritative enforcement point.
//! - **ConfigPort** implementations MUST validate before persisting.
//! - All port errors are typed — callers must handle every variant explicitly.

use crate::config::AppConfig;
use crate::dispatcher::{DeliveredChannel, OutgoingMessage, SendToken, SentChannel};
use crate::geo::Position;
use crate::permissions::{Capability, PermissionDecision};

// ───────────────────────────────────────────────────────────────
// GNSS port (driven adapter: positioning hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: the domain calls this to obtain position fixes.
pub trait GnssPort {
    /// Return the most recent fix the platform has cached for `provider`,
    /// if any.  Does not wait for a new fix.
    fn last_known(&mut self, provider: &str) -> Option<Position>;

    /// Subscribe to continuous fixes from `provider`.  The platform forwards
    /// a fix only when at least `min_interval_ms` has elapsed AND the device
    /// has moved at least `min_displacement_m` since the last forwarded fix;
    /// the first fix after subscribing always passes.
    fn start_updates(&mut self, provider: &str, min_interval_ms: u32, min_displacement_m: f64);

    /// Cancel the fix subscription.  Idempotent.
    fn stop_updates(&mut self);

    /// Drain at most one forwarded fix.  `None` when no fix is pending.
    fn poll_fix(&mut self) -> Option<Position>;
}

// ───────────────────────────────────────────────────────────────
// SMS port (driven adapter: domain → radio)
// ───────────────────────────────────────────────────────────────

/// Write-side port: the domain hands composed messages to the radio.
///
/// Sending is fire-and-forget at the call site; the radio reports two
/// asynchronous results per accepted message, correlated by `token`:
/// a send result (did the radio accept/transmit it) and a delivery
/// result (did the recipient's network confirm receipt).
pub trait SmsPort {
    /// Queue a message for transmission under `token`.
    fn send(&mut self, token: SendToken, message: &OutgoingMessage);

    /// Push any radio results that have become available into the
    /// dispatcher-owned channels.  Each token produces at most one
    /// result per channel, ever.
    fn poll_outcomes(&mut self, sent: &SentChannel, delivered: &DeliveredChannel);
}

// ───────────────────────────────────────────────────────────────
// Capability port (driven adapter: domain ↔ platform permission system)
// ───────────────────────────────────────────────────────────────

/// The platform's runtime permission surface.
///
/// `request` opens an asynchronous user prompt; the answer arrives later
/// as a [`PermissionDecision`] via `poll_decision`.  Requesting a
/// capability that already has a prompt open is a no-op.
pub trait CapabilityPort {
    /// Synchronous check against the platform's current grant table.
    fn is_granted(&self, capability: Capability) -> bool;

    /// Open the user prompt for `capability`.  Idempotent while pending.
    fn request(&mut self, capability: Capability);

    /// Drain at most one resolved user decision.
    fn poll_decision(&mut self) -> Option<PermissionDecision>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → UI / logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go (log lines, a real
/// screen, a test recorder).
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: domain ↔ persistent config)
// ───────────────────────────────────────────────────────────────

/// Loads and persists application configuration.
///
/// Implementations MUST validate config values on both load and save.
/// Invalid ranges are rejected with [`ConfigError::ValidationFailed`],
/// not silently clamped — a corrupted store must not be able to point
/// outbound messages at an arbitrary recipient or disable the fix gate.
pub trait ConfigPort {
    /// Load configuration from persistent storage.
    /// Returns [`AppConfig::default()`] if no stored config exists.
    fn load(&self) -> Result<AppConfig, ConfigError>;

    /// Validate and persist configuration.
    fn save(&self, config: &AppConfig) -> Result<(), ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// Storage port (driven adapter: domain ↔ key-value store)
// ───────────────────────────────────────────────────────────────

/// Persistent key-value storage for config and future per-device state.
///
/// - Keys are namespaced to prevent collisions between subsystems.
/// - Write operations MUST be atomic — no partial writes on power loss.
///   The in-memory simulation achieves this trivially.
pub trait StoragePort {
    /// Read a value.  Returns the number of bytes written to `buf`.
    fn read(&self, namespace: &str, key: &str, buf: &mut [u8]) -> Result<usize, StorageError>;

    /// Write a value atomically.
    fn write(&mut self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StorageError>;

    /// Delete a key.  Returns `Ok(())` even if the key didn't exist.
    fn delete(&mut self, namespace: &str, key: &str) -> Result<(), StorageError>;

    /// Check whether a key exists without reading it.
    fn exists(&self, namespace: &str, key: &str) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Scheduler delegate (decouples scheduler from event system)
// ───────────────────────────────────────────────────────────────

/// Callback trait that the scheduler invokes when a schedule fires.
///
/// This decouples the [`Scheduler`](crate::schedule::Scheduler) from the
/// loop event queue.  The main loop implements this by forwarding to
/// [`push_event`](crate::events::push_event), but the scheduler itself
/// knows nothing about events or queues.
pub trait SchedulerDelegate {
    /// Called when a schedule fires.
    ///
    /// * `label`  — the human-readable label of the schedule that fired.
    /// * `action` — the application action the schedule requests.
    /// * `kind`   — whether it was a periodic or one-shot fire.
    fn on_schedule_fired(&mut self, label: &str, action: ScheduledAction, kind: ScheduleFiredKind);
}

/// Application action carried by a schedule entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduledAction {
    /// Send the current coordinates to the configured recipient.
    TextMe,
    /// Request the map presentation for the current coordinates.
    ShowMap,
    /// Background the application (user leaves the screen).
    Background,
}

/// Discriminant passed to [`SchedulerDelegate::on_schedule_fired`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleFiredKind {
    /// A recurring periodic schedule fired.
    Periodic,
    /// A one-shot schedule fired (auto-disables after).
    OneShot,
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`ConfigPort`] operations.
#[derive(Debug)]
pub enum ConfigError {
    /// No config found in storage (first run).
    NotFound,
    /// Stored config failed integrity / deserialization check.
    Corrupted,
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
    /// Underlying storage is full.
    StorageFull,
    /// Generic I/O error from the storage backend.
    IoError,
}

/// Errors from [`StoragePort`] operations.
#[derive(Debug)]
pub enum StorageError {
    /// Requested key does not exist.
    NotFound,
    /// Storage partition is full.
    Full,
    /// Generic I/O error.
    IoError,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "config not found"),
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::StorageFull => write!(f, "storage full"),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl core::fmt::Display for StorageError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "key not found"),
            Self::Full => write!(f, "storage full"),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}
