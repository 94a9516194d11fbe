//! Shared mutable context threaded through every FSM handler.
//!
//! `FsmContext` is the single struct that state handlers read from and
//! write to.  It contains the latest capability snapshot, the current
//! position, platform request outputs, timing information, and the
//! configuration.  Think of it as the "blackboard" in a blackboard
//! architecture.

use crate::config::AppConfig;
use crate::geo::Position;
use crate::permissions::PermissionState;

// ---------------------------------------------------------------------------
// Capability snapshot (read-only to state handlers; written by the service)
// ---------------------------------------------------------------------------

/// A point-in-time snapshot of what the capability gate knows.
#[derive(Debug, Clone, Copy, Default)]
pub struct PermissionSnapshot {
    /// Location capability state.
    pub location: PermissionState,
    /// SMS capability state.
    pub sms: PermissionState,
    /// True while the location prompt is open in front of the user.
    pub location_prompt_pending: bool,
}

// ---------------------------------------------------------------------------
// Platform requests (written by state handlers; consumed by the service)
// ---------------------------------------------------------------------------

/// Actions that state handlers request from the platform.
/// The service applies these through the ports after each FSM tick and
/// then clears them.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlatformRequests {
    /// Run the location capability check (prompting if needed).
    pub request_location: bool,
    /// Pull the last-known fix and open the fix subscription.
    pub acquire_position: bool,
    /// Tear down the fix subscription and result listeners.
    pub stop_updates: bool,
}

impl PlatformRequests {
    /// No requests — the idle default.
    pub fn none() -> Self {
        Self::default()
    }
}

// ---------------------------------------------------------------------------
// FsmContext
// ---------------------------------------------------------------------------

/// The shared context passed to every state handler function.
pub struct FsmContext {
    // -- Timing --
    /// Ticks elapsed since the current state was entered.
    pub ticks_in_state: u64,
    /// Monotonic total tick count.
    pub total_ticks: u64,
    /// Duration of one tick in seconds (inverse of control loop frequency).
    pub tick_period_secs: f32,

    // -- Capability data --
    /// Latest capability gate snapshot.  Updated before each FSM tick.
    pub perms: PermissionSnapshot,

    // -- Position --
    /// Current position as held by the tracker.  Updated before each tick.
    pub position: Option<Position>,

    // -- Platform outputs --
    /// Requests to be applied through the ports after the FSM tick.
    pub requests: PlatformRequests,

    // -- Configuration --
    /// Application configuration (tunable parameters).
    pub config: AppConfig,
}

impl FsmContext {
    /// Create a new context with the given configuration.
    pub fn new(config: AppConfig) -> Self {
        Self {
            ticks_in_state: 0,
            total_ticks: 0,
            tick_period_secs: config.control_tick_ms as f32 / 1000.0,
            perms: PermissionSnapshot::default(),
            position: None,
            requests: PlatformRequests::none(),
            config,
        }
    }

    /// Seconds elapsed since the current state was entered.
    pub fn secs_in_state(&self) -> f32 {
        self.ticks_in_state as f32 * self.tick_period_secs
    }

    /// Returns `true` once any fix has been acquired.
    pub fn has_position(&self) -> bool {
        self.position.is_some()
    }
}
