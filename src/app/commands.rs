//! Inbound commands to the application service.
//!
//! These represent actions requested by the outside world (the user's
//! taps, the scenario scheduler, lifecycle callbacks) that the
//! [`AppService`](super::service::AppService) interprets and acts upon.

use crate::config::AppConfig;
use crate::fsm::StateId;

/// Commands that external adapters can send into the application core.
#[derive(Debug, Clone)]
pub enum AppCommand {
    /// Send the current coordinates to the configured recipient.
    TextMe,

    /// Request the map presentation for the current coordinates.
    ShowMap,

    /// The user is leaving the screen; release resources and stop.
    Background,

    /// Force the FSM into a specific state (debug / testing only).
    ForceState(StateId),

    /// Hot-reload configuration (e.g. from a settings surface).
    UpdateConfig(AppConfig),

    /// Explicitly persist the current config to the store immediately.
    SaveConfig,
}
