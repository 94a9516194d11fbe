//! Capability gate.
//!
//! The gate sits between the domain core and the platform permission
//! system.  It caches what the platform has told us about each runtime
//! capability so that repeated checks never re-prompt the user, and it
//! deduplicates requests while a prompt is open.
//!
//! ## Decision lifecycle
//!
//! 1. A caller invokes [`PermissionGate::ensure`] for a capability.
//! 2. If the platform already reports the grant, the gate caches
//!    `Granted` and answers synchronously.
//! 3. Otherwise the gate opens a prompt through the port (once) and
//!    answers `PendingUserResponse` until the user decides.
//! 4. The user's answer arrives later as a [`PermissionDecision`];
//!    [`PermissionGate::absorb`] latches it and closes the pending flag.
//!
//! A latched `Denied` stays latched for the life of the process: the
//! platform would not re-prompt either, it would auto-answer from the
//! user's stored refusal.

use log::{debug, info, warn};

use crate::app::ports::CapabilityPort;

/// Runtime capabilities the application depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Capability {
    /// Fine-grained positioning (GNSS fixes and the cached last-known fix).
    Location = 0,
    /// Outbound SMS transmission.
    Sms = 1,
}

impl Capability {
    /// Number of capabilities (array sizing).
    pub const COUNT: usize = 2;

    /// All capabilities, for iteration.
    pub const ALL: [Capability; Self::COUNT] = [Self::Location, Self::Sms];

    /// Short label for log lines.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Location => "location",
            Self::Sms => "sms",
        }
    }

    pub(crate) const fn index(self) -> usize {
        self as usize
    }
}

/// What the gate currently knows about a capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PermissionState {
    /// No platform answer yet.
    #[default]
    Unknown,
    /// The platform reported or the user confirmed the grant.
    Granted,
    /// The user refused the capability.
    Denied,
}

/// A resolved user answer to a capability prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PermissionDecision {
    pub capability: Capability,
    pub granted: bool,
}

/// Result of an [`PermissionGate::ensure`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnsureOutcome {
    /// The capability is held; the caller may proceed now.
    Granted,
    /// The capability was refused; the caller must not proceed.
    Denied,
    /// A prompt is open; the caller should abandon the current attempt
    /// and wait for the decision to arrive.
    PendingUserResponse,
}

/// Cached capability state plus prompt bookkeeping.
pub struct PermissionGate {
    states: [PermissionState; Capability::COUNT],
    /// True while a prompt for the capability is open.
    pending: [bool; Capability::COUNT],
}

impl Default for PermissionGate {
    fn default() -> Self {
        Self::new()
    }
}

impl PermissionGate {
    pub fn new() -> Self {
        Self {
            states: [PermissionState::Unknown; Capability::COUNT],
            pending: [false; Capability::COUNT],
        }
    }

    /// Resolve a capability to a usable answer, prompting at most once.
    pub fn ensure(
        &mut self,
        capability: Capability,
        port: &mut impl CapabilityPort,
    ) -> EnsureOutcome {
        let i = capability.index();
        match self.states[i] {
            PermissionState::Granted => EnsureOutcome::Granted,
            PermissionState::Denied => EnsureOutcome::Denied,
            PermissionState::Unknown => {
                if port.is_granted(capability) {
                    info!("Capability '{}' already granted", capability.name());
                    self.states[i] = PermissionState::Granted;
                    return EnsureOutcome::Granted;
                }
                if !self.pending[i] {
                    info!("Requesting capability '{}'", capability.name());
                    port.request(capability);
                    self.pending[i] = true;
                } else {
                    debug!(
                        "Capability '{}' prompt already open, not re-requesting",
                        capability.name()
                    );
                }
                EnsureOutcome::PendingUserResponse
            }
        }
    }

    /// Latch a resolved user decision.
    pub fn absorb(&mut self, decision: &PermissionDecision) {
        let i = decision.capability.index();
        let state = if decision.granted {
            PermissionState::Granted
        } else {
            PermissionState::Denied
        };
        if self.states[i] == PermissionState::Granted && !decision.granted {
            warn!("Capability '{}' revoked", decision.capability.name());
        } else {
            info!(
                "Capability '{}' decision: {}",
                decision.capability.name(),
                if decision.granted { "granted" } else { "denied" }
            );
        }
        self.states[i] = state;
        self.pending[i] = false;
    }

    /// Current cached state for a capability.
    pub fn state(&self, capability: Capability) -> PermissionState {
        self.states[capability.index()]
    }

    /// True while a prompt for the capability is open.
    pub fn is_pending(&self, capability: Capability) -> bool {
        self.pending[capability.index()]
    }

    pub fn is_granted(&self, capability: Capability) -> bool {
        self.state(capability) == PermissionState::Granted
    }
}
