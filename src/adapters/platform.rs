//! Composite simulated device.
//!
//! Bundles the GNSS, modem, and permission sims behind the three port
//! traits the [`AppService`](crate::app::service::AppService) consumes,
//! so a whole scenario runs against one object.  This is also where the
//! platform refuses capability-guarded calls: the domain re-checks, but
//! the boundary is the authoritative enforcement point.

use log::warn;

use crate::app::ports::{CapabilityPort, GnssPort, SmsPort};
use crate::dispatcher::{DeliveredChannel, OutgoingMessage, SendToken, SentChannel};
use crate::geo::Position;
use crate::permissions::{Capability, PermissionDecision};

use super::gnss::SimGnss;
use super::modem::SimModem;
use super::permissions::SimPermissions;

/// One simulated handset: receiver, radio, and permission system.
pub struct SimPlatform {
    gnss: SimGnss,
    modem: SimModem,
    permissions: SimPermissions,
}

impl SimPlatform {
    pub fn new(gnss: SimGnss, modem: SimModem, permissions: SimPermissions) -> Self {
        Self {
            gnss,
            modem,
            permissions,
        }
    }

    /// Advance every sim to `now_ms`.  Permissions resolve first so a
    /// grant landing this cycle already applies to the fixes behind it.
    pub fn advance(&mut self, now_ms: u64) {
        self.permissions.advance(now_ms);
        self.gnss.advance(now_ms);
        self.modem.advance(now_ms);
    }

    pub fn gnss_mut(&mut self) -> &mut SimGnss {
        &mut self.gnss
    }

    pub fn modem(&self) -> &SimModem {
        &self.modem
    }

    pub fn modem_mut(&mut self) -> &mut SimModem {
        &mut self.modem
    }

    pub fn permissions_mut(&mut self) -> &mut SimPermissions {
        &mut self.permissions
    }
}

// ── GnssPort (location capability enforced here) ──────────────

impl GnssPort for SimPlatform {
    fn last_known(&mut self, provider: &str) -> Option<Position> {
        if !self.permissions.is_granted(Capability::Location) {
            warn!("SIM platform: last_known refused, location not granted");
            return None;
        }
        self.gnss.last_known(provider)
    }

    fn start_updates(&mut self, provider: &str, min_interval_ms: u32, min_displacement_m: f64) {
        if !self.permissions.is_granted(Capability::Location) {
            warn!("SIM platform: subscription refused, location not granted");
            return;
        }
        self.gnss
            .start_updates(provider, min_interval_ms, min_displacement_m);
    }

    fn stop_updates(&mut self) {
        // Releasing the subscription never needs the capability.
        self.gnss.stop_updates();
    }

    fn poll_fix(&mut self) -> Option<Position> {
        self.gnss.poll_fix()
    }
}

// ── SmsPort (sms capability enforced here) ────────────────────

impl SmsPort for SimPlatform {
    fn send(&mut self, token: SendToken, message: &OutgoingMessage) {
        if !self.permissions.is_granted(Capability::Sms) {
            warn!("SIM platform: SMS send refused, capability not granted");
            return;
        }
        self.modem.send(token, message);
    }

    fn poll_outcomes(&mut self, sent: &SentChannel, delivered: &DeliveredChannel) {
        self.modem.poll_outcomes(sent, delivered);
    }
}

// ── CapabilityPort ────────────────────────────────────────────

impl CapabilityPort for SimPlatform {
    fn is_granted(&self, capability: Capability) -> bool {
        self.permissions.is_granted(capability)
    }

    fn request(&mut self, capability: Capability) {
        self.permissions.request(capability);
    }

    fn poll_decision(&mut self) -> Option<PermissionDecision> {
        self.permissions.poll_decision()
    }
}
