//! Location tracker.
//!
//! Owns the single current [`Position`] and the fix subscription
//! lifecycle.  Every accepted fix replaces the previous one wholesale;
//! there is no history, smoothing, or interpolation.  Interval and
//! displacement gating happens on the platform side of [`GnssPort`],
//! so anything `poll_fix` hands us is accepted as-is.

use log::{debug, info};

use crate::app::ports::GnssPort;
use crate::config::AppConfig;
use crate::geo::Position;

/// Display text when no fix has been acquired yet.
pub const UNKNOWN_LOCATION: &str = "unknown location";

/// Current-position holder plus subscription state.
pub struct LocationTracker {
    current: Option<Position>,
    updates_active: bool,
}

impl Default for LocationTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl LocationTracker {
    pub fn new() -> Self {
        Self {
            current: None,
            updates_active: false,
        }
    }

    /// Seed the tracker from the platform's cached last-known fix.
    /// Returns what was pulled; `None` leaves any existing position alone.
    pub fn pull_last_known(
        &mut self,
        gnss: &mut impl GnssPort,
        provider: &str,
    ) -> Option<Position> {
        let pulled = gnss.last_known(provider);
        match pulled {
            Some(p) => {
                info!("Last-known fix from '{}': {}", provider, p);
                self.current = Some(p);
            }
            None => debug!("No cached fix for provider '{}'", provider),
        }
        pulled
    }

    /// Subscribe to continuous fixes using the configured gate parameters.
    pub fn start_updates(&mut self, gnss: &mut impl GnssPort, config: &AppConfig) {
        gnss.start_updates(
            &config.provider,
            config.update_interval_ms,
            config.min_displacement_m,
        );
        self.updates_active = true;
        info!(
            "Fix subscription started (provider={}, interval={}ms, displacement={}m)",
            config.provider, config.update_interval_ms, config.min_displacement_m
        );
    }

    /// Cancel the fix subscription.  Safe to call when not subscribed.
    pub fn stop_updates(&mut self, gnss: &mut impl GnssPort) {
        gnss.stop_updates();
        if self.updates_active {
            info!("Fix subscription stopped");
        }
        self.updates_active = false;
    }

    /// Accept a forwarded fix, replacing the current position wholesale.
    pub fn accept_fix(&mut self, fix: Position) {
        self.current = Some(fix);
    }

    /// The current position, if any fix has been acquired.
    pub fn current(&self) -> Option<Position> {
        self.current
    }

    /// Whether a fix subscription is active.
    pub fn updates_active(&self) -> bool {
        self.updates_active
    }

    /// On-screen coordinate text: `(lat,lon)` or the unknown fallback.
    pub fn display(&self) -> String {
        match self.current {
            Some(p) => p.to_string(),
            None => UNKNOWN_LOCATION.to_string(),
        }
    }
}
