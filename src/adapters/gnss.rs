//! Simulated GNSS receiver.
//!
//! Plays back a scripted fix timeline against monotonic loop time.
//! The route is loaded up front; [`SimGnss::advance`] consumes every fix
//! that has become due and decides, per the subscription gate, whether
//! it is forwarded to the domain.
//!
//! ## Forwarding gate
//!
//! A consumed fix always refreshes the cached last-known fix.  It is
//! forwarded through [`poll_fix`](crate::app::ports::GnssPort::poll_fix)
//! only while subscribed, and only when BOTH the minimum interval has
//! elapsed AND the minimum displacement has been covered since the last
//! forwarded fix.  The first fix after subscribing always passes.

use std::collections::VecDeque;

use log::{debug, info, warn};

use crate::app::ports::GnssPort;
use crate::geo::{Position, haversine_distance_m};

/// One scripted fix: becomes available once loop time reaches `at_ms`.
#[derive(Debug, Clone, Copy)]
pub struct TimedFix {
    pub at_ms: u64,
    pub position: Position,
}

/// Scripted GNSS receiver driven by `advance(now_ms)`.
pub struct SimGnss {
    provider: String,
    last_known: Option<Position>,
    route: Vec<TimedFix>,
    cursor: usize,
    subscribed: bool,
    min_interval_ms: u32,
    min_displacement_m: f64,
    /// Time and place of the last forwarded fix, for the gate.
    last_forwarded: Option<(u64, Position)>,
    ready: VecDeque<Position>,
}

impl SimGnss {
    pub fn new(provider: &str) -> Self {
        Self {
            provider: provider.to_string(),
            last_known: None,
            route: Vec::new(),
            cursor: 0,
            subscribed: false,
            min_interval_ms: 0,
            min_displacement_m: 0.0,
            last_forwarded: None,
            ready: VecDeque::new(),
        }
    }

    /// Pre-load the cached fix, as if a previous app had already used GNSS.
    pub fn seed_last_known(&mut self, position: Position) {
        self.last_known = Some(position);
    }

    /// Append a fix to the scripted route.  Fixes must be pushed in
    /// chronological order.
    pub fn push_fix(&mut self, at_ms: u64, lat: f64, lon: f64) {
        debug_assert!(
            self.route.last().is_none_or(|f| f.at_ms <= at_ms),
            "route fixes must be chronological"
        );
        self.route.push(TimedFix {
            at_ms,
            position: Position::at(lat, lon, at_ms),
        });
    }

    /// Consume every scripted fix due by `now_ms`.
    pub fn advance(&mut self, now_ms: u64) {
        while let Some(fix) = self.route.get(self.cursor) {
            if fix.at_ms > now_ms {
                break;
            }
            let fix = *fix;
            self.cursor += 1;

            // Every consumed fix refreshes the receiver cache, whether
            // or not the subscription gate forwards it.
            self.last_known = Some(fix.position);

            if self.subscribed && self.gate_passes(&fix) {
                self.last_forwarded = Some((fix.at_ms, fix.position));
                self.ready.push_back(fix.position);
                debug!("SIM gnss: forwarding fix {} at t+{}ms", fix.position, fix.at_ms);
            }
        }
    }

    fn gate_passes(&self, fix: &TimedFix) -> bool {
        match self.last_forwarded {
            None => true,
            Some((at_ms, position)) => {
                let elapsed_ms = fix.at_ms.saturating_sub(at_ms);
                let moved_m = haversine_distance_m(&position, &fix.position);
                elapsed_ms >= u64::from(self.min_interval_ms) && moved_m >= self.min_displacement_m
            }
        }
    }

    /// Fixes consumed from the route so far (test introspection).
    pub fn consumed(&self) -> usize {
        self.cursor
    }
}

impl GnssPort for SimGnss {
    fn last_known(&mut self, provider: &str) -> Option<Position> {
        if provider != self.provider {
            warn!(
                "SIM gnss: no provider '{}' (simulating '{}')",
                provider, self.provider
            );
            return None;
        }
        self.last_known
    }

    fn start_updates(&mut self, provider: &str, min_interval_ms: u32, min_displacement_m: f64) {
        if provider != self.provider {
            warn!(
                "SIM gnss: cannot subscribe to provider '{}' (simulating '{}')",
                provider, self.provider
            );
            return;
        }
        self.subscribed = true;
        self.min_interval_ms = min_interval_ms;
        self.min_displacement_m = min_displacement_m;
        // New subscription: the next fix passes the gate unconditionally.
        self.last_forwarded = None;
        info!(
            "SIM gnss: subscribed to '{}' (interval >= {}ms, displacement >= {:.1}m)",
            provider, min_interval_ms, min_displacement_m
        );
    }

    fn stop_updates(&mut self) {
        if self.subscribed {
            info!("SIM gnss: subscription cancelled");
        }
        self.subscribed = false;
        self.ready.clear();
    }

    fn poll_fix(&mut self) -> Option<Position> {
        self.ready.pop_front()
    }
}
