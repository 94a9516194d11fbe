//! Application service — the hexagonal core.
//!
//! [`AppService`] owns the FSM, capability gate, location tracker, and
//! SMS dispatcher.  It exposes a clean, platform-agnostic API.  All I/O
//! flows through port traits injected at call sites, making the entire
//! service testable with mock adapters.
//!
//! ```text
//!      GnssPort ──▶ ┌─────────────────────────┐ ──▶ EventSink
//! CapabilityPort ◀──│       AppService         │
//!       SmsPort ◀───│  FSM · Gate · Tracker    │
//!                   │      · Dispatcher        │
//!                   └─────────────────────────┘
//! ```

use log::{info, warn};

use crate::config::AppConfig;
use crate::dispatcher::{NOTICE_SMS_DENIED, SmsDispatcher};
use crate::fsm::context::{FsmContext, PermissionSnapshot};
use crate::fsm::states::build_state_table;
use crate::fsm::{Fsm, StateId};
use crate::geo::Position;
use crate::permissions::{Capability, PermissionGate};
use crate::tracker::LocationTracker;

use super::commands::AppCommand;
use super::events::{AppEvent, MAP_ZOOM};
use super::ports::{CapabilityPort, EventSink, GnssPort, SmsPort};

/// Notice when the map is requested before any fix has been acquired.
pub const NOTICE_MAP_NO_POSITION: &str = "Location not available";

// ───────────────────────────────────────────────────────────────
// AppService
// ───────────────────────────────────────────────────────────────

/// The application service orchestrates all domain logic.
pub struct AppService {
    fsm: Fsm,
    ctx: FsmContext,
    gate: PermissionGate,
    tracker: LocationTracker,
    dispatcher: SmsDispatcher,
    /// Seconds per control tick (derived from config).
    tick_secs: f32,
    tick_count: u64,
    config_dirty: bool,
    dirty_since_tick: u64,
}

impl AppService {
    /// Construct the service from configuration.
    ///
    /// Does **not** start the FSM — call [`start`](Self::start) next.
    pub fn new(config: AppConfig) -> Self {
        let tick_secs = config.control_tick_ms as f32 / 1000.0;
        let ctx = FsmContext::new(config);
        let state_table = build_state_table();
        let fsm = Fsm::new(state_table, StateId::Starting);

        Self {
            fsm,
            ctx,
            gate: PermissionGate::new(),
            tracker: LocationTracker::new(),
            dispatcher: SmsDispatcher::new(),
            tick_secs,
            tick_count: 0,
            config_dirty: false,
            dirty_since_tick: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Start the FSM in `Starting` and run the location capability check.
    ///
    /// A pre-granted platform resolves synchronously here, so the first
    /// tick already sees `Granted` and moves straight to `Active`.
    pub fn start(&mut self, platform: &mut impl CapabilityPort, sink: &mut impl EventSink) {
        self.fsm.start(&mut self.ctx);

        let requests = core::mem::take(&mut self.ctx.requests);
        if requests.request_location {
            let _ = self.gate.ensure(Capability::Location, platform);
        }
        self.snapshot_into_ctx();

        sink.emit(&AppEvent::Started(self.fsm.current_state()));
        info!("AppService started in {:?}", self.fsm.current_state());
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one full control cycle: absorb decisions → drain fixes →
    /// pump radio results → FSM → platform requests.
    ///
    /// The `platform` parameter satisfies [`GnssPort`], [`SmsPort`] **and**
    /// [`CapabilityPort`] — this avoids a double mutable borrow while
    /// keeping the port boundary explicit.
    pub fn tick(
        &mut self,
        platform: &mut (impl GnssPort + SmsPort + CapabilityPort),
        sink: &mut impl EventSink,
    ) {
        self.tick_count += 1;

        // Terminal states have released the subscription and listeners;
        // nothing is polled and nothing reaches the UI any more.
        if self.fsm.current_state().is_terminal() {
            return;
        }

        let prev_state = self.fsm.current_state();

        // 1. Absorb resolved capability decisions
        while let Some(decision) = platform.poll_decision() {
            self.gate.absorb(&decision);
            if decision.capability == Capability::Sms && !decision.granted {
                sink.emit(&AppEvent::Notice(NOTICE_SMS_DENIED));
            }
        }

        // 2. Drain forwarded fixes (only while actively tracking; a
        //    revocation absorbed above blocks rendering immediately)
        if prev_state == StateId::Active && self.gate.is_granted(Capability::Location) {
            while let Some(fix) = platform.poll_fix() {
                self.tracker.accept_fix(fix);
                sink.emit(&AppEvent::PositionUpdated(Some(fix)));
            }
        }

        // 3. Surface radio results as notices
        self.dispatcher.pump(platform, sink);

        // 4. Snapshot gate + tracker into the FSM blackboard
        self.snapshot_into_ctx();

        // 5. FSM tick (pure state logic)
        self.fsm.tick(&mut self.ctx);

        // 6. Apply platform requests written by state handlers
        self.apply_requests(platform, sink);

        // 7. Emit state change if the FSM moved
        let new_state = self.fsm.current_state();
        if new_state != prev_state {
            sink.emit(&AppEvent::StateChanged {
                from: prev_state,
                to: new_state,
            });
        }
    }

    // ── Command handling ──────────────────────────────────────

    /// Process an external command (user tap, scheduler, lifecycle).
    pub fn handle_command(
        &mut self,
        cmd: AppCommand,
        platform: &mut (impl GnssPort + SmsPort + CapabilityPort),
        sink: &mut impl EventSink,
    ) {
        match cmd {
            AppCommand::TextMe => {
                if self.fsm.current_state() != StateId::Active {
                    warn!("TextMe ignored in {:?}", self.fsm.current_state());
                    return;
                }
                self.dispatcher.send(
                    self.tracker.current(),
                    &self.ctx.config,
                    &mut self.gate,
                    platform,
                    sink,
                );
            }
            AppCommand::ShowMap => {
                if self.fsm.current_state() != StateId::Active {
                    warn!("ShowMap ignored in {:?}", self.fsm.current_state());
                    return;
                }
                match self.tracker.current() {
                    Some(position) => {
                        info!("Map requested at {} (zoom {})", position, MAP_ZOOM);
                        sink.emit(&AppEvent::MapRequested {
                            position,
                            zoom: MAP_ZOOM,
                        });
                    }
                    None => {
                        warn!("Map requested with no position");
                        sink.emit(&AppEvent::Notice(NOTICE_MAP_NO_POSITION));
                    }
                }
            }
            AppCommand::Background => {
                let prev = self.fsm.current_state();
                if prev.is_terminal() {
                    return;
                }
                self.fsm.force_transition(StateId::Stopped, &mut self.ctx);
                self.apply_requests(platform, sink);
                sink.emit(&AppEvent::StateChanged {
                    from: prev,
                    to: StateId::Stopped,
                });
            }
            AppCommand::ForceState(target) => {
                let prev = self.fsm.current_state();
                self.fsm.force_transition(target, &mut self.ctx);
                self.apply_requests(platform, sink);
                if prev != target {
                    sink.emit(&AppEvent::StateChanged {
                        from: prev,
                        to: target,
                    });
                }
            }
            AppCommand::UpdateConfig(new_config) => {
                self.mark_config_dirty();
                self.ctx.config = new_config;
                info!("Configuration updated at runtime");
            }
            AppCommand::SaveConfig => {
                self.dirty_since_tick = 0;
                self.mark_config_dirty();
                info!("Explicit config save requested (will flush on next auto-save check)");
            }
        }
    }

    // ── Queries ───────────────────────────────────────────────

    /// Current FSM state.
    pub fn state(&self) -> StateId {
        self.fsm.current_state()
    }

    /// Total control ticks executed since startup.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Current position, if any fix has been acquired.
    pub fn position(&self) -> Option<Position> {
        self.tracker.current()
    }

    /// On-screen coordinate text (or the unknown-location fallback).
    pub fn display_text(&self) -> String {
        self.tracker.display()
    }

    /// Clone of the live configuration (for read-back or delta updates).
    pub fn current_config(&self) -> AppConfig {
        self.ctx.config.clone()
    }

    // ── Internal ──────────────────────────────────────────────

    /// Copy gate and tracker state into the FSM blackboard.
    fn snapshot_into_ctx(&mut self) {
        self.ctx.perms = PermissionSnapshot {
            location: self.gate.state(Capability::Location),
            sms: self.gate.state(Capability::Sms),
            location_prompt_pending: self.gate.is_pending(Capability::Location),
        };
        self.ctx.position = self.tracker.current();
    }

    /// Translate FSM platform requests into port calls.
    fn apply_requests(
        &mut self,
        platform: &mut (impl GnssPort + SmsPort + CapabilityPort),
        sink: &mut impl EventSink,
    ) {
        let requests = core::mem::take(&mut self.ctx.requests);

        if requests.request_location {
            let _ = self.gate.ensure(Capability::Location, platform);
        }

        if requests.acquire_position {
            self.tracker
                .pull_last_known(platform, &self.ctx.config.provider);
            // Render whatever we now hold, including the unknown fallback.
            sink.emit(&AppEvent::PositionUpdated(self.tracker.current()));
            self.tracker.start_updates(platform, &self.ctx.config);
            self.ctx.position = self.tracker.current();
        }

        if requests.stop_updates {
            self.tracker.stop_updates(platform);
            self.dispatcher.teardown();
        }
    }

    // ── Config dirty-flag management ──────────────────────────

    /// Mark the config as modified. Called by `handle_command(UpdateConfig)`.
    pub fn mark_config_dirty(&mut self) {
        if !self.config_dirty {
            self.config_dirty = true;
            self.dirty_since_tick = self.tick_count;
        }
    }

    /// Check if auto-save should trigger (5 seconds after last change).
    /// Returns `true` if the config was saved.
    pub fn auto_save_if_needed(&mut self, storage: &impl super::ports::ConfigPort) -> bool {
        if !self.config_dirty {
            return false;
        }
        let ticks_since_dirty = self.tick_count.saturating_sub(self.dirty_since_tick);
        let secs_since_dirty = ticks_since_dirty as f32 * self.tick_secs;
        if secs_since_dirty < 5.0 {
            return false;
        }
        match storage.save(&self.ctx.config) {
            Ok(()) => {
                self.config_dirty = false;
                log::info!("Config auto-saved to store");
                true
            }
            Err(e) => {
                log::warn!("Config auto-save failed: {}", e);
                false
            }
        }
    }

    /// Force-save if dirty (call before process exit).
    pub fn force_save_if_dirty(&mut self, storage: &impl super::ports::ConfigPort) {
        if !self.config_dirty {
            return;
        }
        match storage.save(&self.ctx.config) {
            Ok(()) => {
                self.config_dirty = false;
                log::info!("Config force-saved before shutdown");
            }
            Err(e) => {
                log::warn!("Config force-save failed: {}", e);
            }
        }
    }

    /// Whether the config has unsaved changes.
    pub fn is_config_dirty(&self) -> bool {
        self.config_dirty
    }
}
