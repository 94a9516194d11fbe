//! Timer/schedule engine.
//!
//! Drives deferred and repeating user actions alongside the control
//! loop.  The engine notifies a [`SchedulerDelegate`] when schedules
//! fire; the main loop implements the delegate to push events into the
//! loop queue.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     Trigger Sources                          │
//! │                                                              │
//! │   ┌────────────┐    ┌────────────┐    ┌────────────┐         │
//! │   │ Periodic   │    │ One-Shot   │    │ Scenario   │         │
//! │   │ Schedule   │    │ Timer      │    │ Script     │         │
//! │   └─────┬──────┘    └─────┬──────┘    └─────┬──────┘         │
//! │         │                 │                 │                │
//! │         ▼                 ▼                 ▼                │
//! │   ┌────────────────────────────────────────────────────┐     │
//! │   │              SchedulerDelegate                     │     │
//! │   │       (main loop pushes into Event Queue)          │     │
//! │   └───────────────────────┬────────────────────────────┘     │
//! │                           │                                  │
//! │                           ▼                                  │
//! │                    AppService.tick()                         │
//! │                    AppService.handle_command()               │
//! └──────────────────────────────────────────────────────────────┘
//! ```

use crate::app::ports::{ScheduleFiredKind, ScheduledAction, SchedulerDelegate};
use log::info;

// ═══════════════════════════════════════════════════════════════
//  Schedule types
// ═══════════════════════════════════════════════════════════════

/// A single schedule entry.
#[derive(Debug, Clone)]
pub struct Schedule {
    /// Human-readable label (e.g., "demo text-me").
    pub label: &'static str,
    /// The action this schedule triggers when it fires.
    pub action: ScheduledAction,
    /// Type of schedule.
    pub kind: ScheduleKind,
    /// Whether this schedule is currently enabled.
    pub enabled: bool,
}

/// The type of schedule determines how and when it fires.
#[derive(Debug, Clone)]
pub enum ScheduleKind {
    /// Fire every `interval_secs` seconds.
    Periodic { interval_secs: u32 },
    /// Fire once after `delay_secs`, then auto-disable.
    OneShot { delay_secs: u32 },
}

// ═══════════════════════════════════════════════════════════════
//  Scheduler engine
// ═══════════════════════════════════════════════════════════════

/// Maximum number of concurrent schedules (stack-allocated).
const MAX_SCHEDULES: usize = 8;

/// The scheduler engine.
///
/// This struct is intentionally decoupled from the event system.
/// When a schedule fires, it invokes the [`SchedulerDelegate`] callback
/// rather than directly pushing events.  This makes the scheduler
/// independently testable and reusable across different execution contexts.
pub struct Scheduler {
    /// Active schedules.
    schedules: [Option<ScheduleEntry>; MAX_SCHEDULES],
    /// Global enable flag.
    enabled: bool,
}

/// Internal bookkeeping for a live schedule.
#[derive(Debug, Clone)]
struct ScheduleEntry {
    schedule: Schedule,
    /// Ticks elapsed since last fire (for Periodic) or since add (OneShot).
    elapsed_ticks: u64,
    /// Whether the schedule has fired (for OneShot).
    fired: bool,
}

impl Scheduler {
    pub fn new() -> Self {
        Self {
            schedules: [None, None, None, None, None, None, None, None],
            enabled: true,
        }
    }

    /// Add a schedule.  Returns the slot index, or `None` if full.
    pub fn add(&mut self, schedule: Schedule) -> Option<usize> {
        for (i, slot) in self.schedules.iter_mut().enumerate() {
            if slot.is_none() {
                info!("Scheduler: added '{}' at slot {}", schedule.label, i);
                *slot = Some(ScheduleEntry {
                    schedule,
                    elapsed_ticks: 0,
                    fired: false,
                });
                return Some(i);
            }
        }
        None // All slots full.
    }

    /// Remove a schedule by slot index.
    pub fn remove(&mut self, slot: usize) {
        if slot < MAX_SCHEDULES {
            if let Some(entry) = &self.schedules[slot] {
                info!(
                    "Scheduler: removed '{}' from slot {}",
                    entry.schedule.label, slot
                );
            }
            self.schedules[slot] = None;
        }
    }

    /// Enable or disable the entire scheduler.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Tick the scheduler.  Call once per control loop tick.
    ///
    /// When a schedule fires, `delegate.on_schedule_fired()` is called
    /// with the schedule label, action, and fire kind.  The caller
    /// decides what to do with the notification (e.g., push an event).
    ///
    /// # Parameters
    ///
    /// * `tick_secs` — duration of one tick in seconds.
    /// * `delegate` — receives fire notifications.
    pub fn tick(&mut self, tick_secs: f32, delegate: &mut dyn SchedulerDelegate) {
        if !self.enabled {
            return;
        }

        for slot in self.schedules.iter_mut() {
            let entry = match slot {
                Some(e) if e.schedule.enabled => e,
                _ => continue,
            };

            entry.elapsed_ticks += 1;
            let elapsed_secs = entry.elapsed_ticks as f32 * tick_secs;

            match &entry.schedule.kind {
                ScheduleKind::Periodic { interval_secs } => {
                    if elapsed_secs >= *interval_secs as f32 {
                        info!(
                            "Scheduler: '{}' periodic fire (every {}s)",
                            entry.schedule.label, interval_secs
                        );
                        delegate.on_schedule_fired(
                            entry.schedule.label,
                            entry.schedule.action,
                            ScheduleFiredKind::Periodic,
                        );
                        entry.elapsed_ticks = 0;
                    }
                }

                ScheduleKind::OneShot { delay_secs } => {
                    if !entry.fired && elapsed_secs >= *delay_secs as f32 {
                        info!(
                            "Scheduler: '{}' one-shot fired (after {}s)",
                            entry.schedule.label, delay_secs
                        );
                        delegate.on_schedule_fired(
                            entry.schedule.label,
                            entry.schedule.action,
                            ScheduleFiredKind::OneShot,
                        );
                        entry.fired = true;
                        entry.schedule.enabled = false; // Auto-disable.
                    }
                }
            }
        }
    }

    /// Number of active (enabled) schedules.
    pub fn active_count(&self) -> usize {
        self.schedules
            .iter()
            .filter(|s| s.as_ref().is_some_and(|e| e.schedule.enabled))
            .count()
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
