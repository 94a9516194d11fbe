//! Concrete state handler functions and table builder.
//!
//! Each state is defined by three plain `fn` pointers — no closures, no
//! dynamic dispatch, no heap.  This is the classic embedded C FSM pattern
//! expressed in safe Rust.
//!
//! ```text
//!  STARTING ──[prompt opened]──▶ AWAITING_LOCATION_PERMISSION
//!     │                                  │
//!  [granted]                          [granted]
//!     │          ┌─────────────────────┘
//!     ▼          ▼
//!           ACTIVE ──[backgrounded]──▶ STOPPED (terminal)
//!
//!  Starting / Awaiting / Active ──[location denied]──▶ TERMINATED (terminal)
//! ```
//!
//! Stopped and Terminated have no outgoing transitions: a backgrounded
//! or denied run ends, it never resumes.

use super::context::FsmContext;
use super::{StateDescriptor, StateId};
use log::{info, warn};

use crate::permissions::PermissionState;

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

/// Build the static state table.  Called once at startup.
pub fn build_state_table() -> [StateDescriptor; StateId::COUNT] {
    [
        // Index 0 — Starting
        StateDescriptor {
            id: StateId::Starting,
            name: "Starting",
            on_enter: Some(starting_enter),
            on_exit: None,
            on_update: starting_update,
        },
        // Index 1 — AwaitingLocationPermission
        StateDescriptor {
            id: StateId::AwaitingLocationPermission,
            name: "AwaitingLocationPermission",
            on_enter: Some(awaiting_enter),
            on_exit: None,
            on_update: awaiting_update,
        },
        // Index 2 — Active
        StateDescriptor {
            id: StateId::Active,
            name: "Active",
            on_enter: Some(active_enter),
            on_exit: None,
            on_update: active_update,
        },
        // Index 3 — Stopped
        StateDescriptor {
            id: StateId::Stopped,
            name: "Stopped",
            on_enter: Some(stopped_enter),
            on_exit: None,
            on_update: stopped_update,
        },
        // Index 4 — Terminated
        StateDescriptor {
            id: StateId::Terminated,
            name: "Terminated",
            on_enter: Some(terminated_enter),
            on_exit: None,
            on_update: terminated_update,
        },
    ]
}

// ═══════════════════════════════════════════════════════════════════════════
//  STARTING state — run the location capability check
// ═══════════════════════════════════════════════════════════════════════════

fn starting_enter(ctx: &mut FsmContext) {
    ctx.requests.request_location = true;
    info!("STARTING: checking location capability");
}

fn starting_update(ctx: &mut FsmContext) -> Option<StateId> {
    match ctx.perms.location {
        PermissionState::Granted => Some(StateId::Active),
        PermissionState::Denied => Some(StateId::Terminated),
        PermissionState::Unknown => {
            if ctx.perms.location_prompt_pending {
                return Some(StateId::AwaitingLocationPermission);
            }
            // Check not yet issued (or answered without a grant table hit):
            // ask again; the gate deduplicates.
            ctx.requests.request_location = true;
            None
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  AWAITING_LOCATION_PERMISSION state — prompt open in front of the user
// ═══════════════════════════════════════════════════════════════════════════

fn awaiting_enter(ctx: &mut FsmContext) {
    info!(
        "AWAITING: location prompt open ({} startup ticks)",
        ctx.total_ticks
    );
}

fn awaiting_update(ctx: &mut FsmContext) -> Option<StateId> {
    match ctx.perms.location {
        PermissionState::Granted => Some(StateId::Active),
        PermissionState::Denied => Some(StateId::Terminated),
        PermissionState::Unknown => None,
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  ACTIVE state — position acquired and tracked, user actions served
// ═══════════════════════════════════════════════════════════════════════════

fn active_enter(ctx: &mut FsmContext) {
    ctx.requests.acquire_position = true;
    info!(
        "ACTIVE: acquiring position (provider={}, interval={}ms, displacement={}m)",
        ctx.config.provider, ctx.config.update_interval_ms, ctx.config.min_displacement_m
    );
}

fn active_update(ctx: &mut FsmContext) -> Option<StateId> {
    // A revocation observed while running is as fatal as a startup denial.
    if ctx.perms.location == PermissionState::Denied {
        warn!("ACTIVE: location capability revoked");
        return Some(StateId::Terminated);
    }
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  STOPPED state — user left the screen, resources released (terminal)
// ═══════════════════════════════════════════════════════════════════════════

fn stopped_enter(ctx: &mut FsmContext) {
    ctx.requests.stop_updates = true;
    info!(
        "STOPPED: releasing subscription and listeners after {} ticks",
        ctx.total_ticks
    );
}

fn stopped_update(_ctx: &mut FsmContext) -> Option<StateId> {
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  TERMINATED state — location capability denied, run is over (terminal)
// ═══════════════════════════════════════════════════════════════════════════

fn terminated_enter(ctx: &mut FsmContext) {
    ctx.requests.stop_updates = true;
    warn!("TERMINATED: location capability denied, no recovery");
}

fn terminated_update(_ctx: &mut FsmContext) -> Option<StateId> {
    None
}
