//! Outbound application events.
//!
//! The [`AppService`](super::service::AppService) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them — render a display line, pop a
//! toast-style notice, hand a marker to a map surface, or record them
//! in a test.

use crate::config::RECIPIENT_MAX_LEN;
use crate::dispatcher::SendToken;
use crate::fsm::StateId;
use crate::geo::Position;

/// Zoom level for the map presentation (street scale, single marker).
pub const MAP_ZOOM: f32 = 17.0;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The application service has started (carries initial state).
    Started(StateId),

    /// The FSM transitioned between states.
    StateChanged { from: StateId, to: StateId },

    /// The display surface should re-render the coordinate text.
    /// `None` renders the unknown-location fallback.
    PositionUpdated(Option<Position>),

    /// A short user-visible status notice (toast).
    Notice(&'static str),

    /// The map surface should centre on `position` and drop one marker.
    MapRequested { position: Position, zoom: f32 },

    /// A composed message was handed to the radio under `token`.
    SmsQueued {
        token: SendToken,
        recipient: heapless::String<RECIPIENT_MAX_LEN>,
    },
}
