//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the logger, standing in for the on-screen UI.  A real screen adapter
//! would implement the same trait.

use log::info;

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;
use crate::tracker::UNKNOWN_LOCATION;

/// Adapter that logs every [`AppEvent`] to the terminal.
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LogEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started(state) => {
                info!("START | initial_state={:?}", state);
            }
            AppEvent::StateChanged { from, to } => {
                info!("STATE | {:?} -> {:?}", from, to);
            }
            AppEvent::PositionUpdated(Some(position)) => {
                info!("DISPLAY | {}", position);
            }
            AppEvent::PositionUpdated(None) => {
                info!("DISPLAY | {}", UNKNOWN_LOCATION);
            }
            AppEvent::Notice(text) => {
                info!("TOAST | {}", text);
            }
            AppEvent::MapRequested { position, zoom } => {
                info!("MAP | marker at {} (zoom {:.0})", position, zoom);
            }
            AppEvent::SmsQueued { token, recipient } => {
                info!("SMS | queued #{} to {}", token, recipient);
            }
        }
    }
}
