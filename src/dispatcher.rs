//! SMS dispatcher.
//!
//! Composes coordinate messages and hands them to the radio through
//! [`SmsPort`], then surfaces the radio's asynchronous results as
//! user-visible notices.  Results travel over two bounded channels
//! owned by the dispatcher, one per result kind, correlated by token:
//!
//! ```text
//! ┌──────────────┐  SentResult      ┌──────────────┐
//! │  SMS radio   │─────────────────▶│  Dispatcher   │──▶ notices
//! │  (adapter)   │  DeliveryResult  │  (pump)       │
//! └──────────────┘─────────────────▶└──────────────┘
//! ```
//!
//! A token is assigned per accepted send; the radio reports at most one
//! send result and at most one delivery result for it.  Results may
//! arrive in any order and any number of ticks later.

use core::fmt::Write as _;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use log::{debug, info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::{CapabilityPort, EventSink, SmsPort};
use crate::config::{AppConfig, BODY_MAX_LEN, RECIPIENT_MAX_LEN};
use crate::error::SendError;
use crate::geo::Position;
use crate::permissions::{Capability, EnsureOutcome, PermissionGate};

/// Correlates a queued message with its radio results.
pub type SendToken = u32;

/// Notice when a send is attempted before any fix has been acquired.
pub const NOTICE_NO_POSITION: &str =
    "Location is not available. Cannot send SMS message without location.";

/// Notice when the user refuses the SMS capability.
pub const NOTICE_SMS_DENIED: &str = "No permission to send SMS was given";

/// Notice when the configured template cannot produce a sendable body.
pub const NOTICE_COMPOSE_FAILED: &str = "Message could not be composed";

// ───────────────────────────────────────────────────────────────
// Radio result types
// ───────────────────────────────────────────────────────────────

/// Radio's verdict on transmitting a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// The radio accepted and transmitted the message.
    Sent,
    /// Unspecified radio failure.
    GenericFailure,
    /// No network service available.
    NoService,
    /// The radio produced no protocol data unit.
    NullPdu,
    /// The radio is powered off.
    RadioOff,
}

impl SendOutcome {
    /// The user-visible notice for this result.
    pub const fn notice(self) -> &'static str {
        match self {
            Self::Sent => "SMS sent",
            Self::GenericFailure => "Generic failure",
            Self::NoService => "No service",
            Self::NullPdu => "Null PDU",
            Self::RadioOff => "Radio off",
        }
    }
}

/// Recipient network's verdict on delivering a transmitted message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Delivered,
    NotDelivered,
}

impl DeliveryOutcome {
    /// The user-visible notice for this result.
    pub const fn notice(self) -> &'static str {
        match self {
            Self::Delivered => "SMS delivered",
            Self::NotDelivered => "SMS not delivered",
        }
    }
}

/// Send result message, radio → dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SentResult {
    pub token: SendToken,
    pub outcome: SendOutcome,
}

/// Delivery result message, radio → dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryResult {
    pub token: SendToken,
    pub outcome: DeliveryOutcome,
}

/// Channel depth for radio results.  One slot per in-flight token is
/// plenty; the loop drains every tick.
pub const OUTCOME_DEPTH: usize = 4;

/// Send result channel, radio → dispatcher.
pub type SentChannel = Channel<CriticalSectionRawMutex, SentResult, OUTCOME_DEPTH>;

/// Delivery result channel, radio → dispatcher.
pub type DeliveredChannel = Channel<CriticalSectionRawMutex, DeliveryResult, OUTCOME_DEPTH>;

// ───────────────────────────────────────────────────────────────
// Outbound message
// ───────────────────────────────────────────────────────────────

/// A composed, ready-to-transmit message.  Field capacities enforce the
/// single-segment bound at the type level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    pub recipient: heapless::String<RECIPIENT_MAX_LEN>,
    pub body: heapless::String<BODY_MAX_LEN>,
}

/// Substitute `{lat}` / `{lon}` in `template` with the position rendered
/// at two decimal places.  Unknown `{...}` sequences pass through as-is.
pub fn compose_body(
    template: &str,
    position: &Position,
) -> Result<heapless::String<BODY_MAX_LEN>, SendError> {
    let mut body: heapless::String<BODY_MAX_LEN> = heapless::String::new();
    let mut rest = template;
    while let Some(idx) = rest.find('{') {
        let (head, tail) = rest.split_at(idx);
        body.push_str(head).map_err(|()| SendError::MessageTooLong)?;
        if let Some(after) = tail.strip_prefix("{lat}") {
            write!(body, "{:.2}", position.lat).map_err(|_| SendError::MessageTooLong)?;
            rest = after;
        } else if let Some(after) = tail.strip_prefix("{lon}") {
            write!(body, "{:.2}", position.lon).map_err(|_| SendError::MessageTooLong)?;
            rest = after;
        } else {
            body.push('{').map_err(|()| SendError::MessageTooLong)?;
            rest = &tail[1..];
        }
    }
    body.push_str(rest).map_err(|()| SendError::MessageTooLong)?;
    Ok(body)
}

/// Build the full outbound message for `position` from the configured
/// recipient and template.
pub fn compose_message(
    config: &AppConfig,
    position: &Position,
) -> Result<OutgoingMessage, SendError> {
    let recipient = heapless::String::try_from(config.recipient_number.as_str())
        .map_err(|()| SendError::RecipientInvalid)?;
    let body = compose_body(&config.body_template, position)?;
    Ok(OutgoingMessage { recipient, body })
}

// ───────────────────────────────────────────────────────────────
// Dispatcher
// ───────────────────────────────────────────────────────────────

/// Owns the result channels and the token counter.
pub struct SmsDispatcher {
    sent_results: SentChannel,
    delivery_results: DeliveredChannel,
    next_token: SendToken,
}

impl Default for SmsDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl SmsDispatcher {
    pub fn new() -> Self {
        Self {
            sent_results: Channel::new(),
            delivery_results: Channel::new(),
            next_token: 1,
        }
    }

    /// Attempt to send the current coordinates to the configured recipient.
    ///
    /// Every refusal path surfaces its own notice; a capability prompt in
    /// flight abandons the attempt silently (the decision notice arrives
    /// with the user's answer).  Returns the token of an accepted send.
    pub fn send(
        &mut self,
        position: Option<Position>,
        config: &AppConfig,
        gate: &mut PermissionGate,
        platform: &mut (impl SmsPort + CapabilityPort),
        sink: &mut impl EventSink,
    ) -> Option<SendToken> {
        let Some(position) = position else {
            warn!("Send refused: {}", SendError::NoPosition);
            sink.emit(&AppEvent::Notice(NOTICE_NO_POSITION));
            return None;
        };

        match gate.ensure(Capability::Sms, platform) {
            EnsureOutcome::Granted => {}
            EnsureOutcome::Denied => {
                warn!("Send refused: {}", SendError::CapabilityMissing);
                sink.emit(&AppEvent::Notice(NOTICE_SMS_DENIED));
                return None;
            }
            EnsureOutcome::PendingUserResponse => {
                // The user re-triggers the send after answering the prompt.
                info!("Send deferred: SMS capability prompt open");
                return None;
            }
        }

        let message = match compose_message(config, &position) {
            Ok(m) => m,
            Err(e) => {
                warn!("Send refused: {}", e);
                sink.emit(&AppEvent::Notice(NOTICE_COMPOSE_FAILED));
                return None;
            }
        };

        let token = self.next_token;
        self.next_token = self.next_token.wrapping_add(1);

        info!("SMS #{} -> {}: \"{}\"", token, message.recipient, message.body);
        platform.send(token, &message);
        sink.emit(&AppEvent::SmsQueued {
            token,
            recipient: message.recipient.clone(),
        });
        Some(token)
    }

    /// Collect radio results and surface each as its notice.  Called once
    /// per control tick.
    pub fn pump(&mut self, platform: &mut impl SmsPort, sink: &mut impl EventSink) {
        platform.poll_outcomes(&self.sent_results, &self.delivery_results);

        while let Ok(result) = self.sent_results.try_receive() {
            info!("SMS #{} send result: {:?}", result.token, result.outcome);
            sink.emit(&AppEvent::Notice(result.outcome.notice()));
        }
        while let Ok(result) = self.delivery_results.try_receive() {
            info!("SMS #{} delivery result: {:?}", result.token, result.outcome);
            sink.emit(&AppEvent::Notice(result.outcome.notice()));
        }
    }

    /// Drop any queued results.  Called when the app leaves the foreground
    /// and result listening is torn down; late results are never surfaced.
    pub fn teardown(&mut self) -> usize {
        let mut dropped = 0;
        while self.sent_results.try_receive().is_ok() {
            dropped += 1;
        }
        while self.delivery_results.try_receive().is_ok() {
            dropped += 1;
        }
        if dropped > 0 {
            debug!("Dropped {} unread radio results at teardown", dropped);
        }
        dropped
    }
}
