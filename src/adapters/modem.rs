//! Simulated SMS radio.
//!
//! Accepts outbound messages and reports scripted results after scripted
//! latencies.  Everything a real radio would do asynchronously is driven
//! here by [`SimModem::advance`]: a send schedules its result(s), and
//! `advance` releases whichever results have become due.
//!
//! A message whose send result is a failure never produces a delivery
//! result, matching how carrier networks behave.

use std::collections::VecDeque;

use log::{info, warn};

use crate::app::ports::SmsPort;
use crate::dispatcher::{
    DeliveredChannel, DeliveryOutcome, DeliveryResult, OutgoingMessage, SendOutcome, SendToken,
    SentChannel, SentResult,
};

/// What the radio should report, and when.
#[derive(Debug, Clone, Copy)]
pub struct RadioScript {
    /// Result of the transmit attempt.
    pub sent: SendOutcome,
    /// Result of the network delivery (only reached when `sent` is `Sent`).
    pub delivery: DeliveryOutcome,
    /// Delay from send to the transmit result.
    pub sent_latency_ms: u64,
    /// Delay from send to the delivery result.
    pub delivery_latency_ms: u64,
}

impl Default for RadioScript {
    fn default() -> Self {
        Self {
            sent: SendOutcome::Sent,
            delivery: DeliveryOutcome::Delivered,
            sent_latency_ms: 200,
            delivery_latency_ms: 900,
        }
    }
}

/// Scripted SMS radio driven by `advance(now_ms)`.
pub struct SimModem {
    script: RadioScript,
    now_ms: u64,
    /// Every accepted message, in send order (test introspection).
    outbox: Vec<(SendToken, OutgoingMessage)>,
    pending_sent: Vec<(SendToken, u64)>,
    pending_delivery: Vec<(SendToken, u64)>,
    ready_sent: VecDeque<SentResult>,
    ready_delivery: VecDeque<DeliveryResult>,
}

impl SimModem {
    pub fn new(script: RadioScript) -> Self {
        Self {
            script,
            now_ms: 0,
            outbox: Vec::new(),
            pending_sent: Vec::new(),
            pending_delivery: Vec::new(),
            ready_sent: VecDeque::new(),
            ready_delivery: VecDeque::new(),
        }
    }

    /// Release every scheduled result due by `now_ms`.
    pub fn advance(&mut self, now_ms: u64) {
        self.now_ms = now_ms;

        let outcome = self.script.sent;
        let ready = &mut self.ready_sent;
        self.pending_sent.retain(|&(token, due_ms)| {
            if due_ms <= now_ms {
                ready.push_back(SentResult { token, outcome });
                false
            } else {
                true
            }
        });

        let outcome = self.script.delivery;
        let ready = &mut self.ready_delivery;
        self.pending_delivery.retain(|&(token, due_ms)| {
            if due_ms <= now_ms {
                ready.push_back(DeliveryResult { token, outcome });
                false
            } else {
                true
            }
        });
    }

    /// Messages accepted so far.
    pub fn sent_count(&self) -> usize {
        self.outbox.len()
    }

    /// The most recently accepted message.
    pub fn last_message(&self) -> Option<&OutgoingMessage> {
        self.outbox.last().map(|(_, message)| message)
    }

    /// Full outbox, in send order.
    pub fn outbox(&self) -> &[(SendToken, OutgoingMessage)] {
        &self.outbox
    }
}

impl SmsPort for SimModem {
    fn send(&mut self, token: SendToken, message: &OutgoingMessage) {
        info!(
            "SIM modem: tx #{} to {} ({} bytes)",
            token,
            message.recipient,
            message.body.len()
        );
        self.outbox.push((token, message.clone()));
        self.pending_sent
            .push((token, self.now_ms + self.script.sent_latency_ms));
        if self.script.sent == SendOutcome::Sent {
            self.pending_delivery
                .push((token, self.now_ms + self.script.delivery_latency_ms));
        }
    }

    fn poll_outcomes(&mut self, sent: &SentChannel, delivered: &DeliveredChannel) {
        while let Some(result) = self.ready_sent.pop_front() {
            if sent.try_send(result).is_err() {
                warn!(
                    "SIM modem: send result channel full, dropping #{}",
                    result.token
                );
            }
        }
        while let Some(result) = self.ready_delivery.pop_front() {
            if delivered.try_send(result).is_err() {
                warn!(
                    "SIM modem: delivery result channel full, dropping #{}",
                    result.token
                );
            }
        }
    }
}
