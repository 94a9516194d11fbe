//! Simulated platform permission system.
//!
//! Each capability follows a script: either the grant already exists, or
//! a prompt opened via [`request`](crate::app::ports::CapabilityPort::request)
//! resolves to a scripted answer after a scripted delay.  Once a prompt
//! has been answered the platform stores the decision and auto-answers
//! any later request without re-prompting, like a real permission system.

use std::collections::VecDeque;

use log::{info, warn};

use crate::app::ports::CapabilityPort;
use crate::permissions::{Capability, PermissionDecision};

/// Scripted user behaviour for one capability.
#[derive(Debug, Clone, Copy)]
pub enum CapabilityScript {
    /// The grant exists before the app starts; no prompt ever opens.
    PreGranted,
    /// A prompt resolves to "allow" this long after it opens.
    GrantAfterMs(u64),
    /// A prompt resolves to "deny" this long after it opens.
    DenyAfterMs(u64),
    /// The user swipes the prompt away; it never resolves.
    Ignore,
}

impl CapabilityScript {
    fn grants(self) -> bool {
        matches!(self, Self::PreGranted | Self::GrantAfterMs(_))
    }
}

/// Scripted permission system driven by `advance(now_ms)`.
pub struct SimPermissions {
    scripts: [CapabilityScript; Capability::COUNT],
    granted: [bool; Capability::COUNT],
    /// Whether a prompt for the capability has ever been answered.
    resolved: [bool; Capability::COUNT],
    /// Due time of the open prompt, if any.
    prompt_due: [Option<u64>; Capability::COUNT],
    now_ms: u64,
    ready: VecDeque<PermissionDecision>,
}

impl SimPermissions {
    pub fn new(location: CapabilityScript, sms: CapabilityScript) -> Self {
        let scripts = [location, sms];
        let granted = [
            matches!(location, CapabilityScript::PreGranted),
            matches!(sms, CapabilityScript::PreGranted),
        ];
        Self {
            scripts,
            granted,
            resolved: [false; Capability::COUNT],
            prompt_due: [None; Capability::COUNT],
            now_ms: 0,
            ready: VecDeque::new(),
        }
    }

    /// Resolve every prompt due by `now_ms`.
    pub fn advance(&mut self, now_ms: u64) {
        self.now_ms = now_ms;
        for capability in Capability::ALL {
            let i = capability.index();
            let Some(due_ms) = self.prompt_due[i] else {
                continue;
            };
            if due_ms > now_ms {
                continue;
            }
            self.prompt_due[i] = None;
            let granted = self.scripts[i].grants();
            self.granted[i] = granted;
            self.resolved[i] = true;
            info!(
                "SIM permissions: user {} {}",
                if granted { "granted" } else { "denied" },
                capability.name()
            );
            self.ready.push_back(PermissionDecision {
                capability,
                granted,
            });
        }
    }

    /// Withdraw a grant mid-run, as if the user pulled it in settings.
    pub fn revoke(&mut self, capability: Capability) {
        let i = capability.index();
        if !self.granted[i] {
            return;
        }
        warn!("SIM permissions: {} revoked in settings", capability.name());
        self.granted[i] = false;
        self.resolved[i] = true;
        self.ready.push_back(PermissionDecision {
            capability,
            granted: false,
        });
    }
}

impl CapabilityPort for SimPermissions {
    fn is_granted(&self, capability: Capability) -> bool {
        self.granted[capability.index()]
    }

    fn request(&mut self, capability: Capability) {
        let i = capability.index();

        // A stored answer (pre-grant or past decision) short-circuits the
        // prompt and replays the decision.
        if self.resolved[i] || matches!(self.scripts[i], CapabilityScript::PreGranted) {
            self.ready.push_back(PermissionDecision {
                capability,
                granted: self.granted[i],
            });
            return;
        }

        if self.prompt_due[i].is_some() {
            return; // Prompt already open.
        }

        match self.scripts[i] {
            CapabilityScript::Ignore => {
                self.prompt_due[i] = Some(u64::MAX);
                info!(
                    "SIM permissions: prompt opened for {} (never answered)",
                    capability.name()
                );
            }
            CapabilityScript::PreGranted => {
                self.prompt_due[i] = Some(self.now_ms);
            }
            CapabilityScript::GrantAfterMs(delay_ms) | CapabilityScript::DenyAfterMs(delay_ms) => {
                self.prompt_due[i] = Some(self.now_ms + delay_ms);
                info!(
                    "SIM permissions: prompt opened for {} (answers in {}ms)",
                    capability.name(),
                    delay_ms
                );
            }
        }
    }

    fn poll_decision(&mut self) -> Option<PermissionDecision> {
        self.ready.pop_front()
    }
}
