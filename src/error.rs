#![allow(dead_code)] // Error types reserved for future typed port returns

//! Unified error types for the location/messaging core.
//!
//! A single `Error` enum that every subsystem can convert into, keeping the
//! top-level control loop's error handling uniform.  All variants are `Copy`
//! so they can be cheaply passed through the FSM and event loop without
//! allocation.

use core::fmt;

use crate::permissions::Capability;

// ---------------------------------------------------------------------------
// Top-level application error
// ---------------------------------------------------------------------------

/// Every fallible operation in the core funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A required capability was refused by the user.
    Permission(PermissionError),
    /// An outbound message could not be composed or handed to the radio.
    Send(SendError),
    /// Configuration is invalid or could not be loaded.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Permission(e) => write!(f, "permission: {e}"),
            Self::Send(e) => write!(f, "send: {e}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Permission errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionError {
    /// The user answered the platform prompt with a refusal.
    Denied(Capability),
}

impl fmt::Display for PermissionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Denied(cap) => write!(f, "{} capability denied", cap.name()),
        }
    }
}

impl From<PermissionError> for Error {
    fn from(e: PermissionError) -> Self {
        Self::Permission(e)
    }
}

// ---------------------------------------------------------------------------
// Send errors
// ---------------------------------------------------------------------------

/// Send errors are recoverable: each one aborts the current send attempt
/// and surfaces a notice, leaving the application state untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendError {
    /// No position has been acquired yet; there is nothing to send.
    NoPosition,
    /// SMS capability is missing and the platform prompt did not grant it.
    CapabilityMissing,
    /// The composed body does not fit a single message segment.
    MessageTooLong,
    /// The configured recipient does not fit the outbound number field.
    RecipientInvalid,
}

impl fmt::Display for SendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoPosition => write!(f, "no position available"),
            Self::CapabilityMissing => write!(f, "SMS capability missing"),
            Self::MessageTooLong => write!(f, "message exceeds segment size"),
            Self::RecipientInvalid => write!(f, "recipient number invalid"),
        }
    }
}

impl From<SendError> for Error {
    fn from(e: SendError) -> Self {
        Self::Send(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
