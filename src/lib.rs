//! Locaware library.
//!
//! Exposes the pure-logic modules for integration testing and external
//! inspection.  All platform access is confined to the `adapters`
//! module behind the port traits in `app::ports`.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod dispatcher;
pub mod events;
pub mod fsm;
pub mod geo;
pub mod permissions;
pub mod schedule;
pub mod tracker;

pub mod error;

pub mod adapters;
