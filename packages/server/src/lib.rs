//! Ride matching coordinator for the campus rickshaw service.
//!
//! Students broadcast ride requests over a WebSocket channel, drivers accept or
//! decline them within a deadline, and both sides are kept in sync through
//! pushed notifications backed by a per-recipient notification log.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

pub mod bootstrap;
