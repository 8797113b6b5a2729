//! Utilities shared by the rickshaw server and client.

pub mod logger;
pub mod time;
