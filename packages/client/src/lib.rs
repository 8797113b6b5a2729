//! Interactive terminal client for the campus rickshaw ride matching coordinator.

mod command;
mod domain;
mod error;
mod formatter;
mod runner;
mod session;
mod ui;

pub use command::{Command, CommandError, parse_command};
pub use error::ClientError;
pub use runner::{ConnectOptions, run_client};
