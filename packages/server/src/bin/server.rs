//! Campus rickshaw ride matching server.
//!
//! Students request rides over WebSocket, nearby drivers receive the offer and
//! the first one to accept wins. Requests nobody accepts expire after the
//! configured timeout.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin rickshaw-server
//! cargo run --bin rickshaw-server -- --host 0.0.0.0 --port 3000 --request-timeout-secs 45
//! ```

use std::{sync::Arc, time::Duration};

use clap::Parser;

use rickshaw_server::{
    bootstrap::build_server,
    usecase::{
        MatchingConfig,
        config::{days, hours},
    },
};
use rickshaw_shared::{logger::setup_logger, time::SystemClock};

#[derive(Parser, Debug)]
#[command(name = "rickshaw-server")]
#[command(about = "Ride matching coordinator for the campus rickshaw service", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "8080")]
    port: u16,

    /// Seconds a ride request waits for a driver before it expires
    #[arg(long, default_value = "30")]
    request_timeout_secs: u64,

    /// Interval between expiry sweeps, in milliseconds
    #[arg(long, default_value = "1000")]
    sweep_interval_ms: u64,

    /// Days a notification is kept in the log
    #[arg(long, default_value = "7")]
    notification_retention_days: u64,

    /// Hours a finished ride request stays readable before it is purged
    #[arg(long, default_value = "24")]
    ride_retention_hours: u64,

    /// Interval between notification and ride retention sweeps, in seconds
    #[arg(long, default_value = "3600")]
    retention_sweep_secs: u64,
}

impl Args {
    fn matching_config(&self) -> MatchingConfig {
        MatchingConfig {
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            sweep_interval: Duration::from_millis(self.sweep_interval_ms.max(1)),
            notification_retention: days(self.notification_retention_days),
            ride_retention: hours(self.ride_retention_hours),
            retention_sweep_interval: Duration::from_secs(self.retention_sweep_secs.max(1)),
        }
    }
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "debug");

    let args = Args::parse();
    let config = args.matching_config();
    tracing::info!("Starting with {:?}", config);

    let server = build_server(config, Arc::new(SystemClock));
    if let Err(e) = server.run(args.host, args.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
