//! Terminal client for the campus rickshaw ride matching server.
//!
//! Connects as a student or a driver, prints pushed ride events and sends
//! line commands (`request`, `accept`, `complete`, ...) typed at the prompt.
//! Reconnects on disconnection (max 5 attempts with 5 second interval).
//! A participant that is already connected elsewhere is rejected by the server.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin rickshaw-client -- --participant-id stu-1 --role student --name Nadia
//! cargo run --bin rickshaw-client -- -i drv-1 -r driver -n Karim
//! ```

use clap::Parser;

use rickshaw_client::{ConnectOptions, run_client};
use rickshaw_server::domain::Role;
use rickshaw_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "rickshaw-client")]
#[command(about = "Terminal client for the campus rickshaw ride matching server", long_about = None)]
struct Args {
    /// Participant ID (must not be connected elsewhere)
    #[arg(short = 'i', long)]
    participant_id: String,

    /// Role to connect as: student or driver
    #[arg(short = 'r', long)]
    role: Role,

    /// Display name shown to the other side
    #[arg(short = 'n', long)]
    name: Option<String>,

    /// WebSocket server URL
    #[arg(short = 'u', long, default_value = "ws://127.0.0.1:8080/ws")]
    url: String,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();

    let options = ConnectOptions {
        url: args.url,
        participant_id: args.participant_id,
        role: args.role.as_str().to_string(),
        name: args.name,
    };

    // Run the client
    if let Err(e) = run_client(options).await {
        tracing::error!("Client error: {}", e);
        std::process::exit(1);
    }
}
