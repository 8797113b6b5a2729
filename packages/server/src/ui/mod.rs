//! WebSocket / HTTP front end of the ride matching coordinator.

mod handler;
mod server;
mod signal;
pub mod state;
pub mod supervisor;

pub use server::Server;
pub use state::AppState;
pub use supervisor::TimeoutSupervisor;
