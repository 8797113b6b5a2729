//! Server execution logic.

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, patch},
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use super::{
    handler::{
        create_driver, create_student, get_driver, get_driver_by_phone, get_fare,
        get_notifications, get_ride, get_student, get_student_by_email, health_check,
        list_available_drivers, list_drivers, list_students, update_driver_status,
        websocket_handler,
    },
    signal::shutdown_signal,
    state::AppState,
    supervisor::TimeoutSupervisor,
};

/// Ride matching server
///
/// Serves the WebSocket endpoint and the HTTP API, and runs the timeout
/// supervisor for as long as the server is up.
///
/// # Example
///
/// ```ignore
/// let server = Server::new(app_state, supervisor);
/// server.run("127.0.0.1".to_string(), 8080).await?;
/// ```
pub struct Server {
    state: Arc<AppState>,
    supervisor: TimeoutSupervisor,
}

impl Server {
    pub fn new(state: AppState, supervisor: TimeoutSupervisor) -> Self {
        Self {
            state: Arc::new(state),
            supervisor,
        }
    }

    /// Build the router with all endpoints
    pub fn router(state: Arc<AppState>) -> Router {
        Router::new()
            // WebSocket エンドポイント
            .route("/ws", get(websocket_handler))
            // HTTP エンドポイント
            .route("/api/health", get(health_check))
            .route("/api/rides/{request_id}", get(get_ride))
            .route("/api/drivers/available", get(list_available_drivers))
            .route("/api/fare", get(get_fare))
            .route(
                "/api/participants/{participant_id}/notifications",
                get(get_notifications),
            )
            .route("/api/students", get(list_students).post(create_student))
            .route("/api/students/{student_id}", get(get_student))
            .route("/api/students/email/{email}", get(get_student_by_email))
            .route("/api/drivers", get(list_drivers).post(create_driver))
            .route("/api/drivers/{driver_id}", get(get_driver))
            .route("/api/drivers/phone/{phone}", get(get_driver_by_phone))
            .route("/api/drivers/{driver_id}/status", patch(update_driver_status))
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }

    /// Run the server
    ///
    /// # Arguments
    ///
    /// * `host` - The host address to bind to (e.g., "127.0.0.1")
    /// * `port` - The port number to bind to (e.g., 8080)
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified address or
    /// if there's an error during server execution.
    pub async fn run(self, host: String, port: u16) -> Result<(), Box<dyn std::error::Error>> {
        let bind_addr = format!("{}:{}", host, port);
        let listener = TcpListener::bind(&bind_addr).await?;

        tracing::info!("Ride matching server listening on {}", listener.local_addr()?);
        tracing::info!("Connect to: ws://{}/ws?participant_id=<id>&role=<student|driver>", bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        self.serve(listener).await?;
        Ok(())
    }

    /// Serve on an already bound listener until a shutdown signal arrives
    pub async fn serve(self, listener: TcpListener) -> std::io::Result<()> {
        let supervisor = self.supervisor.spawn();
        let app = Self::router(self.state);

        // Set up graceful shutdown signal handler
        let result = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await;

        supervisor.shutdown();
        tracing::info!("Server shutdown complete");

        result
    }
}
