//! Helpers shared by the integration tests.
//!
//! Each test starts its own server on an ephemeral port inside the test
//! runtime and talks to it through real WebSocket and HTTP connections.

#![allow(dead_code)]

use std::{net::SocketAddr, sync::Arc, time::Duration};

use futures_util::{SinkExt, StreamExt};
use rickshaw_server::{bootstrap::build_server, usecase::MatchingConfig};
use rickshaw_shared::time::SystemClock;
use serde_json::Value;
use tokio::{net::TcpListener, net::TcpStream, task::JoinHandle, time::timeout};
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async, tungstenite, tungstenite::protocol::Message,
};

const RECV_TIMEOUT: Duration = Duration::from_secs(5);

/// Helper struct to manage the server task lifecycle
pub struct TestServer {
    addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl TestServer {
    /// Start a server with the default timeouts
    pub async fn start() -> Self {
        Self::start_with(MatchingConfig::default()).await
    }

    pub async fn start_with(config: MatchingConfig) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = build_server(config, Arc::new(SystemClock));
        let handle = tokio::spawn(async move {
            server.serve(listener).await.ok();
        });
        Self { addr, handle }
    }

    pub fn ws_url(&self, participant_id: &str, role: &str) -> String {
        format!(
            "ws://{}/ws?participant_id={}&role={}",
            self.addr, participant_id, role
        )
    }

    pub fn http_url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub async fn get_json(&self, path: &str) -> (u16, Value) {
        let response = reqwest::get(self.http_url(path)).await.unwrap();
        let status = response.status().as_u16();
        let body = response.json::<Value>().await.unwrap_or(Value::Null);
        (status, body)
    }

    /// Wait until the server reports the given number of connected participants
    pub async fn wait_for_connected(&self, expected: u64) {
        for _ in 0..100 {
            let (_, health) = self.get_json("/api/health").await;
            if health["connected_participants"].as_u64() == Some(expected) {
                return;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        panic!("server never reported {expected} connected participants");
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Helper struct for a participant's WebSocket connection
pub struct TestClient {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl TestClient {
    /// Connect and consume the registration events
    pub async fn connect(server: &TestServer, participant_id: &str, role: &str) -> Self {
        let mut client = Self::try_connect(server, participant_id, role)
            .await
            .unwrap();
        client.recv_until("registration_success").await;
        client.recv_until("notifications_sync").await;
        client
    }

    pub async fn try_connect(
        server: &TestServer,
        participant_id: &str,
        role: &str,
    ) -> Result<Self, tungstenite::Error> {
        let (stream, _) = connect_async(server.ws_url(participant_id, role)).await?;
        Ok(Self { stream })
    }

    pub async fn send(&mut self, message: Value) {
        self.stream
            .send(Message::Text(message.to_string().into()))
            .await
            .unwrap();
    }

    /// Next JSON event, or None when nothing arrives in time
    pub async fn next_event(&mut self, wait: Duration) -> Option<Value> {
        loop {
            match timeout(wait, self.stream.next()).await {
                Ok(Some(Ok(Message::Text(text)))) => {
                    return serde_json::from_str(&text).ok();
                }
                Ok(Some(Ok(_))) => continue,
                _ => return None,
            }
        }
    }

    /// Skip events until one of the given types arrives
    pub async fn recv_any(&mut self, kinds: &[&str]) -> Value {
        loop {
            let event = self
                .next_event(RECV_TIMEOUT)
                .await
                .unwrap_or_else(|| panic!("timed out waiting for {kinds:?}"));
            if kinds.iter().any(|kind| event["type"] == *kind) {
                return event;
            }
        }
    }

    pub async fn recv_until(&mut self, kind: &str) -> Value {
        self.recv_any(&[kind]).await
    }

    /// Collect everything that arrives within the window
    pub async fn drain(&mut self, window: Duration) -> Vec<Value> {
        let mut events = Vec::new();
        while let Some(event) = self.next_event(window).await {
            events.push(event);
        }
        events
    }

    pub async fn close(mut self) {
        self.stream.close(None).await.ok();
    }
}

pub async fn request_ride(student: &mut TestClient, pickup: &str, destination: &str) -> String {
    student
        .send(serde_json::json!({
            "type": "ride_request",
            "pickup": pickup,
            "destination": destination,
        }))
        .await;
    let created = student.recv_until("ride_request_created").await;
    created["request_id"].as_str().unwrap().to_string()
}
