//! WebSocket を使った MessagePusher 実装
//!
//! ## 責務
//!
//! - 参加者ごとの WebSocket `UnboundedSender` を管理
//! - ドメインイベントを `ServerMessage` の JSON に変換して送信（push_to, broadcast）
//!
//! ## 設計ノート
//!
//! WebSocket の生成は UI 層（`src/ui/handler/websocket.rs`）で行われます。
//! この実装は生成された `UnboundedSender` を受け取り、メッセージ送信に使用します。
//! チャンネルはこの構造体の中だけに存在し、他のコンポーネントは参加者 ID だけを扱います。

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::{
    domain::{MessagePushError, MessagePusher, ParticipantEvent, ParticipantId, PusherChannel},
    infrastructure::dto::websocket::ServerMessage,
};

/// WebSocket を使った MessagePusher 実装
///
/// ## 使用例
///
/// ```ignore
/// let clients = Arc::new(Mutex::new(HashMap::new()));
/// let pusher = WebSocketMessagePusher::new(clients);
///
/// pusher.register_client(participant_id.clone(), sender).await?;
/// pusher.push_to(&participant_id, &event).await?;
/// ```
pub struct WebSocketMessagePusher {
    /// 接続中の参加者の WebSocket sender
    clients: Arc<Mutex<HashMap<ParticipantId, PusherChannel>>>,
}

impl WebSocketMessagePusher {
    pub fn new(clients: Arc<Mutex<HashMap<ParticipantId, PusherChannel>>>) -> Self {
        Self { clients }
    }

    fn encode(event: &ParticipantEvent) -> Result<String, MessagePushError> {
        serde_json::to_string(&ServerMessage::from(event.clone()))
            .map_err(|e| MessagePushError::PushFailed(e.to_string()))
    }
}

#[async_trait]
impl MessagePusher for WebSocketMessagePusher {
    async fn register_client(
        &self,
        participant_id: ParticipantId,
        sender: PusherChannel,
    ) -> Result<(), MessagePushError> {
        let mut clients = self.clients.lock().await;
        if clients.contains_key(&participant_id) {
            return Err(MessagePushError::AlreadyRegistered(
                participant_id.into_string(),
            ));
        }
        tracing::debug!("Participant '{}' registered to MessagePusher", participant_id);
        clients.insert(participant_id, sender);
        Ok(())
    }

    async fn unregister_client(&self, participant_id: &ParticipantId) {
        let mut clients = self.clients.lock().await;
        if clients.remove(participant_id).is_some() {
            tracing::debug!(
                "Participant '{}' unregistered from MessagePusher",
                participant_id
            );
        }
    }

    async fn is_connected(&self, participant_id: &ParticipantId) -> bool {
        self.clients.lock().await.contains_key(participant_id)
    }

    async fn push_to(
        &self,
        participant_id: &ParticipantId,
        event: &ParticipantEvent,
    ) -> Result<(), MessagePushError> {
        let content = Self::encode(event)?;
        let clients = self.clients.lock().await;

        if let Some(sender) = clients.get(participant_id) {
            sender
                .send(content)
                .map_err(|e| MessagePushError::PushFailed(e.to_string()))?;
            tracing::debug!("Pushed '{}' to participant '{}'", event.name(), participant_id);
            Ok(())
        } else {
            Err(MessagePushError::ClientNotFound(
                participant_id.as_str().to_string(),
            ))
        }
    }

    async fn broadcast(
        &self,
        targets: Vec<ParticipantId>,
        event: &ParticipantEvent,
    ) -> Vec<ParticipantId> {
        let content = match Self::encode(event) {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!("Failed to encode '{}': {}", event.name(), e);
                return Vec::new();
            }
        };
        let clients = self.clients.lock().await;

        let mut delivered = Vec::with_capacity(targets.len());
        for target in targets {
            match clients.get(&target) {
                Some(sender) => {
                    // ブロードキャストでは一部の送信失敗を許容
                    if let Err(e) = sender.send(content.clone()) {
                        tracing::warn!("Failed to push message to participant '{}': {}", target, e);
                    } else {
                        tracing::debug!("Broadcasted '{}' to participant '{}'", event.name(), target);
                        delivered.push(target);
                    }
                }
                None => {
                    tracing::debug!("Participant '{}' not connected during broadcast, skipping", target);
                }
            }
        }
        delivered
    }
}
