//! InMemory Notification Repository 実装
//!
//! 受信者ごとの通知ログ。オフラインの参加者宛ての通知もここに残り、
//! 再接続時の同期や HTTP のポーリングで取り出されます。

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{
    Notification, NotificationId, NotificationRepository, ParticipantId, RepositoryError,
    Timestamp,
};

/// インメモリ Notification Repository 実装
pub struct InMemoryNotificationRepository {
    /// Key: 受信者、Value: 追加順の通知
    logs: Arc<Mutex<HashMap<ParticipantId, Vec<Notification>>>>,
}

impl InMemoryNotificationRepository {
    pub fn new() -> Self {
        Self {
            logs: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl Default for InMemoryNotificationRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NotificationRepository for InMemoryNotificationRepository {
    async fn append(&self, notification: Notification) {
        let mut logs = self.logs.lock().await;
        logs.entry(notification.recipient.clone())
            .or_default()
            .push(notification);
    }

    async fn list_for(&self, recipient: &ParticipantId) -> Vec<Notification> {
        let logs = self.logs.lock().await;
        logs.get(recipient)
            .map(|log| log.iter().rev().cloned().collect())
            .unwrap_or_default()
    }

    async fn mark_read(
        &self,
        recipient: &ParticipantId,
        id: &NotificationId,
    ) -> Result<Notification, RepositoryError> {
        let mut logs = self.logs.lock().await;
        let notification = logs
            .get_mut(recipient)
            .and_then(|log| log.iter_mut().find(|n| &n.id == id))
            .ok_or_else(|| RepositoryError::NotFound {
                entity: "notification",
                id: id.to_string(),
            })?;
        notification.read = true;
        Ok(notification.clone())
    }

    async fn unread_count(&self, recipient: &ParticipantId) -> usize {
        let logs = self.logs.lock().await;
        logs.get(recipient)
            .map(|log| log.iter().filter(|n| !n.read).count())
            .unwrap_or(0)
    }

    async fn purge_older_than(&self, cutoff: Timestamp) -> usize {
        let mut logs = self.logs.lock().await;
        let mut purged = 0;
        for log in logs.values_mut() {
            let before = log.len();
            log.retain(|n| n.created_at >= cutoff);
            purged += before - log.len();
        }
        logs.retain(|_, log| !log.is_empty());
        purged
    }
}
