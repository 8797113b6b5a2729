//! UseCase: 通知の配信
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - NotificationDispatcher の push と通知ログへの追記
//! - オフラインの受信者への配信（Deferred）と、ログからの取得・既読化
//!
//! ### なぜこのテストが必要か
//! - 接続中かどうかに関わらず、通知が必ずログに残ることを保証する
//! - 既読化は受信者本人の通知に対してのみ行えることを確認する
//!
//! ### どのような状況を想定しているか
//! - 正常系：接続中の受信者への配信
//! - 異常系：未接続の受信者（push 失敗）
//! - エッジケース：他人の通知の既読化、保持期間を過ぎた通知の削除

use std::{sync::Arc, time::Duration};

use rickshaw_shared::time::Clock;

use crate::domain::{
    MessagePusher, Notification, NotificationId, NotificationIdFactory, NotificationKind,
    NotificationRepository, ParticipantEvent, ParticipantId, Timestamp,
};

use super::error::CoordinatorError;

/// 1 件の配信結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryResult {
    /// チャンネルに送信した
    Delivered,
    /// 未接続のためログにのみ残した
    Deferred,
}

/// 通知の配信（Notification Dispatcher）
///
/// 接続中の受信者には push し、接続の有無に関わらず受信者の通知ログに追記する。
/// push はログへの追記より先に行う。
pub struct NotificationDispatcher {
    message_pusher: Arc<dyn MessagePusher>,
    notifications: Arc<dyn NotificationRepository>,
    clock: Arc<dyn Clock>,
}

impl NotificationDispatcher {
    pub fn new(
        message_pusher: Arc<dyn MessagePusher>,
        notifications: Arc<dyn NotificationRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            message_pusher,
            notifications,
            clock,
        }
    }

    /// 1 人の受信者に通知する
    pub async fn notify(
        &self,
        recipient: &ParticipantId,
        kind: NotificationKind,
        event: &ParticipantEvent,
    ) -> DeliveryResult {
        let result = match self.message_pusher.push_to(recipient, event).await {
            Ok(()) => DeliveryResult::Delivered,
            Err(e) => {
                tracing::debug!("Deferred '{}' for '{}': {}", event.name(), recipient, e);
                DeliveryResult::Deferred
            }
        };

        self.notifications
            .append(self.build_notification(recipient, kind, event))
            .await;

        result
    }

    /// 複数の受信者に通知する（一部がオフラインでもエラーにしない）
    pub async fn notify_broadcast(
        &self,
        recipients: Vec<ParticipantId>,
        kind: NotificationKind,
        event: &ParticipantEvent,
    ) -> Vec<(ParticipantId, DeliveryResult)> {
        if recipients.is_empty() {
            return Vec::new();
        }

        let delivered = self
            .message_pusher
            .broadcast(recipients.clone(), event)
            .await;

        let mut results = Vec::with_capacity(recipients.len());
        for recipient in recipients {
            self.notifications
                .append(self.build_notification(&recipient, kind, event))
                .await;
            let result = if delivered.contains(&recipient) {
                DeliveryResult::Delivered
            } else {
                DeliveryResult::Deferred
            };
            results.push((recipient, result));
        }

        results
    }

    /// 操作した参加者への直接の応答（確認・エラー）
    ///
    /// ログには残さない
    pub async fn reply(&self, recipient: &ParticipantId, event: &ParticipantEvent) {
        if let Err(e) = self.message_pusher.push_to(recipient, event).await {
            tracing::debug!("Dropped reply '{}' for '{}': {}", event.name(), recipient, e);
        }
    }

    /// エラーを操作した参加者に返す
    pub async fn reply_error(&self, recipient: &ParticipantId, error: &CoordinatorError) {
        let event = ParticipantEvent::Error {
            code: error.code(),
            message: error.to_string(),
        };
        self.reply(recipient, &event).await;
    }

    /// 受信者の通知一覧（新しい順）
    pub async fn list(&self, recipient: &ParticipantId) -> Vec<Notification> {
        self.notifications.list_for(recipient).await
    }

    pub async fn unread_count(&self, recipient: &ParticipantId) -> usize {
        self.notifications.unread_count(recipient).await
    }

    /// 通知ログ全体を受信者に送る（接続時と `sync_notifications`）
    pub async fn sync(&self, recipient: &ParticipantId) -> usize {
        let notifications = self.notifications.list_for(recipient).await;
        let unread_count = notifications.iter().filter(|n| !n.read).count();
        let event = ParticipantEvent::NotificationsSynced {
            unread_count,
            notifications,
        };
        self.reply(recipient, &event).await;
        unread_count
    }

    /// 受信者本人の通知を既読にする
    pub async fn mark_read(
        &self,
        recipient: &ParticipantId,
        id: &NotificationId,
    ) -> Result<Notification, CoordinatorError> {
        let notification = self.notifications.mark_read(recipient, id).await?;
        let unread_count = self.notifications.unread_count(recipient).await;
        self.reply(
            recipient,
            &ParticipantEvent::NotificationRead {
                notification_id: notification.id,
                unread_count,
            },
        )
        .await;
        Ok(notification)
    }

    /// 保持期間を過ぎた通知を削除
    pub async fn purge_older_than(&self, retention: Duration) -> usize {
        let retention_millis = i64::try_from(retention.as_millis()).unwrap_or(i64::MAX);
        let cutoff = Timestamp::new(self.clock.now_jst_millis()).minus_millis(retention_millis);
        let purged = self.notifications.purge_older_than(cutoff).await;
        if purged > 0 {
            tracing::info!("Purged {} notifications older than {:?}", purged, retention);
        }
        purged
    }

    fn build_notification(
        &self,
        recipient: &ParticipantId,
        kind: NotificationKind,
        event: &ParticipantEvent,
    ) -> Notification {
        let (title, message) = event.summary();
        Notification {
            id: NotificationIdFactory::generate(),
            recipient: recipient.clone(),
            kind,
            ride_request_id: event.ride_request_id(),
            title,
            message,
            read: false,
            created_at: Timestamp::new(self.clock.now_jst_millis()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{MessagePushError, RideRequestIdFactory, message_pusher::MockMessagePusher},
        infrastructure::{
            message_pusher::WebSocketMessagePusher, repository::InMemoryNotificationRepository,
        },
    };
    use rickshaw_shared::time::{FixedClock, ManualClock};
    use std::collections::HashMap;
    use tokio::sync::{Mutex, mpsc};

    fn pid(value: &str) -> ParticipantId {
        ParticipantId::new(value.to_string()).unwrap()
    }

    fn expired_event() -> ParticipantEvent {
        ParticipantEvent::RideExpired {
            request_id: RideRequestIdFactory::generate(),
        }
    }

    fn create_test_dispatcher(
        clock: Arc<dyn Clock>,
    ) -> (
        NotificationDispatcher,
        Arc<WebSocketMessagePusher>,
        Arc<InMemoryNotificationRepository>,
    ) {
        let pusher = Arc::new(WebSocketMessagePusher::new(Arc::new(Mutex::new(
            HashMap::new(),
        ))));
        let notifications = Arc::new(InMemoryNotificationRepository::new());
        let dispatcher = NotificationDispatcher::new(pusher.clone(), notifications.clone(), clock);
        (dispatcher, pusher, notifications)
    }

    #[tokio::test]
    async fn test_notify_connected_recipient_is_delivered_and_logged() {
        // テスト項目: 接続中の受信者には push され、通知ログにも残る
        // given (前提条件):
        let (dispatcher, pusher, notifications) =
            create_test_dispatcher(Arc::new(FixedClock::new(1_000)));
        let (tx, mut rx) = mpsc::unbounded_channel();
        pusher.register_client(pid("stu-1"), tx).await.unwrap();

        // when (操作):
        let result = dispatcher
            .notify(&pid("stu-1"), NotificationKind::RideResponse, &expired_event())
            .await;

        // then (期待する結果):
        assert_eq!(result, DeliveryResult::Delivered);
        let pushed = rx.recv().await.unwrap();
        assert!(pushed.contains("\"type\":\"ride_expired\""));
        let log = notifications.list_for(&pid("stu-1")).await;
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].title, "Ride Request Expired");
        assert_eq!(log[0].created_at, Timestamp::new(1_000));
    }

    #[tokio::test]
    async fn test_notify_offline_recipient_is_deferred_but_logged() {
        // テスト項目: 未接続の受信者への通知は Deferred になり、ログと未読数に反映される
        // given (前提条件):
        let mut pusher = MockMessagePusher::new();
        pusher
            .expect_push_to()
            .times(1)
            .returning(|id, _| Err(MessagePushError::ClientNotFound(id.to_string())));
        let notifications = Arc::new(InMemoryNotificationRepository::new());
        let dispatcher = NotificationDispatcher::new(
            Arc::new(pusher),
            notifications.clone(),
            Arc::new(FixedClock::new(1_000)),
        );

        // when (操作):
        let result = dispatcher
            .notify(&pid("stu-1"), NotificationKind::RideResponse, &expired_event())
            .await;

        // then (期待する結果):
        assert_eq!(result, DeliveryResult::Deferred);
        assert_eq!(dispatcher.unread_count(&pid("stu-1")).await, 1);
        assert_eq!(dispatcher.list(&pid("stu-1")).await.len(), 1);
    }

    #[tokio::test]
    async fn test_notify_broadcast_reports_per_recipient_results() {
        // テスト項目: 一部の受信者がオフラインでも、受信者ごとの結果が返り全員のログに残る
        // given (前提条件):
        let mut pusher = MockMessagePusher::new();
        pusher
            .expect_broadcast()
            .times(1)
            .returning(|_, _| vec![ParticipantId::new("drv-1".to_string()).unwrap()]);
        let notifications = Arc::new(InMemoryNotificationRepository::new());
        let dispatcher = NotificationDispatcher::new(
            Arc::new(pusher),
            notifications.clone(),
            Arc::new(FixedClock::new(1_000)),
        );

        // when (操作):
        let results = dispatcher
            .notify_broadcast(
                vec![pid("drv-1"), pid("drv-2")],
                NotificationKind::System,
                &expired_event(),
            )
            .await;

        // then (期待する結果):
        assert_eq!(
            results,
            vec![
                (pid("drv-1"), DeliveryResult::Delivered),
                (pid("drv-2"), DeliveryResult::Deferred),
            ]
        );
        assert_eq!(notifications.unread_count(&pid("drv-2")).await, 1);
    }

    #[tokio::test]
    async fn test_reply_is_not_logged() {
        // テスト項目: 直接の応答はログに残らない
        // given (前提条件):
        let (dispatcher, pusher, notifications) =
            create_test_dispatcher(Arc::new(FixedClock::new(1_000)));
        let (tx, mut rx) = mpsc::unbounded_channel();
        pusher.register_client(pid("drv-1"), tx).await.unwrap();

        // when (操作):
        dispatcher
            .reply_error(
                &pid("drv-1"),
                &CoordinatorError::StaleState("lost".to_string()),
            )
            .await;

        // then (期待する結果):
        let pushed = rx.recv().await.unwrap();
        assert!(pushed.contains("STALE_STATE"));
        assert!(notifications.list_for(&pid("drv-1")).await.is_empty());
    }

    #[tokio::test]
    async fn test_mark_read_only_for_owner() {
        // テスト項目: 自分の通知は既読にでき、他人の通知は NotFound になる
        // given (前提条件):
        let (dispatcher, _pusher, _notifications) =
            create_test_dispatcher(Arc::new(FixedClock::new(1_000)));
        dispatcher
            .notify(&pid("stu-1"), NotificationKind::RideResponse, &expired_event())
            .await;
        let id = dispatcher.list(&pid("stu-1")).await[0].id;

        // when (操作):
        let by_other = dispatcher.mark_read(&pid("stu-2"), &id).await;
        let by_owner = dispatcher.mark_read(&pid("stu-1"), &id).await;

        // then (期待する結果):
        assert!(matches!(by_other, Err(CoordinatorError::NotFound(_))));
        assert!(by_owner.unwrap().read);
        assert_eq!(dispatcher.unread_count(&pid("stu-1")).await, 0);
    }

    #[tokio::test]
    async fn test_purge_removes_only_old_notifications() {
        // テスト項目: 保持期間を過ぎた通知だけが削除される
        // given (前提条件):
        let clock = Arc::new(ManualClock::new(0));
        let (dispatcher, _pusher, _notifications) = create_test_dispatcher(clock.clone());
        dispatcher
            .notify(&pid("stu-1"), NotificationKind::System, &expired_event())
            .await;
        clock.advance(10_000);
        dispatcher
            .notify(&pid("stu-1"), NotificationKind::System, &expired_event())
            .await;

        // when (操作):
        let purged = dispatcher.purge_older_than(Duration::from_secs(5)).await;

        // then (期待する結果):
        assert_eq!(purged, 1);
        let remaining = dispatcher.list(&pid("stu-1")).await;
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].created_at, Timestamp::new(10_000));
    }
}
