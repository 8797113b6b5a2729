//! UseCase: 参加者接続処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - ConnectParticipantUseCase::execute() メソッド
//! - 参加者の接続処理（重複チェック、表示名の決定、登録完了の通知と通知ログの同期）
//!
//! ### なぜこのテストが必要か
//! - 同じ identity の二重接続を拒否する（後勝ちにしない）ことを保証
//! - 接続時に未読の通知が届くこと（オフライン中の通知の受け取り）を確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：学生・ドライバーの接続
//! - 異常系：既に接続中の identity での接続試行
//! - エッジケース：オフライン中に届いた通知がある状態での接続

use std::sync::Arc;

use rickshaw_shared::time::Clock;

use crate::domain::{
    MessagePusher, Participant, ParticipantEvent, ParticipantId, ParticipantRepository,
    PusherChannel, Role, Timestamp, UserDirectory,
};

use super::{dispatcher::NotificationDispatcher, error::CoordinatorError};

/// 参加者接続のユースケース
pub struct ConnectParticipantUseCase {
    /// 接続中の参加者の Repository
    participants: Arc<dyn ParticipantRepository>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
    dispatcher: Arc<NotificationDispatcher>,
    /// 表示名の解決とドライバーのオンライン状態の反映に使う
    directory: Arc<dyn UserDirectory>,
    clock: Arc<dyn Clock>,
}

impl ConnectParticipantUseCase {
    pub fn new(
        participants: Arc<dyn ParticipantRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        dispatcher: Arc<NotificationDispatcher>,
        directory: Arc<dyn UserDirectory>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            participants,
            message_pusher,
            dispatcher,
            directory,
            clock,
        }
    }

    /// 参加者接続を実行
    ///
    /// # Arguments
    ///
    /// * `participant_id` - ハンドシェイクで名乗った identity
    /// * `role` - ハンドシェイクで名乗ったロール
    /// * `name` - 表示名（省略時はプロフィール、なければ identity）
    /// * `sender` - 参加者へのメッセージ送信用チャンネル
    ///
    /// # Returns
    ///
    /// * `Ok(Participant)` - 接続成功
    /// * `Err(CoordinatorError::DuplicateConnection)` - 既に接続中
    pub async fn execute(
        &self,
        participant_id: ParticipantId,
        role: Role,
        name: Option<String>,
        sender: PusherChannel,
    ) -> Result<Participant, CoordinatorError> {
        let display_name = self.resolve_display_name(&participant_id, role, name).await;
        let connected_at = Timestamp::new(self.clock.now_jst_millis());
        let participant = Participant::new(participant_id.clone(), role, display_name, connected_at);

        // 1. Repository に参加者を追加（重複はここでアトミックに拒否される）
        self.participants.add_participant(participant.clone()).await?;

        // 2. MessagePusher にチャンネルを登録
        if let Err(e) = self
            .message_pusher
            .register_client(participant_id.clone(), sender)
            .await
        {
            self.participants.remove_participant(&participant_id).await;
            return Err(CoordinatorError::DuplicateConnection(e.to_string()));
        }

        // 3. ドライバーのオンライン状態をプロフィールに反映
        if role == Role::Driver
            && let Err(e) = self
                .directory
                .update_driver_availability(participant_id.as_str(), true)
                .await
        {
            tracing::debug!("No driver profile for '{}': {}", participant_id, e);
        }

        tracing::info!(
            "Participant '{}' connected as {} ({})",
            participant_id,
            role,
            participant.display_name
        );

        // 4. 登録完了と通知ログを送る
        let unread_count = self.dispatcher.unread_count(&participant_id).await;
        self.dispatcher
            .reply(
                &participant_id,
                &ParticipantEvent::Registered {
                    participant_id: participant_id.clone(),
                    role,
                    display_name: participant.display_name.clone(),
                    unread_count,
                },
            )
            .await;
        self.dispatcher.sync(&participant_id).await;

        Ok(participant)
    }

    async fn resolve_display_name(
        &self,
        participant_id: &ParticipantId,
        role: Role,
        name: Option<String>,
    ) -> String {
        if let Some(name) = name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()) {
            return name;
        }
        let profile_name = match role {
            Role::Student => self
                .directory
                .get_student(participant_id.as_str())
                .await
                .map(|s| s.name),
            Role::Driver => self
                .directory
                .get_driver(participant_id.as_str())
                .await
                .map(|d| d.name),
        };
        profile_name.unwrap_or_else(|| participant_id.to_string())
    }
}
