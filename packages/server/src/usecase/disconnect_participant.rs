//! UseCase: 参加者切断処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - DisconnectParticipantUseCase::execute() メソッド
//! - 参加者の削除、チャンネルの登録解除、配車の後始末
//!
//! ### なぜこのテストが必要か
//! - 切断した参加者が関わる配車が宙に浮かないことを保証
//! - 同じ identity で再接続できることを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：参加者の切断
//! - エッジケース：同じ参加者の二重切断（冪等）

use std::sync::Arc;

use crate::domain::{
    MessagePusher, Participant, ParticipantId, ParticipantRepository, Role, UserDirectory,
};

use super::matching::MatchingCoordinator;

/// 参加者切断のユースケース
pub struct DisconnectParticipantUseCase {
    participants: Arc<dyn ParticipantRepository>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
    coordinator: Arc<MatchingCoordinator>,
    directory: Arc<dyn UserDirectory>,
}

impl DisconnectParticipantUseCase {
    pub fn new(
        participants: Arc<dyn ParticipantRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        coordinator: Arc<MatchingCoordinator>,
        directory: Arc<dyn UserDirectory>,
    ) -> Self {
        Self {
            participants,
            message_pusher,
            coordinator,
            directory,
        }
    }

    /// 参加者切断を実行
    ///
    /// # Returns
    ///
    /// * `Some(Participant)` - 切断した参加者
    /// * `None` - 既に切断済み
    pub async fn execute(&self, participant_id: &ParticipantId) -> Option<Participant> {
        // 1. チャンネルを登録解除（以後この参加者には push されない）
        self.message_pusher.unregister_client(participant_id).await;

        // 2. Repository から参加者を削除
        let participant = self.participants.remove_participant(participant_id).await?;

        // 3. 関わっている配車を整理
        self.coordinator.handle_disconnect(&participant).await;

        if participant.role == Role::Driver
            && let Err(e) = self
                .directory
                .update_driver_availability(participant_id.as_str(), false)
                .await
        {
            tracing::debug!("No driver profile for '{}': {}", participant_id, e);
        }

        tracing::info!("Participant '{}' disconnected", participant_id);
        Some(participant)
    }
}
