//! MessagePusher trait 定義
//!
//! 参加者へのイベント送信のインターフェースです。
//! チャンネルハンドル（`PusherChannel`）は MessagePusher の実装だけが保持し、
//! 他のコンポーネントは参加者 ID でのみ送信先を指定します。

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{MessagePushError, ParticipantEvent, ParticipantId};

/// 参加者へのメッセージ送信チャンネル（シリアライズ済みの JSON テキスト）
pub type PusherChannel = mpsc::UnboundedSender<String>;

/// 参加者へのイベント送信の抽象化
///
/// ## 依存性の逆転（DIP）
///
/// UseCase 層はこの trait に依存し、WebSocket などの具体的な送信手段には依存しない。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessagePusher: Send + Sync {
    /// 参加者のチャンネルを登録
    ///
    /// 既に登録済みの場合は `AlreadyRegistered`（上書きしない）
    async fn register_client(
        &self,
        participant_id: ParticipantId,
        sender: PusherChannel,
    ) -> Result<(), MessagePushError>;

    /// 参加者のチャンネルを削除（未登録でも成功する）
    async fn unregister_client(&self, participant_id: &ParticipantId);

    /// 参加者のチャンネルが登録されているか
    async fn is_connected(&self, participant_id: &ParticipantId) -> bool;

    /// 特定の参加者にイベントを送信
    async fn push_to(
        &self,
        participant_id: &ParticipantId,
        event: &ParticipantEvent,
    ) -> Result<(), MessagePushError>;

    /// 複数の参加者にイベントを送信
    ///
    /// 一部の送信失敗は許容し、実際に送信できた参加者の ID を返す
    async fn broadcast(
        &self,
        targets: Vec<ParticipantId>,
        event: &ParticipantEvent,
    ) -> Vec<ParticipantId>;
}
