//! Server state shared by all handlers.

use std::sync::Arc;

use crate::{
    domain::ParticipantRepository,
    usecase::{
        ConnectParticipantUseCase, DisconnectParticipantUseCase, DriverAvailabilityUseCase,
        MatchingCoordinator, NotificationDispatcher, ProfileUseCase,
    },
};

/// Shared application state
pub struct AppState {
    /// ConnectParticipantUseCase（参加者接続のユースケース）
    pub connect_participant_usecase: Arc<ConnectParticipantUseCase>,
    /// DisconnectParticipantUseCase（参加者切断のユースケース）
    pub disconnect_participant_usecase: Arc<DisconnectParticipantUseCase>,
    /// 配車リクエストのライフサイクル
    pub coordinator: Arc<MatchingCoordinator>,
    pub availability_usecase: Arc<DriverAvailabilityUseCase>,
    pub profile_usecase: Arc<ProfileUseCase>,
    /// 通知ログの参照・既読化
    pub dispatcher: Arc<NotificationDispatcher>,
    /// 接続数の参照（ヘルスチェック）
    pub participants: Arc<dyn ParticipantRepository>,
}
