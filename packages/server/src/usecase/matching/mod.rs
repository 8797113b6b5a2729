//! UseCase: 配車マッチング（Matching Coordinator）
//!
//! 配車リクエストのライフサイクルを管理します。
//!
//! ```text
//! pending ──accept──▶ accepted ──complete──▶ completed
//!    │                   │
//!    ├──decline (全候補)──▶ declined
//!    ├──timeout──────────▶ expired
//!    └──cancel───────────▶ cancelled ◀──cancel (走行開始前) / driver disconnect
//! ```
//!
//! 操作ごとに 1 ファイルを割り当て、`MatchingCoordinator` の impl ブロックを分割しています。
//! ステータスの変更は全て `RideRequestRepository::transition` の compare-and-swap を通り、
//! タイムアウトや切断による遷移もユーザー操作と同じ経路で行われます。

mod cancel_ride;
mod disconnect;
mod expire_ride;
mod request_ride;
mod respond_to_ride;
mod trip;

pub use request_ride::RideRequestCommand;

use std::sync::Arc;

use rickshaw_shared::time::Clock;

use crate::domain::{
    FareEstimator, FareQuote, NotificationKind, ParticipantEvent, ParticipantId,
    ParticipantRepository, Place, RideRequest, RideRequestId, RideRequestRepository, Timestamp,
    WithdrawReason,
};

use super::{config::MatchingConfig, dispatcher::NotificationDispatcher, error::CoordinatorError};

/// 配車マッチングのユースケース
pub struct MatchingCoordinator {
    /// 配車リクエストの Repository
    rides: Arc<dyn RideRequestRepository>,
    /// 接続中の参加者の Repository
    participants: Arc<dyn ParticipantRepository>,
    dispatcher: Arc<NotificationDispatcher>,
    fares: Arc<dyn FareEstimator>,
    clock: Arc<dyn Clock>,
    config: MatchingConfig,
}

impl MatchingCoordinator {
    pub fn new(
        rides: Arc<dyn RideRequestRepository>,
        participants: Arc<dyn ParticipantRepository>,
        dispatcher: Arc<NotificationDispatcher>,
        fares: Arc<dyn FareEstimator>,
        clock: Arc<dyn Clock>,
        config: MatchingConfig,
    ) -> Self {
        Self {
            rides,
            participants,
            dispatcher,
            fares,
            clock,
            config,
        }
    }

    pub fn config(&self) -> &MatchingConfig {
        &self.config
    }

    /// 配車リクエストの現在の状態
    pub async fn get_ride(&self, id: &RideRequestId) -> Result<RideRequest, CoordinatorError> {
        Ok(self.rides.get(id).await?)
    }

    /// 運賃の見積もり
    pub async fn estimate_fare(&self, pickup: &Place, destination: &Place) -> FareQuote {
        self.fares.estimate_fare(pickup, destination).await
    }

    fn now(&self) -> Timestamp {
        Timestamp::new(self.clock.now_jst_millis())
    }

    /// 表示名（接続中でなければ ID）
    async fn display_name_of(&self, id: &ParticipantId) -> String {
        self.participants
            .get_participant(id)
            .await
            .map(|p| p.display_name)
            .unwrap_or_else(|| id.to_string())
    }

    /// まだオファーが有効な候補からオファーを取り下げる
    async fn withdraw_offers(
        &self,
        ride: &RideRequest,
        except: Option<&ParticipantId>,
        reason: WithdrawReason,
    ) {
        let targets: Vec<ParticipantId> = ride
            .open_candidates()
            .into_iter()
            .filter(|id| Some(id) != except)
            .collect();
        if targets.is_empty() {
            return;
        }

        tracing::debug!(
            "Withdrawing ride request '{}' from {} drivers ({})",
            ride.id,
            targets.len(),
            reason.as_str()
        );
        self.dispatcher
            .notify_broadcast(
                targets,
                NotificationKind::System,
                &ParticipantEvent::OfferWithdrawn {
                    request_id: ride.id,
                    reason,
                },
            )
            .await;
    }
}
