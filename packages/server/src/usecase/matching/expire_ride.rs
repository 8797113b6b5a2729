//! 受諾期限切れの処理

use crate::domain::{
    NotificationKind, ParticipantEvent, RideRequest, RideRequestId, RideStatus, Transition,
    WithdrawReason,
};

use super::{CoordinatorError, MatchingCoordinator};

impl MatchingCoordinator {
    /// `pending` のリクエストを期限切れにする（`pending` → `expired`）
    ///
    /// 学生への通知は遷移に成功した 1 回だけ行われる。
    pub async fn expire_ride(
        &self,
        request_id: &RideRequestId,
    ) -> Result<RideRequest, CoordinatorError> {
        let transition = Transition::new(RideStatus::Pending, RideStatus::Expired, self.now());
        let ride = self.rides.transition(request_id, transition).await?;

        tracing::info!("Ride request '{}' expired", ride.id);

        self.dispatcher
            .notify(
                &ride.requester,
                NotificationKind::RideResponse,
                &ParticipantEvent::RideExpired {
                    request_id: ride.id,
                },
            )
            .await;
        self.withdraw_offers(&ride, None, WithdrawReason::Expired)
            .await;

        Ok(ride)
    }

    /// 期限を過ぎた全ての `pending` リクエストを期限切れにする
    ///
    /// 同時に受諾・キャンセルされたリクエストはスキップする
    pub async fn expire_overdue(&self) -> Vec<RideRequestId> {
        let now = self.now();
        let overdue: Vec<RideRequestId> = self
            .rides
            .list_pending()
            .await
            .into_iter()
            .filter(|ride| ride.is_overdue(now))
            .map(|ride| ride.id)
            .collect();

        let mut expired = Vec::with_capacity(overdue.len());
        for id in overdue {
            match self.expire_ride(&id).await {
                Ok(_) => expired.push(id),
                Err(CoordinatorError::StaleState(reason)) => {
                    tracing::debug!("Skipped expiry of '{}': {}", id, reason);
                }
                Err(e) => tracing::warn!("Failed to expire ride request '{}': {}", id, e),
            }
        }
        expired
    }

    /// 終了してから保持期間を過ぎたリクエストを削除する
    pub async fn purge_finished(&self) -> usize {
        let cutoff = self
            .now()
            .minus_millis(self.config.ride_retention_millis());
        let purged = self.rides.purge_finished_before(cutoff).await;
        if purged > 0 {
            tracing::info!(
                "Purged {} finished ride requests older than {:?}",
                purged,
                self.config.ride_retention
            );
        }
        purged
    }
}
