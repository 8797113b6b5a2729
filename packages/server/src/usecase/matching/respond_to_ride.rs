//! ドライバーの応答（受諾・辞退）

use crate::domain::{
    Caller, NotificationKind, ParticipantEvent, ParticipantId, RepositoryError, RideRequest,
    RideRequestId, RideStatus, Transition, WithdrawReason, policy,
};

use super::{CoordinatorError, MatchingCoordinator};

impl MatchingCoordinator {
    /// 配車リクエストを受諾する（`pending` → `accepted`）
    ///
    /// 同時に複数のドライバーが受諾した場合、成功するのは 1 人だけで、
    /// 他のドライバーは `StaleState` を受け取る。
    pub async fn accept_ride(
        &self,
        caller: &Caller,
        request_id: &RideRequestId,
    ) -> Result<RideRequest, CoordinatorError> {
        let ride = self.rides.get(request_id).await?;
        policy::can_accept(&ride, caller)?;

        // 1. ドライバーを受付不可にする（他のリクエストとの二重受諾を防ぐ）
        if !self.participants.claim_driver(&caller.id).await? {
            return Err(CoordinatorError::Forbidden(
                "you are not available to accept rides".to_string(),
            ));
        }

        // 2. ステータスを compare-and-swap で遷移
        let transition = Transition::new(RideStatus::Pending, RideStatus::Accepted, self.now())
            .with_driver(caller.id.clone());
        let ride = match self.rides.transition(request_id, transition).await {
            Ok(ride) => ride,
            Err(e) => {
                self.participants.release_driver(&caller.id).await;
                tracing::debug!(
                    "Driver '{}' lost the race for ride request '{}': {}",
                    caller.id,
                    request_id,
                    e
                );
                return Err(e.into());
            }
        };

        tracing::info!("Ride request '{}' accepted by '{}'", ride.id, caller.id);

        // 3. 学生に通知し、他の候補からオファーを取り下げる
        let driver_name = self.display_name_of(&caller.id).await;
        self.dispatcher
            .notify(
                &ride.requester,
                NotificationKind::RideResponse,
                &ParticipantEvent::RideAccepted {
                    request_id: ride.id,
                    driver_id: caller.id.clone(),
                    driver_name,
                },
            )
            .await;
        self.withdraw_offers(&ride, Some(&caller.id), WithdrawReason::AcceptedByAnotherDriver)
            .await;

        self.dispatcher
            .reply(
                &caller.id,
                &ParticipantEvent::AcceptanceConfirmed {
                    request_id: ride.id,
                    student_name: ride.requester_name.clone(),
                    pickup: ride.pickup.clone(),
                    destination: ride.destination.clone(),
                },
            )
            .await;

        Ok(ride)
    }

    /// 配車リクエストを辞退する
    ///
    /// 辞退はそのドライバーへのオファーを取り下げるだけで、
    /// 全ての候補が辞退した時点でリクエストは `declined` になる。
    pub async fn decline_ride(
        &self,
        caller: &Caller,
        request_id: &RideRequestId,
    ) -> Result<RideRequest, CoordinatorError> {
        let ride = self.rides.get(request_id).await?;
        policy::can_decline(&ride, caller)?;

        let ride = self.apply_decline(request_id, &caller.id).await?;
        tracing::info!("Ride request '{}' declined by '{}'", ride.id, caller.id);

        self.dispatcher
            .reply(
                &caller.id,
                &ParticipantEvent::DeclineConfirmed {
                    request_id: ride.id,
                },
            )
            .await;

        Ok(ride)
    }

    /// 辞退を記録し、全候補が辞退していれば `declined` に遷移させる
    pub(super) async fn apply_decline(
        &self,
        request_id: &RideRequestId,
        driver: &ParticipantId,
    ) -> Result<RideRequest, CoordinatorError> {
        let ride = self.rides.record_decline(request_id, driver, self.now()).await?;
        if !ride.all_candidates_declined() {
            return Ok(ride);
        }

        let transition = Transition::new(RideStatus::Pending, RideStatus::Declined, self.now());
        match self.rides.transition(request_id, transition).await {
            Ok(declined) => {
                tracing::info!("Ride request '{}' declined by every candidate", declined.id);
                self.dispatcher
                    .notify(
                        &declined.requester,
                        NotificationKind::RideResponse,
                        &ParticipantEvent::RideDeclined {
                            request_id: declined.id,
                        },
                    )
                    .await;
                Ok(declined)
            }
            // 期限切れ・キャンセルと競合した場合はそちらの結果を優先する
            Err(RepositoryError::StaleState { .. }) => Ok(self.rides.get(request_id).await?),
            Err(e) => Err(e.into()),
        }
    }
}
