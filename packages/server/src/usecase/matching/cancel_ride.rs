//! 学生による配車のキャンセル

use crate::domain::{
    CancelReason, Caller, NotificationKind, ParticipantEvent, RideRequest, RideRequestId,
    RideStatus, Transition, WithdrawReason, policy,
};

use super::{CoordinatorError, MatchingCoordinator};

impl MatchingCoordinator {
    /// 配車をキャンセルする
    ///
    /// - `pending`: 候補のドライバーからオファーを取り下げる
    /// - `accepted`（走行開始前のみ）: 担当ドライバーに通知し、受付可能に戻す
    pub async fn cancel_ride(
        &self,
        caller: &Caller,
        request_id: &RideRequestId,
    ) -> Result<RideRequest, CoordinatorError> {
        let ride = self.rides.get(request_id).await?;
        policy::can_cancel(&ride, caller)?;

        let ride = self
            .cancel_with_reason(ride, CancelReason::RequesterCancelled)
            .await?;

        self.dispatcher
            .reply(
                &caller.id,
                &ParticipantEvent::CancelConfirmed {
                    request_id: ride.id,
                },
            )
            .await;

        Ok(ride)
    }

    /// 現在のステータスから `cancelled` へ遷移させ、関係者に通知する
    pub(super) async fn cancel_with_reason(
        &self,
        ride: RideRequest,
        reason: CancelReason,
    ) -> Result<RideRequest, CoordinatorError> {
        let mut transition = Transition::new(ride.status, RideStatus::Cancelled, self.now());
        if reason == CancelReason::RequesterCancelled {
            transition = transition.before_trip_start();
        }
        let cancelled = self.rides.transition(&ride.id, transition).await?;

        tracing::info!(
            "Ride request '{}' cancelled ({}, was {})",
            cancelled.id,
            reason.as_str(),
            ride.status
        );

        match ride.status {
            RideStatus::Pending => {
                self.withdraw_offers(&cancelled, None, WithdrawReason::CancelledByRequester)
                    .await;
            }
            RideStatus::Accepted => {
                let event = ParticipantEvent::RideCancelled {
                    request_id: cancelled.id,
                    reason,
                };
                if reason == CancelReason::DriverDisconnected {
                    self.dispatcher
                        .notify(&cancelled.requester, NotificationKind::RideResponse, &event)
                        .await;
                } else if let Some(driver) = &cancelled.driver {
                    self.participants.release_driver(driver).await;
                    self.dispatcher
                        .notify(driver, NotificationKind::RideResponse, &event)
                        .await;
                }
            }
            _ => {}
        }

        Ok(cancelled)
    }
}
