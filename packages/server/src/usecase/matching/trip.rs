//! 走行の開始と完了

use crate::domain::{
    Caller, Fare, NotificationKind, ParticipantEvent, RideRequest, RideRequestId, RideStatus,
    Transition, policy,
};

use super::{CoordinatorError, MatchingCoordinator};

impl MatchingCoordinator {
    /// 走行を開始する（`accepted` のまま走行中になる）
    pub async fn start_trip(
        &self,
        caller: &Caller,
        request_id: &RideRequestId,
    ) -> Result<RideRequest, CoordinatorError> {
        let ride = self.rides.get(request_id).await?;
        policy::can_start(&ride, caller)?;

        let ride = self.rides.mark_started(request_id, self.now()).await?;
        tracing::info!("Trip '{}' started by '{}'", ride.id, caller.id);

        self.dispatcher
            .notify(
                &ride.requester,
                NotificationKind::TripStarted,
                &ParticipantEvent::TripStarted {
                    request_id: ride.id,
                    driver_id: caller.id.clone(),
                },
            )
            .await;
        self.dispatcher
            .reply(
                &caller.id,
                &ParticipantEvent::TripStartConfirmed {
                    request_id: ride.id,
                },
            )
            .await;

        Ok(ride)
    }

    /// 走行を完了する（`accepted` → `completed`）
    ///
    /// 実際の運賃を省略した場合は見積もりの運賃になる。
    /// 完了後、ドライバーは再び受付可能になる。
    pub async fn complete_trip(
        &self,
        caller: &Caller,
        request_id: &RideRequestId,
        actual_fare: Option<Fare>,
    ) -> Result<RideRequest, CoordinatorError> {
        let ride = self.rides.get(request_id).await?;
        policy::can_complete(&ride, caller)?;

        let fare = actual_fare.unwrap_or(ride.quoted_fare);
        let transition = Transition::new(RideStatus::Accepted, RideStatus::Completed, self.now())
            .with_final_fare(fare);
        let ride = self.rides.transition(request_id, transition).await?;
        self.participants.release_driver(&caller.id).await;

        tracing::info!("Trip '{}' completed by '{}' ({})", ride.id, caller.id, fare);

        self.dispatcher
            .notify(
                &ride.requester,
                NotificationKind::TripCompleted,
                &ParticipantEvent::TripCompleted {
                    request_id: ride.id,
                    actual_fare: fare,
                },
            )
            .await;
        self.dispatcher
            .reply(
                &caller.id,
                &ParticipantEvent::TripCompletionConfirmed {
                    request_id: ride.id,
                    earned_amount: fare,
                },
            )
            .await;

        Ok(ride)
    }
}
