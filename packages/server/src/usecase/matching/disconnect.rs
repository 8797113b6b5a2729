//! 参加者の切断に伴う配車の後始末

use crate::domain::{CancelReason, Participant, RideStatus, Role};

use super::{CoordinatorError, MatchingCoordinator};

impl MatchingCoordinator {
    /// 切断した参加者が関わる配車を整理する
    ///
    /// - 学生: `pending` のリクエストをキャンセルする
    /// - ドライバー: 担当中（`accepted`）の配車をキャンセルし、オファー中のリクエストは辞退扱いにする
    ///
    /// 遷移は全て compare-and-swap で行い、同時に他の遷移が起きたリクエストはスキップする。
    pub async fn handle_disconnect(&self, participant: &Participant) {
        match participant.role {
            Role::Student => self.release_requests_of(participant).await,
            Role::Driver => self.release_rides_of(participant).await,
        }
    }

    async fn release_requests_of(&self, student: &Participant) {
        let pending = self
            .rides
            .list_by_requester(&student.id, RideStatus::Pending)
            .await;
        for ride in pending {
            let id = ride.id;
            log_cascade_result(
                "cancel",
                &id.to_string(),
                self.cancel_with_reason(ride, CancelReason::RequesterDisconnected)
                    .await
                    .map(|_| ()),
            );
        }
    }

    async fn release_rides_of(&self, driver: &Participant) {
        let assigned = self
            .rides
            .list_by_driver(&driver.id, RideStatus::Accepted)
            .await;
        for ride in assigned {
            let id = ride.id;
            log_cascade_result(
                "cancel",
                &id.to_string(),
                self.cancel_with_reason(ride, CancelReason::DriverDisconnected)
                    .await
                    .map(|_| ()),
            );
        }

        let offered = self.rides.list_pending_for_driver(&driver.id).await;
        for ride in offered {
            log_cascade_result(
                "decline",
                &ride.id.to_string(),
                self.apply_decline(&ride.id, &driver.id).await.map(|_| ()),
            );
        }
    }
}

fn log_cascade_result(action: &str, request_id: &str, result: Result<(), CoordinatorError>) {
    match result {
        Ok(()) => {}
        Err(CoordinatorError::StaleState(reason)) => {
            tracing::debug!("Skipped {} of '{}' on disconnect: {}", action, request_id, reason);
        }
        Err(e) => {
            tracing::warn!("Failed to {} '{}' on disconnect: {}", action, request_id, e);
        }
    }
}
