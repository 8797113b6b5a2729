//! 配車リクエストの作成

use std::collections::BTreeSet;

use crate::domain::{
    Caller, DispatchMode, DistanceKm, Fare, NewRideRequest, NotificationKind, ParticipantEvent,
    ParticipantId, Place, RideRequest, Role, policy,
};

use super::{CoordinatorError, MatchingCoordinator};

/// 学生からの配車リクエスト
#[derive(Debug, Clone, PartialEq)]
pub struct RideRequestCommand {
    pub pickup: Place,
    pub destination: Place,
    /// 省略時は運賃見積もりの値
    pub fare: Option<Fare>,
    pub distance_km: Option<DistanceKm>,
    /// 指定した場合はそのドライバーだけにオファーする
    pub driver_id: Option<ParticipantId>,
}

impl MatchingCoordinator {
    /// 配車リクエストを作成し、候補のドライバーにオファーする
    ///
    /// - ドライバー指定なし: 作成時点で受付可能な全ドライバーが候補
    /// - ドライバー指定あり: 受付可能なそのドライバーだけが候補
    ///
    /// 候補が 0 人でもリクエストは作成され、期限切れで `expired` になる。
    pub async fn request_ride(
        &self,
        caller: &Caller,
        command: RideRequestCommand,
    ) -> Result<RideRequest, CoordinatorError> {
        policy::require_role(caller, Role::Student)?;

        let (mode, candidates) = match &command.driver_id {
            Some(driver_id) => {
                let driver = self
                    .participants
                    .get_participant(driver_id)
                    .await
                    .filter(|p| p.is_driver())
                    .ok_or_else(|| {
                        CoordinatorError::NotFound(format!(
                            "driver '{driver_id}' is not connected"
                        ))
                    })?;
                if !driver.available {
                    return Err(CoordinatorError::Forbidden(format!(
                        "driver '{driver_id}' is not available"
                    )));
                }
                (DispatchMode::Targeted, BTreeSet::from([driver.id]))
            }
            None => {
                let drivers = self.participants.list_available_drivers().await;
                (
                    DispatchMode::Broadcast,
                    drivers.into_iter().map(|p| p.id).collect(),
                )
            }
        };

        let quote = self
            .fares
            .estimate_fare(&command.pickup, &command.destination)
            .await;
        let now = self.now();
        let new = NewRideRequest {
            requester: caller.id.clone(),
            requester_name: self.display_name_of(&caller.id).await,
            mode,
            candidates,
            pickup: command.pickup,
            destination: command.destination,
            quoted_fare: command.fare.unwrap_or(quote.fare),
            distance_km: command
                .distance_km
                .map(|distance| distance.value())
                .unwrap_or(quote.distance_km),
            created_at: now,
            expires_at: now.plus_millis(self.config.request_timeout_millis()),
        };
        let ride = self.rides.create(new).await;

        tracing::info!(
            "Ride request '{}' created by '{}': {} -> {} ({}, {} candidates)",
            ride.id,
            ride.requester,
            ride.pickup,
            ride.destination,
            ride.quoted_fare,
            ride.candidates.len()
        );

        let offer = ParticipantEvent::RideOffered {
            request_id: ride.id,
            student_name: ride.requester_name.clone(),
            pickup: ride.pickup.clone(),
            destination: ride.destination.clone(),
            estimated_fare: ride.quoted_fare,
            distance_km: ride.distance_km,
            created_at: ride.created_at,
            expires_at: ride.expires_at,
        };
        self.dispatcher
            .notify_broadcast(
                ride.candidates.iter().cloned().collect(),
                NotificationKind::RideRequest,
                &offer,
            )
            .await;

        self.dispatcher
            .reply(
                &caller.id,
                &ParticipantEvent::RideRequestCreated {
                    request_id: ride.id,
                    pickup: ride.pickup.clone(),
                    destination: ride.destination.clone(),
                    fare: ride.quoted_fare,
                    distance_km: ride.distance_km,
                    candidate_count: ride.candidates.len(),
                    expires_at: ride.expires_at,
                },
            )
            .await;

        Ok(ride)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{ParticipantRepository, RideRequestRepository, RideStatus},
        usecase::matching::test_support::{TestWorld, drain, of_type, pid},
    };

    fn place(value: &str) -> Place {
        Place::new(value.to_string()).unwrap()
    }

    fn command(driver_id: Option<&str>) -> RideRequestCommand {
        RideRequestCommand {
            pickup: place("Main Gate"),
            destination: place("Library"),
            fare: Some(Fare::new(25)),
            distance_km: None,
            driver_id: driver_id.map(pid),
        }
    }

    #[tokio::test]
    async fn test_broadcast_request_is_offered_to_all_available_drivers() {
        // テスト項目: ドライバー指定なしのリクエストは受付可能な全ドライバーにオファーされる
        // given (前提条件):
        let world = TestWorld::new();
        let mut student = world.connect("stu-1", Role::Student, "Nadia").await;
        let mut d1 = world.connect("drv-1", Role::Driver, "Karim").await;
        let mut d2 = world.connect("drv-2", Role::Driver, "Rahim").await;
        let mut d3 = world.connect("drv-3", Role::Driver, "Salam").await;
        world
            .participants
            .set_availability(&pid("drv-3"), false)
            .await
            .unwrap();

        // when (操作):
        let ride = world
            .coordinator
            .request_ride(&Caller::student(pid("stu-1")), command(None))
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(ride.status, RideStatus::Pending);
        assert_eq!(ride.mode, DispatchMode::Broadcast);
        assert_eq!(ride.candidates, BTreeSet::from([pid("drv-1"), pid("drv-2")]));
        assert_eq!(ride.quoted_fare, Fare::new(25));
        assert_eq!(ride.expires_at, ride.created_at.plus_millis(30_000));

        let offers = of_type(&drain(&mut d1), "ride_request_notification");
        assert_eq!(offers.len(), 1);
        assert_eq!(offers[0]["student_name"], "Nadia");
        assert_eq!(offers[0]["pickup"], "Main Gate");
        assert_eq!(of_type(&drain(&mut d2), "ride_request_notification").len(), 1);
        assert!(drain(&mut d3).is_empty());
        assert_eq!(of_type(&drain(&mut student), "ride_request_created").len(), 1);
    }

    #[tokio::test]
    async fn test_targeted_request_is_offered_to_one_driver() {
        // テスト項目: ドライバー指定ありのリクエストはそのドライバーだけにオファーされる
        // given (前提条件):
        let world = TestWorld::new();
        let _student = world.connect("stu-1", Role::Student, "Nadia").await;
        let mut d1 = world.connect("drv-1", Role::Driver, "Karim").await;
        let mut d2 = world.connect("drv-2", Role::Driver, "Rahim").await;

        // when (操作):
        let ride = world
            .coordinator
            .request_ride(&Caller::student(pid("stu-1")), command(Some("drv-2")))
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(ride.mode, DispatchMode::Targeted);
        assert_eq!(ride.candidates, BTreeSet::from([pid("drv-2")]));
        assert!(drain(&mut d1).is_empty());
        assert_eq!(of_type(&drain(&mut d2), "ride_request_notification").len(), 1);
    }

    #[tokio::test]
    async fn test_driver_cannot_request_ride() {
        // テスト項目: ドライバーは配車リクエストを作成できない
        // given (前提条件):
        let world = TestWorld::new();
        let _driver = world.connect("drv-1", Role::Driver, "Karim").await;

        // when (操作):
        let result = world
            .coordinator
            .request_ride(&Caller::driver(pid("drv-1")), command(None))
            .await;

        // then (期待する結果):
        assert!(matches!(result, Err(CoordinatorError::Forbidden(_))));
        assert!(world.rides.list_pending().await.is_empty());
    }

    #[tokio::test]
    async fn test_targeted_request_to_unknown_driver_fails() {
        // テスト項目: 接続していないドライバーを指定すると NotFound
        // given (前提条件):
        let world = TestWorld::new();
        let _student = world.connect("stu-1", Role::Student, "Nadia").await;

        // when (操作):
        let result = world
            .coordinator
            .request_ride(&Caller::student(pid("stu-1")), command(Some("drv-9")))
            .await;

        // then (期待する結果):
        assert!(matches!(result, Err(CoordinatorError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_fare_defaults_to_estimate() {
        // テスト項目: 運賃・距離を省略すると運賃表の見積もりが使われる
        // given (前提条件):
        let world = TestWorld::new();
        let _student = world.connect("stu-1", Role::Student, "Nadia").await;
        let mut cmd = command(None);
        cmd.fare = None;

        // when (操作):
        let ride = world
            .coordinator
            .request_ride(&Caller::student(pid("stu-1")), cmd)
            .await
            .unwrap();

        // then (期待する結果):
        let quote = world
            .coordinator
            .estimate_fare(&place("Main Gate"), &place("Library"))
            .await;
        assert_eq!(ride.quoted_fare, quote.fare);
        assert_eq!(ride.distance_km, quote.distance_km);
        assert!(ride.candidates.is_empty());
    }
}
