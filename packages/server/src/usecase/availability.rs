//! UseCase: ドライバーの受付状態と現在地
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - DriverAvailabilityUseCase の受付状態の切り替え・一覧・現在地の更新
//!
//! ### なぜこのテストが必要か
//! - 担当中の配車があるドライバーが新しいオファーを受けないことを保証
//!
//! ### どのような状況を想定しているか
//! - 正常系：受付停止と再開
//! - 異常系：学生による操作、担当中の受付再開

use std::sync::Arc;

use crate::domain::{
    Caller, DriverLocation, Participant, ParticipantEvent, ParticipantRepository,
    RideRequestRepository, RideStatus, Role, UserDirectory, policy,
};

use super::{dispatcher::NotificationDispatcher, error::CoordinatorError};

/// ドライバーの受付状態のユースケース
pub struct DriverAvailabilityUseCase {
    participants: Arc<dyn ParticipantRepository>,
    rides: Arc<dyn RideRequestRepository>,
    directory: Arc<dyn UserDirectory>,
    dispatcher: Arc<NotificationDispatcher>,
}

impl DriverAvailabilityUseCase {
    pub fn new(
        participants: Arc<dyn ParticipantRepository>,
        rides: Arc<dyn RideRequestRepository>,
        directory: Arc<dyn UserDirectory>,
        dispatcher: Arc<NotificationDispatcher>,
    ) -> Self {
        Self {
            participants,
            rides,
            directory,
            dispatcher,
        }
    }

    /// ドライバー自身が受付状態を切り替える
    ///
    /// 担当中（`accepted`）の配車がある間は受付を再開できない
    pub async fn set_availability(
        &self,
        caller: &Caller,
        available: bool,
    ) -> Result<Participant, CoordinatorError> {
        policy::require_role(caller, Role::Driver)?;

        if available
            && !self
                .rides
                .list_by_driver(&caller.id, RideStatus::Accepted)
                .await
                .is_empty()
        {
            return Err(CoordinatorError::Forbidden(
                "finish the current ride before accepting new ones".to_string(),
            ));
        }

        let participant = self
            .participants
            .set_availability(&caller.id, available)
            .await?;
        if let Err(e) = self
            .directory
            .update_driver_availability(caller.id.as_str(), available)
            .await
        {
            tracing::debug!("No driver profile for '{}': {}", caller.id, e);
        }

        tracing::info!("Driver '{}' availability set to {}", caller.id, available);
        self.dispatcher
            .reply(
                &caller.id,
                &ParticipantEvent::AvailabilityUpdated {
                    is_available: available,
                },
            )
            .await;

        Ok(participant)
    }

    /// 受付可能なドライバーの一覧
    pub async fn list_available_drivers(&self) -> Vec<Participant> {
        self.participants.list_available_drivers().await
    }

    /// ドライバーの現在地を更新
    pub async fn update_location(
        &self,
        caller: &Caller,
        location: DriverLocation,
    ) -> Result<(), CoordinatorError> {
        policy::require_role(caller, Role::Driver)?;
        tracing::debug!(
            "Driver '{}' at {} ({}, {})",
            caller.id,
            location.address,
            location.lat,
            location.lng
        );
        self.participants
            .update_location(&caller.id, location)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{Fare, Place},
        infrastructure::repository::InMemoryUserDirectory,
        usecase::matching::{
            RideRequestCommand,
            test_support::{TestWorld, drain, of_type, pid},
        },
    };
    use rickshaw_shared::time::FixedClock;

    fn create_usecase(world: &TestWorld) -> DriverAvailabilityUseCase {
        let dispatcher = Arc::new(NotificationDispatcher::new(
            world.pusher.clone(),
            world.notifications.clone(),
            Arc::new(FixedClock::new(0)),
        ));
        DriverAvailabilityUseCase::new(
            world.participants.clone(),
            world.rides.clone(),
            Arc::new(InMemoryUserDirectory::new()),
            dispatcher,
        )
    }

    #[tokio::test]
    async fn test_driver_toggles_availability() {
        // テスト項目: ドライバーは受付を停止・再開でき、確認が届く
        // given (前提条件):
        let world = TestWorld::new();
        let mut rx = world.connect("drv-1", Role::Driver, "Karim").await;
        let usecase = create_usecase(&world);
        let caller = Caller::driver(pid("drv-1"));

        // when (操作):
        let off = usecase.set_availability(&caller, false).await.unwrap();
        let listed_while_off = usecase.list_available_drivers().await;
        let on = usecase.set_availability(&caller, true).await.unwrap();

        // then (期待する結果):
        assert!(!off.available);
        assert!(listed_while_off.is_empty());
        assert!(on.available);
        assert_eq!(of_type(&drain(&mut rx), "availability_updated").len(), 2);
    }

    #[tokio::test]
    async fn test_student_cannot_set_availability() {
        // テスト項目: 学生は受付状態を変更できない
        // given (前提条件):
        let world = TestWorld::new();
        let _rx = world.connect("stu-1", Role::Student, "Nadia").await;
        let usecase = create_usecase(&world);

        // when (操作):
        let result = usecase
            .set_availability(&Caller::student(pid("stu-1")), true)
            .await;

        // then (期待する結果):
        assert!(matches!(result, Err(CoordinatorError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_cannot_become_available_during_ride() {
        // テスト項目: 担当中の配車がある間は受付を再開できない
        // given (前提条件):
        let world = TestWorld::new();
        let _student = world.connect("stu-1", Role::Student, "Nadia").await;
        let _driver = world.connect("drv-1", Role::Driver, "Karim").await;
        let ride = world
            .coordinator
            .request_ride(
                &Caller::student(pid("stu-1")),
                RideRequestCommand {
                    pickup: Place::new("Main Gate".to_string()).unwrap(),
                    destination: Place::new("Library".to_string()).unwrap(),
                    fare: Some(Fare::new(25)),
                    distance_km: None,
                    driver_id: None,
                },
            )
            .await
            .unwrap();
        world
            .coordinator
            .accept_ride(&Caller::driver(pid("drv-1")), &ride.id)
            .await
            .unwrap();
        let usecase = create_usecase(&world);

        // when (操作):
        let result = usecase
            .set_availability(&Caller::driver(pid("drv-1")), true)
            .await;

        // then (期待する結果):
        assert!(matches!(result, Err(CoordinatorError::Forbidden(_))));
        assert!(usecase.list_available_drivers().await.is_empty());
    }

    #[tokio::test]
    async fn test_update_location() {
        // テスト項目: ドライバーの現在地が記録される
        // given (前提条件):
        let world = TestWorld::new();
        let _rx = world.connect("drv-1", Role::Driver, "Karim").await;
        let usecase = create_usecase(&world);

        // when (操作):
        usecase
            .update_location(
                &Caller::driver(pid("drv-1")),
                DriverLocation {
                    lat: 23.7,
                    lng: 90.4,
                    address: "Main Gate".to_string(),
                },
            )
            .await
            .unwrap();

        // then (期待する結果):
        let participant = world.participants.get_participant(&pid("drv-1")).await.unwrap();
        assert_eq!(participant.location.unwrap().address, "Main Gate");
    }
}
