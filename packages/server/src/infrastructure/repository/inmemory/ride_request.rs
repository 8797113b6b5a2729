//! InMemory RideRequest Repository 実装
//!
//! 配車リクエストを HashMap で保持し、作成順を別の Vec で管理します。
//! ステータスの変更は全て一つの Mutex の中で「現在値の確認 → 更新」を行う
//! compare-and-swap として実装され、同時に届いた accept のうち一つだけが成功します。

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{
    NewRideRequest, ParticipantId, RepositoryError, RideRequest, RideRequestId,
    RideRequestIdFactory, RideRequestRepository, RideStatus, Timestamp, Transition,
};

#[derive(Default)]
struct RideStore {
    rides: HashMap<RideRequestId, RideRequest>,
    /// 作成順
    order: Vec<RideRequestId>,
}

impl RideStore {
    fn get_mut(&mut self, id: &RideRequestId) -> Result<&mut RideRequest, RepositoryError> {
        self.rides.get_mut(id).ok_or_else(|| not_found(id))
    }

    fn filtered(&self, predicate: impl Fn(&RideRequest) -> bool) -> Vec<RideRequest> {
        self.order
            .iter()
            .filter_map(|id| self.rides.get(id))
            .filter(|ride| predicate(ride))
            .cloned()
            .collect()
    }
}

/// インメモリ RideRequest Repository 実装
pub struct InMemoryRideRequestRepository {
    store: Arc<Mutex<RideStore>>,
}

impl InMemoryRideRequestRepository {
    pub fn new() -> Self {
        Self {
            store: Arc::new(Mutex::new(RideStore::default())),
        }
    }
}

impl Default for InMemoryRideRequestRepository {
    fn default() -> Self {
        Self::new()
    }
}

fn not_found(id: &RideRequestId) -> RepositoryError {
    RepositoryError::NotFound {
        entity: "ride request",
        id: id.to_string(),
    }
}

fn stale(ride: &RideRequest, expected: RideStatus) -> RepositoryError {
    RepositoryError::StaleState {
        id: ride.id.to_string(),
        expected,
        actual: ride.status,
    }
}

#[async_trait]
impl RideRequestRepository for InMemoryRideRequestRepository {
    async fn create(&self, new: NewRideRequest) -> RideRequest {
        let ride = RideRequest::new(RideRequestIdFactory::generate(), new);
        let mut store = self.store.lock().await;
        store.order.push(ride.id);
        store.rides.insert(ride.id, ride.clone());
        ride
    }

    async fn get(&self, id: &RideRequestId) -> Result<RideRequest, RepositoryError> {
        let store = self.store.lock().await;
        store.rides.get(id).cloned().ok_or_else(|| not_found(id))
    }

    async fn transition(
        &self,
        id: &RideRequestId,
        transition: Transition,
    ) -> Result<RideRequest, RepositoryError> {
        let mut store = self.store.lock().await;
        let ride = store.get_mut(id)?;

        if ride.status != transition.expected {
            return Err(stale(ride, transition.expected));
        }
        if !ride.status.can_transition_to(transition.next) {
            return Err(RepositoryError::InvalidTransition {
                id: id.to_string(),
                from: ride.status,
                to: transition.next,
            });
        }
        if transition.require_not_started && ride.started_at.is_some() {
            return Err(RepositoryError::TripInProgress(id.to_string()));
        }

        ride.status = transition.next;
        ride.updated_at = transition.at;
        if let Some(driver) = transition.driver {
            ride.driver = Some(driver);
        }
        if let Some(fare) = transition.final_fare {
            ride.final_fare = Some(fare);
        }
        Ok(ride.clone())
    }

    async fn record_decline(
        &self,
        id: &RideRequestId,
        driver: &ParticipantId,
        at: Timestamp,
    ) -> Result<RideRequest, RepositoryError> {
        let mut store = self.store.lock().await;
        let ride = store.get_mut(id)?;
        if ride.status != RideStatus::Pending {
            return Err(stale(ride, RideStatus::Pending));
        }
        ride.declined_by.insert(driver.clone());
        ride.updated_at = at;
        Ok(ride.clone())
    }

    async fn mark_started(
        &self,
        id: &RideRequestId,
        at: Timestamp,
    ) -> Result<RideRequest, RepositoryError> {
        let mut store = self.store.lock().await;
        let ride = store.get_mut(id)?;
        if ride.status != RideStatus::Accepted {
            return Err(stale(ride, RideStatus::Accepted));
        }
        if ride.started_at.is_some() {
            return Err(RepositoryError::TripInProgress(id.to_string()));
        }
        ride.started_at = Some(at);
        ride.updated_at = at;
        Ok(ride.clone())
    }

    async fn list_pending(&self) -> Vec<RideRequest> {
        let store = self.store.lock().await;
        store.filtered(|ride| ride.status == RideStatus::Pending)
    }

    async fn list_pending_for_driver(&self, driver: &ParticipantId) -> Vec<RideRequest> {
        let store = self.store.lock().await;
        store.filtered(|ride| {
            ride.status == RideStatus::Pending
                && ride.is_candidate(driver)
                && !ride.has_declined(driver)
        })
    }

    async fn list_by_requester(
        &self,
        requester: &ParticipantId,
        status: RideStatus,
    ) -> Vec<RideRequest> {
        let store = self.store.lock().await;
        store.filtered(|ride| &ride.requester == requester && ride.status == status)
    }

    async fn list_by_driver(
        &self,
        driver: &ParticipantId,
        status: RideStatus,
    ) -> Vec<RideRequest> {
        let store = self.store.lock().await;
        store.filtered(|ride| ride.is_assigned_to(driver) && ride.status == status)
    }

    async fn purge_finished_before(&self, cutoff: Timestamp) -> usize {
        let mut store = self.store.lock().await;
        let RideStore { rides, order } = &mut *store;
        let before = rides.len();
        rides.retain(|_, ride| !(ride.status.is_terminal() && ride.updated_at < cutoff));
        order.retain(|id| rides.contains_key(id));
        before - rides.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DispatchMode, Fare, Place};

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - InMemoryRideRequestRepository の作成・取得・compare-and-swap による遷移
    // - 辞退の記録、走行開始の記録、各種一覧
    //
    // 【なぜこのテストが必要か】
    // - 「同時 accept のうち一つだけ成功」「終了状態は変わらない」は transition に依存する
    // - 失敗した遷移が状態を一切変えないことを保証する必要がある
    //
    // 【どのようなシナリオをテストするか】
    // 1. 作成直後は pending
    // 2. 期待値が一致する遷移の成功と、一致しない遷移の StaleState
    // 3. 許可されない遷移の InvalidTransition
    // 4. 走行開始後の「開始前のみ」遷移は TripInProgress
    // 5. 同時に 10 件の accept を投げて一件だけ成功
    // 6. 一覧の絞り込み
    // 7. 終了から一定時間が経ったリクエストだけが削除される
    // ========================================

    fn pid(value: &str) -> ParticipantId {
        ParticipantId::new(value.to_string()).unwrap()
    }

    fn new_request(candidates: &[&str]) -> NewRideRequest {
        NewRideRequest {
            requester: pid("stu-1"),
            requester_name: "Nadia".to_string(),
            mode: DispatchMode::Broadcast,
            candidates: candidates.iter().map(|c| pid(c)).collect(),
            pickup: Place::new("Main Gate".to_string()).unwrap(),
            destination: Place::new("Library".to_string()).unwrap(),
            quoted_fare: Fare::new(25),
            distance_km: 1.2,
            created_at: Timestamp::new(1_000),
            expires_at: Timestamp::new(31_000),
        }
    }

    fn accept(driver: &str) -> Transition {
        Transition::new(RideStatus::Pending, RideStatus::Accepted, Timestamp::new(2_000))
            .with_driver(pid(driver))
    }

    #[tokio::test]
    async fn test_create_and_get() {
        // テスト項目: 作成した配車リクエストを ID で取得でき、未知の ID は NotFound
        // given (前提条件):
        let repo = InMemoryRideRequestRepository::new();
        let ride = repo.create(new_request(&["drv-1"])).await;

        // when (操作):
        let found = repo.get(&ride.id).await;
        let missing = repo.get(&RideRequestIdFactory::generate()).await;

        // then (期待する結果):
        assert_eq!(found, Ok(ride.clone()));
        assert_eq!(ride.status, RideStatus::Pending);
        assert!(matches!(missing, Err(RepositoryError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_transition_compare_and_swap() {
        // テスト項目: 期待値が一致すれば遷移し、一致しなければ StaleState で状態は変わらない
        // given (前提条件):
        let repo = InMemoryRideRequestRepository::new();
        let ride = repo.create(new_request(&["drv-1", "drv-2"])).await;

        // when (操作):
        let first = repo.transition(&ride.id, accept("drv-1")).await;
        let second = repo.transition(&ride.id, accept("drv-2")).await;

        // then (期待する結果):
        let accepted = first.unwrap();
        assert_eq!(accepted.status, RideStatus::Accepted);
        assert_eq!(accepted.driver, Some(pid("drv-1")));
        assert_eq!(accepted.updated_at, Timestamp::new(2_000));
        assert!(matches!(
            second,
            Err(RepositoryError::StaleState {
                expected: RideStatus::Pending,
                actual: RideStatus::Accepted,
                ..
            })
        ));
        assert_eq!(repo.get(&ride.id).await.unwrap().driver, Some(pid("drv-1")));
    }

    #[tokio::test]
    async fn test_transition_rejects_disallowed_move() {
        // テスト項目: 許可されない遷移は InvalidTransition
        // given (前提条件):
        let repo = InMemoryRideRequestRepository::new();
        let ride = repo.create(new_request(&["drv-1"])).await;

        // when (操作):
        let result = repo
            .transition(
                &ride.id,
                Transition::new(RideStatus::Pending, RideStatus::Completed, Timestamp::new(2_000)),
            )
            .await;

        // then (期待する結果):
        assert!(matches!(result, Err(RepositoryError::InvalidTransition { .. })));
        assert_eq!(repo.get(&ride.id).await.unwrap().status, RideStatus::Pending);
    }

    #[tokio::test]
    async fn test_cancel_before_trip_start_fails_after_start() {
        // テスト項目: 走行開始後は「開始前のみ」のキャンセルが TripInProgress になる
        // given (前提条件):
        let repo = InMemoryRideRequestRepository::new();
        let ride = repo.create(new_request(&["drv-1"])).await;
        repo.transition(&ride.id, accept("drv-1")).await.unwrap();
        repo.mark_started(&ride.id, Timestamp::new(3_000))
            .await
            .unwrap();

        // when (操作):
        let result = repo
            .transition(
                &ride.id,
                Transition::new(RideStatus::Accepted, RideStatus::Cancelled, Timestamp::new(4_000))
                    .before_trip_start(),
            )
            .await;

        // then (期待する結果):
        assert!(matches!(result, Err(RepositoryError::TripInProgress(_))));
        assert_eq!(repo.get(&ride.id).await.unwrap().status, RideStatus::Accepted);
    }

    #[tokio::test]
    async fn test_mark_started_twice_fails() {
        // テスト項目: 走行開始は accepted の配車に一度だけ記録できる
        // given (前提条件):
        let repo = InMemoryRideRequestRepository::new();
        let ride = repo.create(new_request(&["drv-1"])).await;
        let pending = repo.mark_started(&ride.id, Timestamp::new(2_500)).await;
        repo.transition(&ride.id, accept("drv-1")).await.unwrap();

        // when (操作):
        let first = repo.mark_started(&ride.id, Timestamp::new(3_000)).await;
        let second = repo.mark_started(&ride.id, Timestamp::new(3_500)).await;

        // then (期待する結果):
        assert!(matches!(pending, Err(RepositoryError::StaleState { .. })));
        assert_eq!(first.unwrap().started_at, Some(Timestamp::new(3_000)));
        assert!(matches!(second, Err(RepositoryError::TripInProgress(_))));
    }

    #[tokio::test]
    async fn test_record_decline_only_while_pending() {
        // テスト項目: 辞退は pending の間だけ記録される
        // given (前提条件):
        let repo = InMemoryRideRequestRepository::new();
        let ride = repo.create(new_request(&["drv-1", "drv-2"])).await;

        // when (操作):
        let declined = repo
            .record_decline(&ride.id, &pid("drv-1"), Timestamp::new(1_500))
            .await
            .unwrap();
        repo.transition(&ride.id, accept("drv-2")).await.unwrap();
        let late = repo
            .record_decline(&ride.id, &pid("drv-2"), Timestamp::new(2_500))
            .await;

        // then (期待する結果):
        assert!(declined.has_declined(&pid("drv-1")));
        assert!(matches!(late, Err(RepositoryError::StaleState { .. })));
    }

    #[tokio::test]
    async fn test_concurrent_accepts_only_one_wins() {
        // テスト項目: 同時に届いた accept のうち一つだけが成功する
        // given (前提条件):
        let repo = Arc::new(InMemoryRideRequestRepository::new());
        let drivers: Vec<String> = (0..10).map(|i| format!("drv-{i}")).collect();
        let refs: Vec<&str> = drivers.iter().map(String::as_str).collect();
        let id = repo.create(new_request(&refs)).await.id;

        // when (操作):
        let handles: Vec<_> = drivers
            .iter()
            .map(|driver| {
                let repo = repo.clone();
                let transition = accept(driver);
                tokio::spawn(async move { repo.transition(&id, transition).await })
            })
            .collect();
        let mut successes = 0;
        let mut stale = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => successes += 1,
                Err(RepositoryError::StaleState { .. }) => stale += 1,
                Err(e) => panic!("unexpected error: {e}"),
            }
        }

        // then (期待する結果):
        assert_eq!(successes, 1);
        assert_eq!(stale, 9);
    }

    #[tokio::test]
    async fn test_list_filters() {
        // テスト項目: 一覧はステータス・参加者で絞り込まれ、作成順に並ぶ
        // given (前提条件):
        let repo = InMemoryRideRequestRepository::new();
        let first = repo.create(new_request(&["drv-1", "drv-2"])).await;
        let second = repo.create(new_request(&["drv-1"])).await;
        let third = repo.create(new_request(&["drv-2"])).await;
        repo.transition(&third.id, accept("drv-2")).await.unwrap();
        repo.record_decline(&second.id, &pid("drv-1"), Timestamp::new(1_500))
            .await
            .unwrap();

        // when (操作):
        let pending: Vec<_> = repo.list_pending().await.into_iter().map(|r| r.id).collect();
        let for_drv1: Vec<_> = repo
            .list_pending_for_driver(&pid("drv-1"))
            .await
            .into_iter()
            .map(|r| r.id)
            .collect();
        let requester_pending = repo
            .list_by_requester(&pid("stu-1"), RideStatus::Pending)
            .await;
        let drv2_accepted = repo.list_by_driver(&pid("drv-2"), RideStatus::Accepted).await;

        // then (期待する結果):
        assert_eq!(pending, vec![first.id, second.id]);
        assert_eq!(for_drv1, vec![first.id]);
        assert_eq!(requester_pending.len(), 2);
        assert_eq!(drv2_accepted.len(), 1);
        assert_eq!(drv2_accepted[0].id, third.id);
    }

    #[tokio::test]
    async fn test_purge_finished_before_keeps_active_and_recent() {
        // テスト項目: cutoff より前に終了したリクエストだけが削除され、進行中のものは残る
        // given (前提条件):
        let repo = InMemoryRideRequestRepository::new();
        let old_expired = repo.create(new_request(&["drv-1"])).await;
        repo.transition(
            &old_expired.id,
            Transition::new(RideStatus::Pending, RideStatus::Expired, Timestamp::new(31_000)),
        )
        .await
        .unwrap();
        let recent_cancelled = repo.create(new_request(&["drv-1"])).await;
        repo.transition(
            &recent_cancelled.id,
            Transition::new(RideStatus::Pending, RideStatus::Cancelled, Timestamp::new(90_000)),
        )
        .await
        .unwrap();
        let old_accepted = repo.create(new_request(&["drv-2"])).await;
        repo.transition(&old_accepted.id, accept("drv-2")).await.unwrap();
        let pending = repo.create(new_request(&["drv-3"])).await;

        // when (操作):
        let purged = repo.purge_finished_before(Timestamp::new(60_000)).await;
        let again = repo.purge_finished_before(Timestamp::new(60_000)).await;

        // then (期待する結果):
        assert_eq!(purged, 1);
        assert_eq!(again, 0);
        assert!(matches!(
            repo.get(&old_expired.id).await,
            Err(RepositoryError::NotFound { .. })
        ));
        assert!(repo.get(&recent_cancelled.id).await.is_ok());
        assert!(repo.get(&old_accepted.id).await.is_ok());
        let remaining: Vec<_> = repo.list_pending().await.into_iter().map(|r| r.id).collect();
        assert_eq!(remaining, vec![pending.id]);
        assert_eq!(repo.store.lock().await.order.len(), 3);
    }
}
