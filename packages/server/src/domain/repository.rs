//! Repository trait 定義
//!
//! ドメイン層が必要とするデータアクセスのインターフェースを定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。
//!
//! ## 依存性の逆転（DIP）
//!
//! - ドメイン層が必要とするインターフェースをドメイン層自身が定義
//! - Infrastructure 層がドメイン層のインターフェースに依存
//! - ドメイン層は Infrastructure 層に依存しない

use async_trait::async_trait;

use super::{
    Driver, DriverLocation, Fare, NewDriver, NewRideRequest, NewStudent, Notification,
    NotificationId, Participant, ParticipantId, RepositoryError, RideRequest, RideRequestId,
    RideStatus, Student, Timestamp,
};

/// 接続中の参加者（Connection Registry）の Repository
///
/// 可用性フラグの変更は全てこの Repository の中でアトミックに行われる。
#[async_trait]
pub trait ParticipantRepository: Send + Sync {
    /// 参加者を追加（同じ ID が既に存在する場合は `DuplicateParticipant`）
    async fn add_participant(&self, participant: Participant) -> Result<(), RepositoryError>;

    /// 参加者を削除（存在しなければ `None`）
    async fn remove_participant(&self, participant_id: &ParticipantId) -> Option<Participant>;

    async fn get_participant(&self, participant_id: &ParticipantId) -> Option<Participant>;

    /// 受付可能なドライバーの一覧（ID 順）
    async fn list_available_drivers(&self) -> Vec<Participant>;

    /// ドライバーの可用性を変更
    async fn set_availability(
        &self,
        participant_id: &ParticipantId,
        available: bool,
    ) -> Result<Participant, RepositoryError>;

    /// 受付可能なドライバーを受付不可にする（compare-and-swap）
    ///
    /// 受付可能だった場合のみ `true` を返す
    async fn claim_driver(&self, participant_id: &ParticipantId) -> Result<bool, RepositoryError>;

    /// ドライバーを受付可能に戻す（接続していなければ `false`）
    async fn release_driver(&self, participant_id: &ParticipantId) -> bool;

    /// ドライバーの現在地を更新
    async fn update_location(
        &self,
        participant_id: &ParticipantId,
        location: DriverLocation,
    ) -> Result<(), RepositoryError>;

    /// 接続中の参加者数
    async fn count_connected(&self) -> usize;
}

/// ステータス遷移の要求（compare-and-swap）
///
/// 現在のステータスが `expected` の場合のみ `next` に遷移する。
/// `driver` / `final_fare` はステータスの変更と同時に記録される。
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub expected: RideStatus,
    pub next: RideStatus,
    pub driver: Option<ParticipantId>,
    pub final_fare: Option<Fare>,
    pub at: Timestamp,
    /// 走行開始前であることを遷移の条件にする
    pub require_not_started: bool,
}

impl Transition {
    pub fn new(expected: RideStatus, next: RideStatus, at: Timestamp) -> Self {
        Self {
            expected,
            next,
            driver: None,
            final_fare: None,
            at,
            require_not_started: false,
        }
    }

    pub fn with_driver(mut self, driver: ParticipantId) -> Self {
        self.driver = Some(driver);
        self
    }

    pub fn with_final_fare(mut self, fare: Fare) -> Self {
        self.final_fare = Some(fare);
        self
    }

    pub fn before_trip_start(mut self) -> Self {
        self.require_not_started = true;
        self
    }
}

/// 配車リクエスト（Ride Request Store）の Repository
///
/// ステータスの変更は `transition` を通してのみ行われ、
/// 1 つのリクエストに対する check-and-set は常にアトミックに実行される。
#[async_trait]
pub trait RideRequestRepository: Send + Sync {
    /// `pending` 状態のリクエストを作成
    async fn create(&self, new: NewRideRequest) -> RideRequest;

    async fn get(&self, id: &RideRequestId) -> Result<RideRequest, RepositoryError>;

    /// ステータスを compare-and-swap で遷移させ、遷移後のリクエストを返す
    ///
    /// - 現在のステータスが `expected` と異なる: `StaleState`
    /// - 許可されていない遷移: `InvalidTransition`
    /// - `require_not_started` なのに走行中: `TripInProgress`
    async fn transition(
        &self,
        id: &RideRequestId,
        transition: Transition,
    ) -> Result<RideRequest, RepositoryError>;

    /// ドライバーの辞退を記録（`pending` のときのみ）
    async fn record_decline(
        &self,
        id: &RideRequestId,
        driver: &ParticipantId,
        at: Timestamp,
    ) -> Result<RideRequest, RepositoryError>;

    /// 走行開始を記録（`accepted` かつ未開始のときのみ）
    async fn mark_started(
        &self,
        id: &RideRequestId,
        at: Timestamp,
    ) -> Result<RideRequest, RepositoryError>;

    /// `pending` のリクエスト一覧（作成順）
    async fn list_pending(&self) -> Vec<RideRequest>;

    /// ドライバーにオファー中の `pending` リクエスト一覧
    async fn list_pending_for_driver(&self, driver: &ParticipantId) -> Vec<RideRequest>;

    /// 学生のリクエストのうち、指定したステータスのもの
    async fn list_by_requester(
        &self,
        requester: &ParticipantId,
        status: RideStatus,
    ) -> Vec<RideRequest>;

    /// ドライバーが受諾したリクエストのうち、指定したステータスのもの
    async fn list_by_driver(&self, driver: &ParticipantId, status: RideStatus)
    -> Vec<RideRequest>;

    /// `cutoff` より前に終了状態になったリクエストを削除し、削除件数を返す
    async fn purge_finished_before(&self, cutoff: Timestamp) -> usize;
}

/// 参加者ごとの通知ログの Repository
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    async fn append(&self, notification: Notification);

    /// 受信者の通知一覧（新しい順）
    async fn list_for(&self, recipient: &ParticipantId) -> Vec<Notification>;

    /// 通知を既読にする（受信者本人の通知でなければ `NotFound`）
    async fn mark_read(
        &self,
        recipient: &ParticipantId,
        id: &NotificationId,
    ) -> Result<Notification, RepositoryError>;

    async fn unread_count(&self, recipient: &ParticipantId) -> usize;

    /// `cutoff` より前に作成された通知を削除し、削除件数を返す
    async fn purge_older_than(&self, cutoff: Timestamp) -> usize;
}

/// 学生・ドライバーのプロフィールを管理する外部データストア
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// 学生を登録（email が重複する場合は `Conflict`）
    async fn create_student(&self, new: NewStudent) -> Result<Student, RepositoryError>;

    /// ドライバーを登録（email / phone / vehicle number が重複する場合は `Conflict`）
    async fn create_driver(&self, new: NewDriver) -> Result<Driver, RepositoryError>;

    async fn get_student(&self, id: &str) -> Option<Student>;

    async fn get_driver(&self, id: &str) -> Option<Driver>;

    async fn get_student_by_email(&self, email: &str) -> Option<Student>;

    async fn get_driver_by_phone(&self, phone: &str) -> Option<Driver>;

    async fn get_driver_by_email(&self, email: &str) -> Option<Driver>;

    async fn list_students(&self) -> Vec<Student>;

    async fn list_drivers(&self) -> Vec<Driver>;

    /// ドライバーのオンライン状態を更新
    async fn update_driver_availability(
        &self,
        id: &str,
        is_online: bool,
    ) -> Result<Driver, RepositoryError>;
}
