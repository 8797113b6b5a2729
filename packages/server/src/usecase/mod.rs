//! UseCase 層
//!
//! ドメイン層の型と trait を組み合わせて、参加者の操作（接続・配車・切断）を実行します。
//! 具体的な Repository / MessagePusher の実装には依存しません。

pub mod availability;
pub mod config;
pub mod connect_participant;
pub mod disconnect_participant;
pub mod dispatcher;
pub mod error;
pub mod matching;
pub mod profile;

pub use availability::DriverAvailabilityUseCase;
pub use config::MatchingConfig;
pub use connect_participant::ConnectParticipantUseCase;
pub use disconnect_participant::DisconnectParticipantUseCase;
pub use dispatcher::{DeliveryResult, NotificationDispatcher};
pub use error::CoordinatorError;
pub use matching::{MatchingCoordinator, RideRequestCommand};
pub use profile::ProfileUseCase;
