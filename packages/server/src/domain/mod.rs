//! ドメイン層
//!
//! 配車マッチングの中核となる型（Value Object / Entity / Event）と、
//! ドメイン層が必要とする外部インターフェース（Repository / MessagePusher / FareEstimator）を定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。

pub mod entity;
pub mod error;
pub mod event;
pub mod fare;
pub mod message_pusher;
pub mod policy;
pub mod repository;
pub mod value_object;

pub use entity::{
    DispatchMode, Driver, DriverLocation, NewDriver, NewRideRequest, NewStudent, Notification,
    NotificationKind, Participant, RideRequest, RideStatus, Student,
};
pub use error::{MessagePushError, RepositoryError, ValueObjectError};
pub use event::{CancelReason, ParticipantEvent, WithdrawReason};
pub use fare::{FareEstimator, FareQuote};
pub use policy::PolicyViolation;
pub use message_pusher::{MessagePusher, PusherChannel};
pub use repository::{
    NotificationRepository, ParticipantRepository, RideRequestRepository, Transition,
    UserDirectory,
};
pub use value_object::{
    Caller, Coordinates, DistanceKm, Fare, NotificationId, NotificationIdFactory, ParticipantId, Place, RideRequestId,
    RideRequestIdFactory, Role, Timestamp,
};
