//! ドメイン層のエラー型

use thiserror::Error;

use super::entity::RideStatus;

/// Value Object 生成時のバリデーションエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    #[error("{0} must not be empty")]
    Empty(&'static str),

    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },

    #[error("invalid {field}: '{value}'")]
    Invalid { field: &'static str, value: String },
}

/// Repository 操作のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("{entity} '{id}' not found")]
    NotFound { entity: &'static str, id: String },

    /// compare-and-swap の期待値と現在のステータスが一致しない
    #[error("ride request '{id}' is {actual}, expected {expected}")]
    StaleState {
        id: String,
        expected: RideStatus,
        actual: RideStatus,
    },

    #[error("ride request '{id}' cannot move from {from} to {to}")]
    InvalidTransition {
        id: String,
        from: RideStatus,
        to: RideStatus,
    },

    /// 走行開始後のリクエストに「走行開始前」を条件とする遷移を適用しようとした
    #[error("ride request '{0}' is already in progress")]
    TripInProgress(String),

    #[error("participant '{0}' is already registered")]
    DuplicateParticipant(String),

    /// 一意制約違反（email / phone / vehicle number）
    #[error("{0}")]
    Conflict(String),
}

/// MessagePusher のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessagePushError {
    #[error("participant '{0}' is not connected")]
    ClientNotFound(String),

    #[error("participant '{0}' already has a channel")]
    AlreadyRegistered(String),

    #[error("failed to push message: {0}")]
    PushFailed(String),
}
