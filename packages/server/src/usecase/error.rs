//! UseCase 層のエラー型
//!
//! ドメイン層のエラー（`RepositoryError` / `PolicyViolation` / `ValueObjectError`）は
//! ここで `CoordinatorError` に変換され、操作した参加者に `error` イベントとして返されます。

use thiserror::Error;

use crate::domain::{PolicyViolation, RepositoryError, ValueObjectError};

/// 配車操作のエラー
///
/// 1 つの操作に閉じたエラーで、状態を壊さず、プロセスを停止させない。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoordinatorError {
    /// ロール違い・所有者でない・候補でない・不正な入力
    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    /// リクエストが既に終端状態
    #[error("{0}")]
    AlreadyFinalized(String),

    /// compare-and-swap に負けた
    #[error("{0}")]
    StaleState(String),

    #[error("{0}")]
    DuplicateConnection(String),

    /// 一意制約違反
    #[error("{0}")]
    Conflict(String),
}

impl CoordinatorError {
    /// ワイヤ上のエラーコード
    pub fn code(&self) -> &'static str {
        match self {
            CoordinatorError::Forbidden(_) => "FORBIDDEN",
            CoordinatorError::NotFound(_) => "NOT_FOUND",
            CoordinatorError::AlreadyFinalized(_) => "ALREADY_FINALIZED",
            CoordinatorError::StaleState(_) => "STALE_STATE",
            CoordinatorError::DuplicateConnection(_) => "DUPLICATE_CONNECTION",
            CoordinatorError::Conflict(_) => "CONFLICT",
        }
    }
}

impl From<RepositoryError> for CoordinatorError {
    fn from(err: RepositoryError) -> Self {
        let message = err.to_string();
        match err {
            RepositoryError::NotFound { .. } => CoordinatorError::NotFound(message),
            RepositoryError::StaleState { .. } => CoordinatorError::StaleState(message),
            RepositoryError::InvalidTransition { .. } => {
                CoordinatorError::AlreadyFinalized(message)
            }
            RepositoryError::TripInProgress(_) => CoordinatorError::Forbidden(message),
            RepositoryError::DuplicateParticipant(_) => {
                CoordinatorError::DuplicateConnection(message)
            }
            RepositoryError::Conflict(_) => CoordinatorError::Conflict(message),
        }
    }
}

impl From<PolicyViolation> for CoordinatorError {
    fn from(violation: PolicyViolation) -> Self {
        let message = violation.to_string();
        match violation {
            PolicyViolation::AlreadyAccepted => CoordinatorError::StaleState(message),
            PolicyViolation::Finalized(_) => CoordinatorError::AlreadyFinalized(message),
            _ => CoordinatorError::Forbidden(message),
        }
    }
}

impl From<ValueObjectError> for CoordinatorError {
    fn from(err: ValueObjectError) -> Self {
        CoordinatorError::Forbidden(err.to_string())
    }
}
