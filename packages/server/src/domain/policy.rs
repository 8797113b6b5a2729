//! 配車操作の認可ルール
//!
//! 誰がどの状態のリクエストに対して何をできるかを、副作用のない関数として定義します。
//! ステータスの実際の変更は Repository の compare-and-swap で行われるため、
//! ここでの判定は「操作してよいか」の事前チェックに限られます。

use thiserror::Error;

use super::{Caller, RideRequest, RideStatus, Role};

/// 認可ルール違反
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyViolation {
    #[error("only a {0} can perform this action")]
    WrongRole(Role),

    #[error("only the requester can perform this action")]
    NotRequester,

    #[error("this ride request was not offered to you")]
    NotCandidate,

    #[error("you have already declined this ride request")]
    AlreadyDeclined,

    #[error("this ride is not assigned to you")]
    NotAssignedDriver,

    #[error("the trip has already started")]
    TripAlreadyStarted,

    /// 他のドライバーが先に受諾した
    #[error("the ride request has already been accepted")]
    AlreadyAccepted,

    #[error("the ride request is already {0}")]
    Finalized(RideStatus),
}

pub fn require_role(caller: &Caller, role: Role) -> Result<(), PolicyViolation> {
    if caller.role == role {
        Ok(())
    } else {
        Err(PolicyViolation::WrongRole(role))
    }
}

/// 受諾: 候補のドライバーで、まだ辞退しておらず、リクエストが `pending`
pub fn can_accept(ride: &RideRequest, caller: &Caller) -> Result<(), PolicyViolation> {
    require_role(caller, Role::Driver)?;
    if !ride.is_candidate(&caller.id) {
        return Err(PolicyViolation::NotCandidate);
    }
    if ride.has_declined(&caller.id) {
        return Err(PolicyViolation::AlreadyDeclined);
    }
    match ride.status {
        RideStatus::Pending => Ok(()),
        RideStatus::Accepted => Err(PolicyViolation::AlreadyAccepted),
        status => Err(PolicyViolation::Finalized(status)),
    }
}

/// 辞退: 候補のドライバーで、まだ辞退しておらず、リクエストが `pending`
pub fn can_decline(ride: &RideRequest, caller: &Caller) -> Result<(), PolicyViolation> {
    require_role(caller, Role::Driver)?;
    if !ride.is_candidate(&caller.id) {
        return Err(PolicyViolation::NotCandidate);
    }
    if ride.has_declined(&caller.id) {
        return Err(PolicyViolation::AlreadyDeclined);
    }
    match ride.status {
        RideStatus::Pending => Ok(()),
        status => Err(PolicyViolation::Finalized(status)),
    }
}

/// 走行開始: 受諾したドライバー本人で、`accepted` かつ未開始
pub fn can_start(ride: &RideRequest, caller: &Caller) -> Result<(), PolicyViolation> {
    require_role(caller, Role::Driver)?;
    if !ride.is_assigned_to(&caller.id) {
        return Err(PolicyViolation::NotAssignedDriver);
    }
    if ride.status != RideStatus::Accepted {
        return Err(PolicyViolation::Finalized(ride.status));
    }
    if ride.is_in_progress() {
        return Err(PolicyViolation::TripAlreadyStarted);
    }
    Ok(())
}

/// 走行完了: 受諾したドライバー本人で、`accepted`
pub fn can_complete(ride: &RideRequest, caller: &Caller) -> Result<(), PolicyViolation> {
    require_role(caller, Role::Driver)?;
    if !ride.is_assigned_to(&caller.id) {
        return Err(PolicyViolation::NotAssignedDriver);
    }
    if ride.status != RideStatus::Accepted {
        return Err(PolicyViolation::Finalized(ride.status));
    }
    Ok(())
}

/// キャンセル: リクエストした学生本人で、`pending` または走行開始前の `accepted`
pub fn can_cancel(ride: &RideRequest, caller: &Caller) -> Result<(), PolicyViolation> {
    require_role(caller, Role::Student)?;
    if ride.requester != caller.id {
        return Err(PolicyViolation::NotRequester);
    }
    match ride.status {
        RideStatus::Pending => Ok(()),
        RideStatus::Accepted if ride.is_in_progress() => Err(PolicyViolation::TripAlreadyStarted),
        RideStatus::Accepted => Ok(()),
        status => Err(PolicyViolation::Finalized(status)),
    }
}
