//! 通知ログのエントリ

use std::fmt;

use serde::Serialize;

use crate::domain::value_object::{NotificationId, ParticipantId, RideRequestId, Timestamp};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    RideRequest,
    RideResponse,
    TripStarted,
    TripCompleted,
    System,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::RideRequest => "ride_request",
            NotificationKind::RideResponse => "ride_response",
            NotificationKind::TripStarted => "trip_started",
            NotificationKind::TripCompleted => "trip_completed",
            NotificationKind::System => "system",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 受信者ごとの通知ログに保存される通知
///
/// 受信者が所有し、既読化は受信者自身の操作でのみ行われる。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub id: NotificationId,
    pub recipient: ParticipantId,
    pub kind: NotificationKind,
    pub ride_request_id: Option<RideRequestId>,
    pub title: String,
    pub message: String,
    pub read: bool,
    pub created_at: Timestamp,
}
