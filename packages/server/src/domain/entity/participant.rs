//! 接続中の参加者

use serde::Serialize;

use crate::domain::value_object::{Coordinates, ParticipantId, Role, Timestamp};

/// ドライバーが報告した現在地
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DriverLocation {
    pub lat: f64,
    pub lng: f64,
    pub address: String,
}

impl DriverLocation {
    pub fn new(coordinates: Coordinates, address: String) -> Self {
        Self {
            lat: coordinates.lat(),
            lng: coordinates.lng(),
            address: address.trim().to_string(),
        }
    }
}

/// 接続中の参加者（学生またはドライバー）
///
/// チャンネルハンドルは持たない。ハンドルは MessagePusher だけが保持し、
/// 他のコンポーネントは `id` でのみ参加者を参照する。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Participant {
    pub id: ParticipantId,
    pub role: Role,
    pub display_name: String,
    /// ドライバーのみ意味を持つ（学生は常に false）
    pub available: bool,
    pub connected_at: Timestamp,
    pub location: Option<DriverLocation>,
}

impl Participant {
    /// 新しい参加者を作成
    ///
    /// ドライバーは接続時点で受付可能（available）になる
    pub fn new(id: ParticipantId, role: Role, display_name: String, connected_at: Timestamp) -> Self {
        Self {
            id,
            role,
            display_name,
            available: role == Role::Driver,
            connected_at,
            location: None,
        }
    }

    pub fn is_driver(&self) -> bool {
        self.role == Role::Driver
    }

    pub fn is_available_driver(&self) -> bool {
        self.is_driver() && self.available
    }
}
