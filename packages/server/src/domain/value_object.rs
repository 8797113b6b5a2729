//! Value Object 定義
//!
//! 生成時にバリデーションを行い、不正な値を持つインスタンスが存在しないことを保証します。

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::ValueObjectError;

const PARTICIPANT_ID_MAX_LEN: usize = 64;
const PLACE_MAX_LEN: usize = 100;

/// 参加者 ID（外部の認証基盤が発行する不透明な識別子）
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ParticipantId(String);

impl ParticipantId {
    /// 新しい ParticipantId を作成
    ///
    /// 空文字列・空白を含む値・64 文字を超える値はエラー
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        if value.trim().is_empty() {
            return Err(ValueObjectError::Empty("participant_id"));
        }
        if value.chars().any(char::is_whitespace) {
            return Err(ValueObjectError::Invalid {
                field: "participant_id",
                value,
            });
        }
        if value.chars().count() > PARTICIPANT_ID_MAX_LEN {
            return Err(ValueObjectError::TooLong {
                field: "participant_id",
                max: PARTICIPANT_ID_MAX_LEN,
            });
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for ParticipantId {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 参加者のロール
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Student,
    Driver,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Driver => "driver",
        }
    }
}

impl FromStr for Role {
    type Err = ValueObjectError;

    /// "rickshaw" は既存クライアントが使っていたドライバーの別名
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "student" => Ok(Role::Student),
            "driver" | "rickshaw" => Ok(Role::Driver),
            _ => Err(ValueObjectError::Invalid {
                field: "role",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 操作を行う参加者（ハンドシェイク時に確定した identity と role の組）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub id: ParticipantId,
    pub role: Role,
}

impl Caller {
    pub fn new(id: ParticipantId, role: Role) -> Self {
        Self { id, role }
    }

    pub fn student(id: ParticipantId) -> Self {
        Self::new(id, Role::Student)
    }

    pub fn driver(id: ParticipantId) -> Self {
        Self::new(id, Role::Driver)
    }
}

/// 配車リクエスト ID（UUID v4）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RideRequestId(Uuid);

impl RideRequestId {
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl FromStr for RideRequestId {
    type Err = ValueObjectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|_| ValueObjectError::Invalid {
                field: "request_id",
                value: s.to_string(),
            })
    }
}

impl fmt::Display for RideRequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// RideRequestId の生成器
pub struct RideRequestIdFactory;

impl RideRequestIdFactory {
    pub fn generate() -> RideRequestId {
        RideRequestId(Uuid::new_v4())
    }
}

/// 通知 ID（UUID v4）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NotificationId(Uuid);

impl FromStr for NotificationId {
    type Err = ValueObjectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|_| ValueObjectError::Invalid {
                field: "notification_id",
                value: s.to_string(),
            })
    }
}

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub struct NotificationIdFactory;

impl NotificationIdFactory {
    pub fn generate() -> NotificationId {
        NotificationId(Uuid::new_v4())
    }
}

/// 乗車地・目的地の名称（例: "Main Gate", "Library"）
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Place(String);

impl Place {
    /// 前後の空白は取り除かれる
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValueObjectError::Empty("place"));
        }
        if trimmed.chars().count() > PLACE_MAX_LEN {
            return Err(ValueObjectError::TooLong {
                field: "place",
                max: PLACE_MAX_LEN,
            });
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 運賃表の照合に使う正規化キー
    pub fn normalized(&self) -> String {
        self.0.to_ascii_lowercase()
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for Place {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for Place {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 運賃（taka, 整数）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Fare(u32);

impl Fare {
    pub fn new(value: u32) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for Fare {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "৳{}", self.0)
    }
}

/// 乗車距離（km）。有限かつ 0 以上
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
pub struct DistanceKm(f64);

impl DistanceKm {
    pub fn new(value: f64) -> Result<Self, ValueObjectError> {
        if !value.is_finite() || value < 0.0 {
            return Err(ValueObjectError::Invalid {
                field: "distance_km",
                value: value.to_string(),
            });
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

/// 緯度・経度（度）
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinates {
    lat: f64,
    lng: f64,
}

impl Coordinates {
    /// 緯度は -90〜90、経度は -180〜180
    pub fn new(lat: f64, lng: f64) -> Result<Self, ValueObjectError> {
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(ValueObjectError::Invalid {
                field: "lat",
                value: lat.to_string(),
            });
        }
        if !lng.is_finite() || !(-180.0..=180.0).contains(&lng) {
            return Err(ValueObjectError::Invalid {
                field: "lng",
                value: lng.to_string(),
            });
        }
        Ok(Self { lat, lng })
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    pub fn lng(&self) -> f64 {
        self.lng
    }
}

/// Unix タイムスタンプ（JST, ミリ秒）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }

    /// `millis` ミリ秒後のタイムスタンプ
    pub fn plus_millis(&self, millis: i64) -> Self {
        Self(self.0.saturating_add(millis))
    }

    pub fn minus_millis(&self, millis: i64) -> Self {
        Self(self.0.saturating_sub(millis))
    }
}
