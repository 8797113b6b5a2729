//! 外部データストアが管理する学生・ドライバーのプロフィール

use serde::Serialize;

/// 学生プロフィール
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Student {
    pub id: String,
    pub name: String,
    pub email: String,
    pub student_id: String,
    pub phone: String,
    pub department: String,
    pub wallet: u32,
    pub total_rides: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewStudent {
    pub name: String,
    pub email: String,
    pub student_id: String,
    pub phone: String,
    pub department: String,
}

/// ドライバー（リキシャ）プロフィール
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Driver {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub vehicle_type: String,
    pub vehicle_number: String,
    pub rating: f32,
    pub total_rides: u32,
    pub is_online: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewDriver {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub vehicle_type: String,
    pub vehicle_number: String,
}
