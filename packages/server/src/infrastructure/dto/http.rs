//! HTTP API DTOs.

use serde::{Deserialize, Serialize};

use super::websocket::NotificationDto;

/// `GET /api/health`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub connected_participants: usize,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationDto {
    pub lat: f64,
    pub lng: f64,
    pub address: String,
}

/// `GET /api/rides/{id}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RideRequestDto {
    pub id: String,
    pub requester_id: String,
    pub requester_name: String,
    pub mode: String,
    pub candidates: Vec<String>,
    pub declined_by: Vec<String>,
    pub driver_id: Option<String>,
    pub pickup: String,
    pub destination: String,
    pub fare: u32,
    pub distance_km: f64,
    pub final_fare: Option<u32>,
    pub status: String,
    pub created_at: i64,
    pub updated_at: i64,
    pub started_at: Option<i64>,
    pub expires_at: i64,
}

/// `GET /api/drivers/available`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvailableDriverDto {
    pub participant_id: String,
    pub display_name: String,
    pub connected_at: i64,
    pub location: Option<LocationDto>,
}

/// `GET /api/fare` query string
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FareQuery {
    pub pickup: String,
    pub destination: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FareQuoteResponse {
    pub pickup: String,
    pub destination: String,
    pub fare: u32,
    pub distance_km: f64,
}

/// `GET /api/participants/{id}/notifications`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationsResponse {
    pub participant_id: String,
    pub unread_count: usize,
    pub notifications: Vec<NotificationDto>,
}

/// `POST /api/students`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateStudentRequest {
    pub name: String,
    pub email: String,
    pub student_id: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub department: String,
}

/// `POST /api/drivers`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateDriverRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    #[serde(default = "default_vehicle_type")]
    pub vehicle_type: String,
    pub vehicle_number: String,
}

fn default_vehicle_type() -> String {
    "rickshaw".to_string()
}

/// `PATCH /api/drivers/{id}/status`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverStatusRequest {
    pub is_online: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentDto {
    pub id: String,
    pub name: String,
    pub email: String,
    pub student_id: String,
    pub phone: String,
    pub department: String,
    pub wallet: u32,
    pub total_rides: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverDto {
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

/// Body of every non-2xx response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}
