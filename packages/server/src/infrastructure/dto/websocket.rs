//! WebSocket message DTOs.
//!
//! Every frame is a JSON object tagged by `"type"` (snake_case).
//! `ClientMessage` is what participants send, `ServerMessage` is what the
//! coordinator pushes back. Both derive `Serialize` and `Deserialize` so the
//! CLI client can reuse them.

use serde::{Deserialize, Serialize};

/// Messages sent from a participant to the coordinator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    RideRequest {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        requester_id: Option<String>,
        pickup: String,
        destination: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        fare: Option<u32>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        distance_km: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        driver_id: Option<String>,
    },
    RideAccepted {
        request_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        driver_id: Option<String>,
    },
    RideDeclined {
        request_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        driver_id: Option<String>,
    },
    TripStarted {
        request_id: String,
    },
    TripCompleted {
        request_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        actual_fare: Option<u32>,
    },
    CancelRide {
        request_id: String,
    },
    UpdateAvailability {
        is_available: bool,
    },
    DriverLocationUpdate {
        lat: f64,
        lng: f64,
        address: String,
    },
    MarkNotificationRead {
        notification_id: String,
    },
    SyncNotifications,
}

/// A logged notification as it appears on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationDto {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    pub title: String,
    pub message: String,
    pub read: bool,
    pub timestamp: i64,
}

/// Messages pushed from the coordinator to a participant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    RegistrationSuccess {
        participant_id: String,
        role: String,
        display_name: String,
        unread_count: usize,
    },
    RideRequestCreated {
        request_id: String,
        pickup: String,
        destination: String,
        fare: u32,
        distance_km: f64,
        candidate_count: usize,
        expires_at: i64,
    },
    RideRequestNotification {
        request_id: String,
        student_name: String,
        pickup: String,
        destination: String,
        estimated_fare: u32,
        distance_km: f64,
        timestamp: i64,
        expires_at: i64,
    },
    RideRequestWithdrawn {
        request_id: String,
        reason: String,
    },
    RideAccepted {
        request_id: String,
        driver_id: String,
        driver_name: String,
    },
    RideAcceptanceConfirmed {
        request_id: String,
        student_name: String,
        pickup: String,
        destination: String,
    },
    RideDeclineConfirmed {
        request_id: String,
    },
    RideDeclined {
        request_id: String,
    },
    RideExpired {
        request_id: String,
    },
    RideCancelled {
        request_id: String,
        reason: String,
    },
    RideCancelConfirmed {
        request_id: String,
    },
    TripStarted {
        request_id: String,
        driver_id: String,
    },
    TripStartConfirmed {
        request_id: String,
    },
    TripCompleted {
        request_id: String,
        actual_fare: u32,
    },
    TripCompletionConfirmed {
        request_id: String,
        earned_amount: u32,
    },
    AvailabilityUpdated {
        is_available: bool,
    },
    NotificationsSync {
        unread_count: usize,
        notifications: Vec<NotificationDto>,
    },
    NotificationRead {
        notification_id: String,
        unread_count: usize,
    },
    Error {
        code: String,
        message: String,
    },
}
