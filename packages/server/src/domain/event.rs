//! 参加者に届けるイベント
//!
//! UseCase 層はこのイベントを生成し、MessagePusher がワイヤ形式（JSON）に変換して送信します。
//! 通知ログに残すイベントは `summary` でタイトルと本文を持ちます。

use crate::domain::{
    entity::Notification,
    value_object::{Fare, NotificationId, ParticipantId, Place, RideRequestId, Role, Timestamp},
};

/// オファーが取り下げられた理由
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WithdrawReason {
    AcceptedByAnotherDriver,
    Expired,
    CancelledByRequester,
}

impl WithdrawReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            WithdrawReason::AcceptedByAnotherDriver => "accepted_by_another_driver",
            WithdrawReason::Expired => "expired",
            WithdrawReason::CancelledByRequester => "cancelled_by_requester",
        }
    }
}

/// 配車がキャンセルされた理由
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    RequesterCancelled,
    RequesterDisconnected,
    DriverDisconnected,
}

impl CancelReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            CancelReason::RequesterCancelled => "requester_cancelled",
            CancelReason::RequesterDisconnected => "requester_disconnected",
            CancelReason::DriverDisconnected => "driver_disconnected",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParticipantEvent {
    Registered {
        participant_id: ParticipantId,
        role: Role,
        display_name: String,
        unread_count: usize,
    },
    RideRequestCreated {
        request_id: RideRequestId,
        pickup: Place,
        destination: Place,
        fare: Fare,
        distance_km: f64,
        candidate_count: usize,
        expires_at: Timestamp,
    },
    RideOffered {
        request_id: RideRequestId,
        student_name: String,
        pickup: Place,
        destination: Place,
        estimated_fare: Fare,
        distance_km: f64,
        created_at: Timestamp,
        expires_at: Timestamp,
    },
    OfferWithdrawn {
        request_id: RideRequestId,
        reason: WithdrawReason,
    },
    RideAccepted {
        request_id: RideRequestId,
        driver_id: ParticipantId,
        driver_name: String,
    },
    AcceptanceConfirmed {
        request_id: RideRequestId,
        student_name: String,
        pickup: Place,
        destination: Place,
    },
    DeclineConfirmed {
        request_id: RideRequestId,
    },
    RideDeclined {
        request_id: RideRequestId,
    },
    RideExpired {
        request_id: RideRequestId,
    },
    RideCancelled {
        request_id: RideRequestId,
        reason: CancelReason,
    },
    CancelConfirmed {
        request_id: RideRequestId,
    },
    TripStarted {
        request_id: RideRequestId,
        driver_id: ParticipantId,
    },
    TripStartConfirmed {
        request_id: RideRequestId,
    },
    TripCompleted {
        request_id: RideRequestId,
        actual_fare: Fare,
    },
    TripCompletionConfirmed {
        request_id: RideRequestId,
        earned_amount: Fare,
    },
    AvailabilityUpdated {
        is_available: bool,
    },
    NotificationsSynced {
        unread_count: usize,
        notifications: Vec<Notification>,
    },
    NotificationRead {
        notification_id: NotificationId,
        unread_count: usize,
    },
    Error {
        code: &'static str,
        message: String,
    },
}

impl ParticipantEvent {
    /// 関連する配車リクエスト
    pub fn ride_request_id(&self) -> Option<RideRequestId> {
        match self {
            ParticipantEvent::RideRequestCreated { request_id, .. }
            | ParticipantEvent::RideOffered { request_id, .. }
            | ParticipantEvent::OfferWithdrawn { request_id, .. }
            | ParticipantEvent::RideAccepted { request_id, .. }
            | ParticipantEvent::AcceptanceConfirmed { request_id, .. }
            | ParticipantEvent::DeclineConfirmed { request_id }
            | ParticipantEvent::RideDeclined { request_id }
            | ParticipantEvent::RideExpired { request_id }
            | ParticipantEvent::RideCancelled { request_id, .. }
            | ParticipantEvent::CancelConfirmed { request_id }
            | ParticipantEvent::TripStarted { request_id, .. }
            | ParticipantEvent::TripStartConfirmed { request_id }
            | ParticipantEvent::TripCompleted { request_id, .. }
            | ParticipantEvent::TripCompletionConfirmed { request_id, .. } => Some(*request_id),
            _ => None,
        }
    }

    /// 通知ログ用のタイトルと本文
    pub fn summary(&self) -> (String, String) {
        match self {
            ParticipantEvent::RideOffered {
                student_name,
                pickup,
                destination,
                estimated_fare,
                ..
            } => (
                "New Ride Request".to_string(),
                format!(
                    "{student_name} wants a ride from {pickup} to {destination} ({estimated_fare})"
                ),
            ),
            ParticipantEvent::OfferWithdrawn { reason, .. } => (
                "Ride Request Withdrawn".to_string(),
                match reason {
                    WithdrawReason::AcceptedByAnotherDriver => {
                        "Another driver accepted this ride.".to_string()
                    }
                    WithdrawReason::Expired => "The ride request expired.".to_string(),
                    WithdrawReason::CancelledByRequester => {
                        "The student cancelled this ride request.".to_string()
                    }
                },
            ),
            ParticipantEvent::RideAccepted { driver_name, .. } => (
                "Ride Accepted!".to_string(),
                format!("Your ride request has been accepted by {driver_name}. They're on the way!"),
            ),
            ParticipantEvent::RideDeclined { .. } => (
                "Ride Declined".to_string(),
                "Your ride request was declined. Please try another driver.".to_string(),
            ),
            ParticipantEvent::RideExpired { .. } => (
                "Ride Request Expired".to_string(),
                "No driver responded in time. Please try again.".to_string(),
            ),
            ParticipantEvent::RideCancelled { reason, .. } => (
                "Ride Cancelled".to_string(),
                match reason {
                    CancelReason::RequesterCancelled => {
                        "The student cancelled the ride.".to_string()
                    }
                    CancelReason::RequesterDisconnected => {
                        "The ride was cancelled because the student went offline.".to_string()
                    }
                    CancelReason::DriverDisconnected => {
                        "The ride was cancelled because the driver went offline.".to_string()
                    }
                },
            ),
            ParticipantEvent::TripStarted { .. } => (
                "Trip Started".to_string(),
                "Your driver has started the trip.".to_string(),
            ),
            ParticipantEvent::TripCompleted { actual_fare, .. } => (
                "Trip Completed".to_string(),
                format!("You have arrived. Final fare: {actual_fare}"),
            ),
            ParticipantEvent::Error { code, message } => (code.to_string(), message.clone()),
            other => (other.name().to_string(), String::new()),
        }
    }

    /// ワイヤ上の `type` と同じ名前
    pub fn name(&self) -> &'static str {
        match self {
            ParticipantEvent::Registered { .. } => "registration_success",
            ParticipantEvent::RideRequestCreated { .. } => "ride_request_created",
            ParticipantEvent::RideOffered { .. } => "ride_request_notification",
            ParticipantEvent::OfferWithdrawn { .. } => "ride_request_withdrawn",
            ParticipantEvent::RideAccepted { .. } => "ride_accepted",
            ParticipantEvent::AcceptanceConfirmed { .. } => "ride_acceptance_confirmed",
            ParticipantEvent::DeclineConfirmed { .. } => "ride_decline_confirmed",
            ParticipantEvent::RideDeclined { .. } => "ride_declined",
            ParticipantEvent::RideExpired { .. } => "ride_expired",
            ParticipantEvent::RideCancelled { .. } => "ride_cancelled",
            ParticipantEvent::CancelConfirmed { .. } => "ride_cancel_confirmed",
            ParticipantEvent::TripStarted { .. } => "trip_started",
            ParticipantEvent::TripStartConfirmed { .. } => "trip_start_confirmed",
            ParticipantEvent::TripCompleted { .. } => "trip_completed",
            ParticipantEvent::TripCompletionConfirmed { .. } => "trip_completion_confirmed",
            ParticipantEvent::AvailabilityUpdated { .. } => "availability_updated",
            ParticipantEvent::NotificationsSynced { .. } => "notifications_sync",
            ParticipantEvent::NotificationRead { .. } => "notification_read",
            ParticipantEvent::Error { .. } => "error",
        }
    }
}
