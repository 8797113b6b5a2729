//! Message formatting utilities for client display.

use rickshaw_server::infrastructure::dto::websocket::{NotificationDto, ServerMessage};
use rickshaw_shared::time::timestamp_to_jst_rfc3339;

const RULE: &str = "------------------------------------------------------------";

/// Message formatter for client display
pub struct MessageFormatter;

impl MessageFormatter {
    /// Format an event pushed by the coordinator
    pub fn format_server_message(message: &ServerMessage) -> String {
        match message {
            ServerMessage::RegistrationSuccess {
                participant_id,
                role,
                display_name,
                unread_count,
            } => format!(
                "\nRegistered as {} ({}, {}). {} unread notification(s)\n",
                participant_id, display_name, role, unread_count
            ),
            ServerMessage::RideRequestCreated {
                request_id,
                pickup,
                destination,
                fare,
                distance_km,
                candidate_count,
                expires_at,
            } => format!(
                "\nRide requested: {} -> {} (৳{}, {:.1} km)\n\
                 id: {}\n\
                 offered to {} driver(s), expires at {}\n",
                pickup,
                destination,
                fare,
                distance_km,
                request_id,
                candidate_count,
                timestamp_to_jst_rfc3339(*expires_at)
            ),
            ServerMessage::RideRequestNotification {
                request_id,
                student_name,
                pickup,
                destination,
                estimated_fare,
                distance_km,
                expires_at,
                ..
            } => format!(
                "\n\n{RULE}\n\
                 New ride request from {}\n\
                 {} -> {} (৳{}, {:.1} km)\n\
                 id: {}\n\
                 respond before {}\n\
                 {RULE}\n",
                student_name,
                pickup,
                destination,
                estimated_fare,
                distance_km,
                request_id,
                timestamp_to_jst_rfc3339(*expires_at)
            ),
            ServerMessage::RideRequestWithdrawn { request_id, reason } => {
                format!("\nOffer {} withdrawn ({})\n", request_id, reason)
            }
            ServerMessage::RideAccepted {
                request_id,
                driver_id,
                driver_name,
            } => format!(
                "\n{} ({}) accepted your ride {}\n",
                driver_name, driver_id, request_id
            ),
            ServerMessage::RideAcceptanceConfirmed {
                request_id,
                student_name,
                pickup,
                destination,
            } => format!(
                "\nYou accepted ride {}: pick up {} at {} -> {}\n",
                request_id, student_name, pickup, destination
            ),
            ServerMessage::RideDeclineConfirmed { request_id } => {
                format!("\nDeclined ride {}\n", request_id)
            }
            ServerMessage::RideDeclined { request_id } => {
                format!("\nRide {} was declined by every driver\n", request_id)
            }
            ServerMessage::RideExpired { request_id } => {
                format!("\nRide {} expired without a driver\n", request_id)
            }
            ServerMessage::RideCancelled { request_id, reason } => {
                format!("\nRide {} cancelled ({})\n", request_id, reason)
            }
            ServerMessage::RideCancelConfirmed { request_id } => {
                format!("\nCancelled ride {}\n", request_id)
            }
            ServerMessage::TripStarted {
                request_id,
                driver_id,
            } => format!("\nTrip {} started by {}\n", request_id, driver_id),
            ServerMessage::TripStartConfirmed { request_id } => {
                format!("\nTrip {} started\n", request_id)
            }
            ServerMessage::TripCompleted {
                request_id,
                actual_fare,
            } => format!(
                "\nTrip {} completed. Fare: ৳{}\n",
                request_id, actual_fare
            ),
            ServerMessage::TripCompletionConfirmed {
                request_id,
                earned_amount,
            } => format!(
                "\nTrip {} completed. You earned ৳{}\n",
                request_id, earned_amount
            ),
            ServerMessage::AvailabilityUpdated { is_available } => {
                let state = if *is_available { "available" } else { "unavailable" };
                format!("\nYou are now {}\n", state)
            }
            ServerMessage::NotificationsSync {
                unread_count,
                notifications,
            } => Self::format_notification_log(*unread_count, notifications),
            ServerMessage::NotificationRead {
                notification_id,
                unread_count,
            } => format!(
                "\nMarked {} as read. {} unread\n",
                notification_id, unread_count
            ),
            ServerMessage::Error { code, message } => format!("\n! {}: {}\n", code, message),
        }
    }

    /// Format the notification log returned by `sync`
    pub fn format_notification_log(unread_count: usize, notifications: &[NotificationDto]) -> String {
        let mut output = String::new();
        output.push_str(&format!("\n{RULE}\n"));
        output.push_str(&format!("Notifications ({} unread):\n", unread_count));

        if notifications.is_empty() {
            output.push_str("(No notifications)\n");
        } else {
            for notification in notifications {
                let marker = if notification.read { " " } else { "*" };
                output.push_str(&format!(
                    "{} [{}] {}: {} ({})\n    id: {}\n",
                    marker,
                    timestamp_to_jst_rfc3339(notification.timestamp),
                    notification.title,
                    notification.message,
                    notification.kind,
                    notification.id
                ));
            }
        }

        output.push_str(&format!("{RULE}\n"));
        output
    }

    /// Format a raw text message (when parsing fails)
    pub fn format_raw_message(text: &str) -> String {
        format!("\n← Received: {}\n", text)
    }
}
