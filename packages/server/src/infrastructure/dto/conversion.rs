//! Conversion logic between DTOs and domain entities.

use crate::domain::{
    Driver, DriverLocation, FareQuote, NewDriver, NewStudent, Notification, Participant,
    ParticipantEvent, Place, RideRequest, Student,
};
use crate::infrastructure::dto::{http, websocket as dto};

// ========================================
// DTO → Domain Entity
// ========================================

impl From<http::CreateStudentRequest> for NewStudent {
    fn from(dto: http::CreateStudentRequest) -> Self {
        Self {
            name: dto.name.trim().to_string(),
            email: dto.email.trim().to_ascii_lowercase(),
            student_id: dto.student_id.trim().to_string(),
            phone: dto.phone.trim().to_string(),
            department: dto.department.trim().to_string(),
        }
    }
}

impl From<http::CreateDriverRequest> for NewDriver {
    fn from(dto: http::CreateDriverRequest) -> Self {
        Self {
            name: dto.name.trim().to_string(),
            email: dto.email.trim().to_ascii_lowercase(),
            phone: dto.phone.trim().to_string(),
            vehicle_type: dto.vehicle_type.trim().to_string(),
            vehicle_number: dto.vehicle_number.trim().to_string(),
        }
    }
}

// ========================================
// Domain Entity → DTO
// ========================================

impl From<Notification> for dto::NotificationDto {
    fn from(model: Notification) -> Self {
        Self {
            id: model.id.to_string(),
            kind: model.kind.as_str().to_string(),
            request_id: model.ride_request_id.map(|id| id.to_string()),
            title: model.title,
            message: model.message,
            read: model.read,
            timestamp: model.created_at.value(),
        }
    }
}

impl From<ParticipantEvent> for dto::ServerMessage {
    fn from(event: ParticipantEvent) -> Self {
        match event {
            ParticipantEvent::Registered {
                participant_id,
                role,
                display_name,
                unread_count,
            } => Self::RegistrationSuccess {
                participant_id: participant_id.into_string(),
                role: role.as_str().to_string(),
                display_name,
                unread_count,
            },
            ParticipantEvent::RideRequestCreated {
                request_id,
                pickup,
                destination,
                fare,
                distance_km,
                candidate_count,
                expires_at,
            } => Self::RideRequestCreated {
                request_id: request_id.to_string(),
                pickup: pickup.into_string(),
                destination: destination.into_string(),
                fare: fare.value(),
                distance_km,
                candidate_count,
                expires_at: expires_at.value(),
            },
            ParticipantEvent::RideOffered {
                request_id,
                student_name,
                pickup,
                destination,
                estimated_fare,
                distance_km,
                created_at,
                expires_at,
            } => Self::RideRequestNotification {
                request_id: request_id.to_string(),
                student_name,
                pickup: pickup.into_string(),
                destination: destination.into_string(),
                estimated_fare: estimated_fare.value(),
                distance_km,
                timestamp: created_at.value(),
                expires_at: expires_at.value(),
            },
            ParticipantEvent::OfferWithdrawn { request_id, reason } => {
                Self::RideRequestWithdrawn {
                    request_id: request_id.to_string(),
                    reason: reason.as_str().to_string(),
                }
            }
            ParticipantEvent::RideAccepted {
                request_id,
                driver_id,
                driver_name,
            } => Self::RideAccepted {
                request_id: request_id.to_string(),
                driver_id: driver_id.into_string(),
                driver_name,
            },
            ParticipantEvent::AcceptanceConfirmed {
                request_id,
                student_name,
                pickup,
                destination,
            } => Self::RideAcceptanceConfirmed {
                request_id: request_id.to_string(),
                student_name,
                pickup: pickup.into_string(),
                destination: destination.into_string(),
            },
            ParticipantEvent::DeclineConfirmed { request_id } => Self::RideDeclineConfirmed {
                request_id: request_id.to_string(),
            },
            ParticipantEvent::RideDeclined { request_id } => Self::RideDeclined {
                request_id: request_id.to_string(),
            },
            ParticipantEvent::RideExpired { request_id } => Self::RideExpired {
                request_id: request_id.to_string(),
            },
            ParticipantEvent::RideCancelled { request_id, reason } => Self::RideCancelled {
                request_id: request_id.to_string(),
                reason: reason.as_str().to_string(),
            },
            ParticipantEvent::CancelConfirmed { request_id } => Self::RideCancelConfirmed {
                request_id: request_id.to_string(),
            },
            ParticipantEvent::TripStarted {
                request_id,
                driver_id,
            } => Self::TripStarted {
                request_id: request_id.to_string(),
                driver_id: driver_id.into_string(),
            },
            ParticipantEvent::TripStartConfirmed { request_id } => Self::TripStartConfirmed {
                request_id: request_id.to_string(),
            },
            ParticipantEvent::TripCompleted {
                request_id,
                actual_fare,
            } => Self::TripCompleted {
                request_id: request_id.to_string(),
                actual_fare: actual_fare.value(),
            },
            ParticipantEvent::TripCompletionConfirmed {
                request_id,
                earned_amount,
            } => Self::TripCompletionConfirmed {
                request_id: request_id.to_string(),
                earned_amount: earned_amount.value(),
            },
            ParticipantEvent::AvailabilityUpdated { is_available } => {
                Self::AvailabilityUpdated { is_available }
            }
            ParticipantEvent::NotificationsSynced {
                unread_count,
                notifications,
            } => Self::NotificationsSync {
                unread_count,
                notifications: notifications.into_iter().map(Into::into).collect(),
            },
            ParticipantEvent::NotificationRead {
                notification_id,
                unread_count,
            } => Self::NotificationRead {
                notification_id: notification_id.to_string(),
                unread_count,
            },
            ParticipantEvent::Error { code, message } => Self::Error {
                code: code.to_string(),
                message,
            },
        }
    }
}

impl From<RideRequest> for http::RideRequestDto {
    fn from(model: RideRequest) -> Self {
        let mode = match model.mode {
            crate::domain::DispatchMode::Broadcast => "broadcast",
            crate::domain::DispatchMode::Targeted => "targeted",
        };
        Self {
            id: model.id.to_string(),
            requester_id: model.requester.into_string(),
            requester_name: model.requester_name,
            mode: mode.to_string(),
            candidates: model
                .candidates
                .into_iter()
                .map(|id| id.into_string())
                .collect(),
            declined_by: model
                .declined_by
                .into_iter()
                .map(|id| id.into_string())
                .collect(),
            driver_id: model.driver.map(|id| id.into_string()),
            pickup: model.pickup.into_string(),
            destination: model.destination.into_string(),
            fare: model.quoted_fare.value(),
            distance_km: model.distance_km,
            final_fare: model.final_fare.map(|f| f.value()),
            status: model.status.as_str().to_string(),
            created_at: model.created_at.value(),
            updated_at: model.updated_at.value(),
            started_at: model.started_at.map(|t| t.value()),
            expires_at: model.expires_at.value(),
        }
    }
}

impl From<DriverLocation> for http::LocationDto {
    fn from(model: DriverLocation) -> Self {
        Self {
            lat: model.lat,
            lng: model.lng,
            address: model.address,
        }
    }
}

impl From<Participant> for http::AvailableDriverDto {
    fn from(model: Participant) -> Self {
        Self {
            participant_id: model.id.into_string(),
            display_name: model.display_name,
            connected_at: model.connected_at.value(),
            location: model.location.map(Into::into),
        }
    }
}

impl From<Student> for http::StudentDto {
    fn from(model: Student) -> Self {
        Self {
            id: model.id,
            name: model.name,
            email: model.email,
            student_id: model.student_id,
            phone: model.phone,
            department: model.department,
            wallet: model.wallet,
            total_rides: model.total_rides,
        }
    }
}

impl From<Driver> for http::DriverDto {
    fn from(model: Driver) -> Self {
        Self {
            id: model.id,
            name: model.name,
            email: model.email,
            phone: model.phone,
            vehicle_type: model.vehicle_type,
            vehicle_number: model.vehicle_number,
            rating: model.rating,
            total_rides: model.total_rides,
            is_online: model.is_online,
        }
    }
}

/// 見積もりと区間から HTTP レスポンスを組み立てる
pub fn fare_quote_response(
    pickup: &Place,
    destination: &Place,
    quote: FareQuote,
) -> http::FareQuoteResponse {
    http::FareQuoteResponse {
        pickup: pickup.to_string(),
        destination: destination.to_string(),
        fare: quote.fare.value(),
        distance_km: quote.distance_km,
    }
}
