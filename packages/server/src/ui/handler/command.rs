//! Inbound WebSocket message handling.
//!
//! Parses a text frame into a `ClientMessage` and routes it to the matching
//! use case on behalf of the connected participant. Every failure is returned
//! to the sender as an `error` event; nothing here closes the connection.

use crate::{
    domain::{
        Caller, Coordinates, DistanceKm, DriverLocation, Fare, NotificationId, ParticipantId,
        Place, RideRequestId,
    },
    infrastructure::dto::websocket::ClientMessage,
    ui::state::AppState,
    usecase::{CoordinatorError, RideRequestCommand},
};

/// 受信したテキストフレームを処理する
pub async fn handle_client_message(state: &AppState, caller: &Caller, text: &str) {
    let message = match serde_json::from_str::<ClientMessage>(text) {
        Ok(message) => message,
        Err(e) => {
            tracing::warn!("Malformed message from '{}': {}", caller.id, e);
            state
                .dispatcher
                .reply_error(
                    &caller.id,
                    &CoordinatorError::Forbidden(format!("malformed message: {e}")),
                )
                .await;
            return;
        }
    };

    if let Err(e) = dispatch(state, caller, message).await {
        tracing::info!("Action by '{}' rejected: {} ({})", caller.id, e, e.code());
        state.dispatcher.reply_error(&caller.id, &e).await;
    }
}

async fn dispatch(
    state: &AppState,
    caller: &Caller,
    message: ClientMessage,
) -> Result<(), CoordinatorError> {
    match message {
        ClientMessage::RideRequest {
            requester_id,
            pickup,
            destination,
            fare,
            distance_km,
            driver_id,
        } => {
            ensure_same_identity(caller, requester_id.as_deref())?;
            let command = RideRequestCommand {
                pickup: Place::new(pickup)?,
                destination: Place::new(destination)?,
                fare: fare.map(Fare::new),
                distance_km: distance_km.map(DistanceKm::new).transpose()?,
                driver_id: driver_id.map(ParticipantId::new).transpose()?,
            };
            state.coordinator.request_ride(caller, command).await?;
        }
        ClientMessage::RideAccepted {
            request_id,
            driver_id,
        } => {
            ensure_same_identity(caller, driver_id.as_deref())?;
            let request_id = parse_request_id(&request_id)?;
            state.coordinator.accept_ride(caller, &request_id).await?;
        }
        ClientMessage::RideDeclined {
            request_id,
            driver_id,
        } => {
            ensure_same_identity(caller, driver_id.as_deref())?;
            let request_id = parse_request_id(&request_id)?;
            state.coordinator.decline_ride(caller, &request_id).await?;
        }
        ClientMessage::TripStarted { request_id } => {
            let request_id = parse_request_id(&request_id)?;
            state.coordinator.start_trip(caller, &request_id).await?;
        }
        ClientMessage::TripCompleted {
            request_id,
            actual_fare,
        } => {
            let request_id = parse_request_id(&request_id)?;
            state
                .coordinator
                .complete_trip(caller, &request_id, actual_fare.map(Fare::new))
                .await?;
        }
        ClientMessage::CancelRide { request_id } => {
            let request_id = parse_request_id(&request_id)?;
            state.coordinator.cancel_ride(caller, &request_id).await?;
        }
        ClientMessage::UpdateAvailability { is_available } => {
            state
                .availability_usecase
                .set_availability(caller, is_available)
                .await?;
        }
        ClientMessage::DriverLocationUpdate { lat, lng, address } => {
            state
                .availability_usecase
                .update_location(
                    caller,
                    DriverLocation::new(Coordinates::new(lat, lng)?, address),
                )
                .await?;
        }
        ClientMessage::MarkNotificationRead { notification_id } => {
            let notification_id = notification_id.parse::<NotificationId>()?;
            state
                .dispatcher
                .mark_read(&caller.id, &notification_id)
                .await?;
        }
        ClientMessage::SyncNotifications => {
            state.dispatcher.sync(&caller.id).await;
        }
    }
    Ok(())
}

/// メッセージ内の identity はハンドシェイクの identity と一致しなければならない
fn ensure_same_identity(caller: &Caller, claimed: Option<&str>) -> Result<(), CoordinatorError> {
    match claimed {
        Some(claimed) if claimed != caller.id.as_str() => Err(CoordinatorError::Forbidden(
            format!("'{claimed}' does not match the connected identity"),
        )),
        _ => Ok(()),
    }
}

fn parse_request_id(value: &str) -> Result<RideRequestId, CoordinatorError> {
    Ok(value.parse::<RideRequestId>()?)
}
