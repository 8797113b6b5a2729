//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{
    domain::{ParticipantId, Place, RideRequestId},
    infrastructure::dto::{
        conversion::fare_quote_response,
        http::{
            AvailableDriverDto, CreateDriverRequest, CreateStudentRequest, DriverDto,
            DriverStatusRequest, ErrorResponse, FareQuery, FareQuoteResponse, HealthResponse,
            NotificationsResponse, RideRequestDto, StudentDto,
        },
    },
    ui::state::AppState,
    usecase::CoordinatorError,
};
use rickshaw_shared::time::{get_jst_timestamp, timestamp_to_jst_rfc3339};

/// HTTP エラーレスポンス
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorResponse,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            body: ErrorResponse {
                code: "BAD_REQUEST".to_string(),
                message: message.into(),
            },
        }
    }
}

impl From<CoordinatorError> for ApiError {
    fn from(error: CoordinatorError) -> Self {
        let status = match error {
            CoordinatorError::NotFound(_) => StatusCode::NOT_FOUND,
            CoordinatorError::Forbidden(_) => StatusCode::FORBIDDEN,
            CoordinatorError::Conflict(_)
            | CoordinatorError::DuplicateConnection(_)
            | CoordinatorError::StaleState(_)
            | CoordinatorError::AlreadyFinalized(_) => StatusCode::CONFLICT,
        };
        Self {
            status,
            body: ErrorResponse {
                code: error.code().to_string(),
                message: error.to_string(),
            },
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// 必須項目が空でないことを確認する
fn require_fields(fields: &[(&str, &str)]) -> Result<(), ApiError> {
    let missing: Vec<&str> = fields
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| *name)
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(ApiError::bad_request(format!(
            "missing required fields: {}",
            missing.join(", ")
        )))
    }
}

/// Health check endpoint
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        connected_participants: state.participants.count_connected().await,
        timestamp: timestamp_to_jst_rfc3339(get_jst_timestamp()),
    })
}

/// Get the current state of a ride request
pub async fn get_ride(
    State(state): State<Arc<AppState>>,
    Path(request_id): Path<String>,
) -> Result<Json<RideRequestDto>, ApiError> {
    let request_id = request_id
        .parse::<RideRequestId>()
        .map_err(|e| ApiError::bad_request(e.to_string()))?;
    let ride = state.coordinator.get_ride(&request_id).await?;
    Ok(Json(ride.into()))
}

/// List drivers currently accepting offers
pub async fn list_available_drivers(
    State(state): State<Arc<AppState>>,
) -> Json<Vec<AvailableDriverDto>> {
    let drivers = state.availability_usecase.list_available_drivers().await;
    Json(drivers.into_iter().map(Into::into).collect())
}

/// Estimate the fare between two places
pub async fn get_fare(
    State(state): State<Arc<AppState>>,
    Query(query): Query<FareQuery>,
) -> Result<Json<FareQuoteResponse>, ApiError> {
    let pickup = Place::new(query.pickup).map_err(|e| ApiError::bad_request(e.to_string()))?;
    let destination =
        Place::new(query.destination).map_err(|e| ApiError::bad_request(e.to_string()))?;
    let quote = state.coordinator.estimate_fare(&pickup, &destination).await;
    Ok(Json(fare_quote_response(&pickup, &destination, quote)))
}

/// Polling fallback: the participant's notification log and unread count
pub async fn get_notifications(
    State(state): State<Arc<AppState>>,
    Path(participant_id): Path<String>,
) -> Result<Json<NotificationsResponse>, ApiError> {
    let participant_id =
        ParticipantId::new(participant_id).map_err(|e| ApiError::bad_request(e.to_string()))?;
    let notifications = state.dispatcher.list(&participant_id).await;
    let unread_count = notifications.iter().filter(|n| !n.read).count();
    Ok(Json(NotificationsResponse {
        participant_id: participant_id.into_string(),
        unread_count,
        notifications: notifications.into_iter().map(Into::into).collect(),
    }))
}

pub async fn create_student(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateStudentRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<StudentDto>), ApiError> {
    let Json(request) = payload?;
    require_fields(&[
        ("name", &request.name),
        ("email", &request.email),
        ("student_id", &request.student_id),
    ])?;
    let student = state.profile_usecase.register_student(request.into()).await?;
    Ok((StatusCode::CREATED, Json(student.into())))
}

pub async fn list_students(State(state): State<Arc<AppState>>) -> Json<Vec<StudentDto>> {
    let students = state.profile_usecase.list_students().await;
    Json(students.into_iter().map(Into::into).collect())
}

pub async fn get_student(
    State(state): State<Arc<AppState>>,
    Path(student_id): Path<String>,
) -> Result<Json<StudentDto>, ApiError> {
    let student = state.profile_usecase.find_student(&student_id).await?;
    Ok(Json(student.into()))
}

pub async fn get_student_by_email(
    State(state): State<Arc<AppState>>,
    Path(email): Path<String>,
) -> Result<Json<StudentDto>, ApiError> {
    let student = state.profile_usecase.find_student_by_email(&email).await?;
    Ok(Json(student.into()))
}

pub async fn create_driver(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateDriverRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<DriverDto>), ApiError> {
    let Json(request) = payload?;
    require_fields(&[
        ("name", &request.name),
        ("email", &request.email),
        ("phone", &request.phone),
        ("vehicle_number", &request.vehicle_number),
    ])?;
    let driver = state.profile_usecase.register_driver(request.into()).await?;
    Ok((StatusCode::CREATED, Json(driver.into())))
}

pub async fn list_drivers(State(state): State<Arc<AppState>>) -> Json<Vec<DriverDto>> {
    let drivers = state.profile_usecase.list_drivers().await;
    Json(drivers.into_iter().map(Into::into).collect())
}

pub async fn get_driver(
    State(state): State<Arc<AppState>>,
    Path(driver_id): Path<String>,
) -> Result<Json<DriverDto>, ApiError> {
    let driver = state.profile_usecase.find_driver(&driver_id).await?;
    Ok(Json(driver.into()))
}

pub async fn get_driver_by_phone(
    State(state): State<Arc<AppState>>,
    Path(phone): Path<String>,
) -> Result<Json<DriverDto>, ApiError> {
    let driver = state.profile_usecase.find_driver_by_phone(&phone).await?;
    Ok(Json(driver.into()))
}

pub async fn update_driver_status(
    State(state): State<Arc<AppState>>,
    Path(driver_id): Path<String>,
    payload: Result<Json<DriverStatusRequest>, JsonRejection>,
) -> Result<Json<DriverDto>, ApiError> {
    let Json(request) = payload?;
    let driver = state
        .profile_usecase
        .set_driver_status(&driver_id, request.is_online)
        .await?;
    Ok(Json(driver.into()))
}
