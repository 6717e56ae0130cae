//! HTTP request handlers.

use super::types::{
    CreateSessionResponse, FormatQuery, FormatResponse, HealthResponse, LoginRequest,
    SessionView, StartRegistrationResponse, UserResponse, VerifyRequest,
};
use super::AppState;
use crate::coordinator::{RegistrationForm, SessionHandle, CODE_SENT_MESSAGE};
use crate::error::ApiError;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use tracing::info;

async fn find_session(state: &AppState, id: &str) -> Result<SessionHandle, ApiError> {
    state
        .sessions
        .get(id)
        .await
        .ok_or_else(|| ApiError::SessionNotFound(id.to_string()))
}

/// Health check endpoint.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        session_count: state.sessions.count().await,
        user_count: state.store.count().await,
    })
}

/// Open a new registration session.
pub async fn create_session(
    State(state): State<AppState>,
) -> (StatusCode, Json<CreateSessionResponse>) {
    let (session_id, session) = state.sessions.create().await;
    let phase = session.lock().await.phase();

    (
        StatusCode::CREATED,
        Json(CreateSessionResponse { session_id, phase }),
    )
}

pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionView>, ApiError> {
    let session = find_session(&state, &id).await?;
    let view = SessionView::new(id, &*session.lock().await);
    Ok(Json(view))
}

/// Reset the session to its initial state.
pub async fn reset_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionView>, ApiError> {
    let session = find_session(&state, &id).await?;
    state.coordinator.reset_session(&session).await;

    let view = SessionView::new(id, &*session.lock().await);
    Ok(Json(view))
}

/// Submit the registration form and send the SMS code.
pub async fn start_registration(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(form): Json<RegistrationForm>,
) -> Result<Json<StartRegistrationResponse>, ApiError> {
    let session = find_session(&state, &id).await?;
    state.coordinator.start_registration(&session, form).await?;

    let phase = session.lock().await.phase();
    Ok(Json(StartRegistrationResponse {
        phase,
        message: CODE_SENT_MESSAGE.to_string(),
    }))
}

/// Confirm the SMS code and create the user.
pub async fn verify_registration(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<VerifyRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let session = find_session(&state, &id).await?;
    let user = state
        .coordinator
        .complete_registration(&session, &request.normalized_code())
        .await?;

    info!(session_id = %id, subject_id = %user.id, "Registration completed");
    Ok(Json(user.into()))
}

/// Retry storing the user after a persistence failure.
pub async fn retry_registration(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    let session = find_session(&state, &id).await?;
    let user = state.coordinator.retry_user_record(&session).await?;

    Ok(Json(user.into()))
}

pub async fn login(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let session = find_session(&state, &id).await?;
    let user = state
        .coordinator
        .login(&session, &request.phone_number)
        .await?;

    Ok(Json(user.into()))
}

pub async fn logout(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionView>, ApiError> {
    let session = find_session(&state, &id).await?;
    state.coordinator.sign_out(&session).await;

    let view = SessionView::new(id, &*session.lock().await);
    Ok(Json(view))
}

/// Format a phone number as typed.
pub async fn format_phone(Query(query): Query<FormatQuery>) -> Json<FormatResponse> {
    Json(FormatResponse::phone(&query.value))
}

/// Format a CPF as typed.
pub async fn format_national_id(Query(query): Query<FormatQuery>) -> Json<FormatResponse> {
    Json(FormatResponse::national_id(&query.value))
}
