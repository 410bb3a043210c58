//! Event endpoint handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Local;
use domain::models::event::{
    CreateEventRequest, EventDetailsResponse, EventResponse, ResolveEventQuery,
    ResolveEventResponse, UpdateEventRequest, VerificationResponse, VerifyPasswordRequest,
};
use domain::services::{access_gate, event_registry};
use persistence::PgGateway;
use tracing::warn;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::SuppliedCredentials;
use crate::jobs::sweep_expired_events;

/// Create an event.
///
/// POST /api/v1/events
pub async fn create_event(
    State(state): State<AppState>,
    Json(request): Json<CreateEventRequest>,
) -> Result<(StatusCode, Json<EventResponse>), ApiError> {
    let now = Local::now().naive_local();
    let mut gateway = PgGateway::begin(&state.pool).await?;
    let event = event_registry::create_event(&mut gateway, request, now).await?;
    gateway.commit().await?;

    Ok((StatusCode::CREATED, Json(event.into())))
}

/// Resolve a bare code or a shared link to an event.
///
/// GET /api/v1/events/resolve?input=<code or url>
pub async fn resolve_event(
    State(state): State<AppState>,
    Query(query): Query<ResolveEventQuery>,
) -> Result<Json<ResolveEventResponse>, ApiError> {
    let mut gateway = PgGateway::begin(&state.pool).await?;
    let event = event_registry::resolve_event_code(&mut gateway, &query.input).await?;
    gateway.commit().await?;

    Ok(Json(ResolveEventResponse {
        event_id: event.id,
        name: event.name,
    }))
}

/// Event view with cars and ride requests.
///
/// Expired events are swept first, in a separate transaction; a failed sweep
/// does not fail the view.
///
/// GET /api/v1/events/:event_id
pub async fn get_event(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
) -> Result<Json<EventDetailsResponse>, ApiError> {
    if let Err(e) = sweep_expired_events(
        &state.pool,
        state.config.maintenance.expired_event_grace_hours,
    )
    .await
    {
        warn!(error = %e, "Expired event cleanup failed");
    }

    let mut gateway = PgGateway::begin(&state.pool).await?;
    let details = event_registry::get_event_details(&mut gateway, &event_id).await?;
    gateway.commit().await?;

    Ok(Json(details.into()))
}

/// Edit an event. Protected events need `X-Event-Password`.
///
/// PATCH /api/v1/events/:event_id
pub async fn update_event(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
    SuppliedCredentials(credentials): SuppliedCredentials,
    Json(request): Json<UpdateEventRequest>,
) -> Result<Json<EventResponse>, ApiError> {
    let now = Local::now().naive_local();
    let mut gateway = PgGateway::begin(&state.pool).await?;
    let event =
        event_registry::update_event(&mut gateway, &event_id, request, &credentials, now).await?;
    gateway.commit().await?;

    Ok(Json(event.into()))
}

/// Delete an event with all its cars and ride requests.
///
/// DELETE /api/v1/events/:event_id
pub async fn delete_event(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
    SuppliedCredentials(credentials): SuppliedCredentials,
) -> Result<StatusCode, ApiError> {
    let mut gateway = PgGateway::begin(&state.pool).await?;
    event_registry::delete_event(&mut gateway, &event_id, &credentials).await?;
    gateway.commit().await?;

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/events/:event_id/verify-password
pub async fn verify_password(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
    Json(request): Json<VerifyPasswordRequest>,
) -> Result<Json<VerificationResponse>, ApiError> {
    let mut gateway = PgGateway::begin(&state.pool).await?;
    let valid = access_gate::check_event_password(&mut gateway, &event_id, &request.password).await?;
    gateway.commit().await?;

    Ok(Json(VerificationResponse { valid }))
}
