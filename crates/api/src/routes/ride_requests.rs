//! Ride request endpoint handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use domain::models::ride_request::{
    CreateRideRequestRequest, ListRideRequestsResponse, RideRequestResponse,
};
use domain::services::{ride_requests, seat_ledger};
use persistence::PgGateway;
use serde::Serialize;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::metrics::record_seats_freed;

/// Response after removing a ride request.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveRideRequestResponse {
    pub seats_released: i32,
}

/// GET /api/v1/events/:event_id/ride-requests
pub async fn list_ride_requests(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
) -> Result<Json<ListRideRequestsResponse>, ApiError> {
    let mut gateway = PgGateway::begin(&state.pool).await?;
    let requests = ride_requests::list_ride_requests(&mut gateway, &event_id).await?;
    gateway.commit().await?;

    let ride_requests: Vec<RideRequestResponse> = requests.into_iter().map(Into::into).collect();
    Ok(Json(ListRideRequestsResponse {
        total: ride_requests.len(),
        ride_requests,
    }))
}

/// POST /api/v1/events/:event_id/ride-requests
pub async fn create_ride_request(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
    Json(request): Json<CreateRideRequestRequest>,
) -> Result<(StatusCode, Json<RideRequestResponse>), ApiError> {
    let mut gateway = PgGateway::begin(&state.pool).await?;
    let created = ride_requests::create_ride_request(&mut gateway, &event_id, request).await?;
    gateway.commit().await?;

    Ok((StatusCode::CREATED, Json(created.into())))
}

/// Remove a ride request, releasing every seat its riders hold.
///
/// DELETE /api/v1/ride-requests/:request_id
pub async fn remove_ride_request(
    State(state): State<AppState>,
    Path(request_id): Path<i64>,
) -> Result<Json<RemoveRideRequestResponse>, ApiError> {
    let mut gateway = PgGateway::begin(&state.pool).await?;
    let released = seat_ledger::remove_ride_request(&mut gateway, request_id).await?;
    gateway.commit().await?;

    let seats_released = released.total();
    record_seats_freed(seats_released.max(0) as u64);
    Ok(Json(RemoveRideRequestResponse { seats_released }))
}

/// Remove a single waiting rider.
///
/// DELETE /api/v1/ride-passengers/:id
pub async fn remove_ride_passenger(
    State(state): State<AppState>,
    Path(ride_passenger_id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let mut gateway = PgGateway::begin(&state.pool).await?;
    ride_requests::remove_ride_passenger(&mut gateway, ride_passenger_id).await?;
    gateway.commit().await?;

    Ok(StatusCode::NO_CONTENT)
}
