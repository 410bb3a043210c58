//! Seat ledger endpoint handlers: booking, freeing and assigning seats.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use domain::models::passenger::{BookSeatRequest, PassengerResponse};
use domain::models::ride_request::AssignRidePassengerRequest;
use domain::services::seat_ledger;
use persistence::PgGateway;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::SuppliedCredentials;
use crate::middleware::metrics::{
    record_ride_passenger_assigned, record_seat_booked, record_seats_freed,
};

/// Book the lowest free seat of a car.
///
/// POST /api/v1/cars/:car_id/seats
pub async fn book_seat(
    State(state): State<AppState>,
    Path(car_id): Path<i64>,
    SuppliedCredentials(credentials): SuppliedCredentials,
    Json(request): Json<BookSeatRequest>,
) -> Result<(StatusCode, Json<PassengerResponse>), ApiError> {
    request.validate()?;

    let mut gateway = PgGateway::begin(&state.pool).await?;
    let passenger =
        seat_ledger::book_seat(&mut gateway, car_id, &request.passenger_name, &credentials).await?;
    gateway.commit().await?;

    record_seat_booked();
    Ok((StatusCode::CREATED, Json(passenger.into())))
}

/// Free one seat. Not PIN-gated.
///
/// DELETE /api/v1/cars/:car_id/seats/:seat_index
pub async fn free_seat(
    State(state): State<AppState>,
    Path((car_id, seat_index)): Path<(i64, i32)>,
) -> Result<StatusCode, ApiError> {
    let mut gateway = PgGateway::begin(&state.pool).await?;
    seat_ledger::free_seat(&mut gateway, car_id, seat_index).await?;
    gateway.commit().await?;

    record_seats_freed(1);
    Ok(StatusCode::NO_CONTENT)
}

/// Seat a waiting ride-request rider in a car.
///
/// POST /api/v1/ride-passengers/:id/assign
pub async fn assign_ride_passenger(
    State(state): State<AppState>,
    Path(ride_passenger_id): Path<i64>,
    SuppliedCredentials(credentials): SuppliedCredentials,
    Json(request): Json<AssignRidePassengerRequest>,
) -> Result<(StatusCode, Json<PassengerResponse>), ApiError> {
    let mut gateway = PgGateway::begin(&state.pool).await?;
    let passenger = seat_ledger::assign_ride_request_passenger(
        &mut gateway,
        ride_passenger_id,
        request.car_id,
        &credentials,
    )
    .await?;
    gateway.commit().await?;

    record_ride_passenger_assigned();
    Ok((StatusCode::CREATED, Json(passenger.into())))
}
