//! Car endpoint handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use domain::models::car::{CarRequest, CarResponse, ListCarsResponse, VerifyPinRequest};
use domain::models::event::VerificationResponse;
use domain::models::CarWithPassengers;
use domain::services::{access_gate, car_registry, seat_ledger};
use domain::{CarpoolError, CarpoolGateway};
use persistence::PgGateway;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::SuppliedCredentials;
use crate::middleware::metrics::record_seats_freed;

/// GET /api/v1/events/:event_id/cars
pub async fn list_cars(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
) -> Result<Json<ListCarsResponse>, ApiError> {
    let mut gateway = PgGateway::begin(&state.pool).await?;
    let cars = car_registry::list_cars(&mut gateway, &event_id).await?;
    gateway.commit().await?;

    let cars: Vec<CarResponse> = cars.into_iter().map(Into::into).collect();
    Ok(Json(ListCarsResponse {
        total: cars.len(),
        cars,
    }))
}

/// Register a car for an event.
///
/// POST /api/v1/events/:event_id/cars
pub async fn register_car(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
    Json(request): Json<CarRequest>,
) -> Result<(StatusCode, Json<CarResponse>), ApiError> {
    let mut gateway = PgGateway::begin(&state.pool).await?;
    let car = car_registry::register_car(&mut gateway, &event_id, request).await?;
    gateway.commit().await?;

    let car = CarWithPassengers {
        car,
        passengers: Vec::new(),
    };
    Ok((StatusCode::CREATED, Json(car.into())))
}

/// Edit a car. Protected cars need `X-Car-Pin` with the current PIN.
///
/// PUT /api/v1/cars/:car_id
pub async fn edit_car(
    State(state): State<AppState>,
    Path(car_id): Path<i64>,
    SuppliedCredentials(credentials): SuppliedCredentials,
    Json(request): Json<CarRequest>,
) -> Result<Json<CarResponse>, ApiError> {
    let mut gateway = PgGateway::begin(&state.pool).await?;
    car_registry::edit_car(&mut gateway, car_id, request, &credentials).await?;
    let car = gateway
        .get_car(car_id)
        .await?
        .ok_or_else(|| CarpoolError::not_found(format!("Car {}", car_id)))?;
    gateway.commit().await?;

    Ok(Json(car.into()))
}

/// Remove a car. Riders seated in it go back to the waiting list.
///
/// DELETE /api/v1/cars/:car_id
pub async fn remove_car(
    State(state): State<AppState>,
    Path(car_id): Path<i64>,
    SuppliedCredentials(credentials): SuppliedCredentials,
) -> Result<StatusCode, ApiError> {
    let mut gateway = PgGateway::begin(&state.pool).await?;
    let seated = gateway
        .get_car(car_id)
        .await?
        .map_or(0, |car| car.passengers.len());
    seat_ledger::remove_car(&mut gateway, car_id, &credentials).await?;
    gateway.commit().await?;

    record_seats_freed(seated as u64);
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/cars/:car_id/verify-pin
pub async fn verify_pin(
    State(state): State<AppState>,
    Path(car_id): Path<i64>,
    Json(request): Json<VerifyPinRequest>,
) -> Result<Json<VerificationResponse>, ApiError> {
    let mut gateway = PgGateway::begin(&state.pool).await?;
    let valid = access_gate::verify_car_pin(&mut gateway, car_id, &request.pin).await?;
    gateway.commit().await?;

    Ok(Json(VerificationResponse { valid }))
}
