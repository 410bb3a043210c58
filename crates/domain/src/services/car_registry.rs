//! Car registration, editing and listing.

use tracing::info;
use validator::Validate;

use crate::error::{CarpoolError, CarpoolResult};
use crate::gateway::CarpoolGateway;
use crate::models::car::CarRequest;
use crate::models::{Car, CarChanges, CarWithPassengers, NewCar};
use crate::services::access_gate::{self, Credentials};
use crate::services::event_registry::require_event;
use crate::services::seat_ledger::load_car;

fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn checked_pin(pin: &str) -> CarpoolResult<String> {
    let pin = pin.trim();
    shared::validation::validate_car_pin(pin)
        .map_err(|_| CarpoolError::validation("PIN must be at least 4 characters"))?;
    Ok(pin.to_string())
}

/// PIN to store after an edit.
///
/// With protection on, a supplied PIN replaces the current one and an absent
/// PIN keeps it. With protection off the PIN is cleared.
fn resolve_pin(
    requires_pin: bool,
    supplied: Option<&str>,
    current: Option<String>,
) -> CarpoolResult<Option<String>> {
    if !requires_pin {
        return Ok(None);
    }
    match supplied.map(str::trim).filter(|p| !p.is_empty()) {
        Some(pin) => checked_pin(pin).map(Some),
        None => current
            .map(Some)
            .ok_or_else(|| CarpoolError::validation("PIN must be at least 4 characters")),
    }
}

/// Registers a car for an event. It starts with no occupied seats.
pub async fn register_car<G>(gateway: &mut G, event_id: &str, request: CarRequest) -> CarpoolResult<Car>
where
    G: CarpoolGateway + ?Sized,
{
    request.validate()?;
    let event = require_event(gateway, event_id).await?;

    let car_pin = if request.requires_pin {
        Some(checked_pin(request.car_pin.as_deref().unwrap_or_default())?)
    } else {
        None
    };

    let car = gateway
        .create_car(NewCar {
            event_id: event.id,
            driver_name: request.driver_name.trim().to_string(),
            driver_phone: blank_to_none(request.driver_phone),
            driver_email: blank_to_none(request.driver_email),
            car_model: request.car_model.trim().to_string(),
            pickup_address: blank_to_none(request.pickup_address),
            dropoff_address: blank_to_none(request.dropoff_address),
            seat_capacity: request.seat_capacity,
            requires_pin: request.requires_pin,
            car_pin,
        })
        .await?;

    info!(
        car_id = car.id,
        event_id = %car.event_id,
        seat_capacity = car.seat_capacity,
        requires_pin = car.requires_pin,
        "Car registered"
    );

    Ok(car)
}

/// Edits a car. Capacity cannot drop below the highest occupied seat.
pub async fn edit_car<G>(
    gateway: &mut G,
    car_id: i64,
    request: CarRequest,
    credentials: &Credentials,
) -> CarpoolResult<Car>
where
    G: CarpoolGateway + ?Sized,
{
    request.validate()?;
    let existing = load_car(gateway, car_id).await?;
    access_gate::authorize_car(gateway, &existing.car, credentials).await?;

    let min_capacity = existing
        .highest_seat_index()
        .map_or(0, |index| index + 1)
        .max(existing.car.occupied_seats);
    if request.seat_capacity < min_capacity {
        return Err(CarpoolError::validation(format!(
            "Seat capacity cannot be lower than {} while those seats are taken",
            min_capacity
        )));
    }

    let current_pin = gateway.get_car_pin(car_id).await?;
    let car_pin = resolve_pin(request.requires_pin, request.car_pin.as_deref(), current_pin)?;

    let car = gateway
        .update_car(
            car_id,
            CarChanges {
                driver_name: request.driver_name.trim().to_string(),
                driver_phone: blank_to_none(request.driver_phone),
                driver_email: blank_to_none(request.driver_email),
                car_model: request.car_model.trim().to_string(),
                pickup_address: blank_to_none(request.pickup_address),
                dropoff_address: blank_to_none(request.dropoff_address),
                seat_capacity: request.seat_capacity,
                requires_pin: request.requires_pin,
                car_pin,
            },
        )
        .await?
        .ok_or_else(|| CarpoolError::not_found(format!("Car {}", car_id)))?;

    info!(
        car_id,
        seat_capacity = car.seat_capacity,
        requires_pin = car.requires_pin,
        "Car updated"
    );

    Ok(car)
}

/// Cars of an event with their seated passengers.
pub async fn list_cars<G>(gateway: &mut G, event_id: &str) -> CarpoolResult<Vec<CarWithPassengers>>
where
    G: CarpoolGateway + ?Sized,
{
    let event = require_event(gateway, event_id).await?;
    gateway.get_cars_for_event(&event.id).await
}
