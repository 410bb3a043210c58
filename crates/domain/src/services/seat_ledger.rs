//! Seat ledger.
//!
//! Keeps seat counts and ride-request assignments consistent while cars,
//! passengers and ride requests change:
//!
//! - a car's `occupied_seats` equals the number of passengers seated in it;
//! - seat indices are unique per car and lie in `[0, capacity)`;
//! - a rider is `assigned` exactly while a seated passenger links back to it.
//!
//! The ledger is stateless. Each function works on ids and parameters plus
//! reads through the gateway it is handed, and expects that gateway to be a
//! single unit of work so a failure halfway leaves nothing behind.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{info, warn};

use crate::error::{CarpoolError, CarpoolResult};
use crate::gateway::CarpoolGateway;
use crate::models::{CarWithPassengers, NewPassenger, Passenger};
use crate::services::access_gate::{self, Credentials};

/// Outcome of releasing the seats held by a ride request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReleasedSeats {
    /// Number of seated passengers removed, per car.
    pub per_car: BTreeMap<i64, i32>,
}

impl ReleasedSeats {
    pub fn total(&self) -> i32 {
        self.per_car.values().sum()
    }
}

/// A car whose occupied-seat counter disagreed with its passenger rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeatRepair {
    pub car_id: i64,
    pub recorded: i32,
    pub actual: i32,
}

pub(crate) async fn load_car<G>(gateway: &mut G, car_id: i64) -> CarpoolResult<CarWithPassengers>
where
    G: CarpoolGateway + ?Sized,
{
    gateway
        .get_car(car_id)
        .await?
        .ok_or_else(|| CarpoolError::not_found(format!("Car {}", car_id)))
}

/// Seats a passenger at the lowest free index and bumps the counter.
async fn seat_passenger<G>(
    gateway: &mut G,
    car: &CarWithPassengers,
    name: String,
    request_passenger_id: Option<i64>,
) -> CarpoolResult<Passenger>
where
    G: CarpoolGateway + ?Sized,
{
    if !car.car.has_free_seat() {
        return Err(CarpoolError::CapacityExceeded { car_id: car.car.id });
    }
    let seat_index = car
        .next_free_seat_index()
        .ok_or(CarpoolError::CapacityExceeded { car_id: car.car.id })?;

    let passenger = gateway
        .add_passenger(NewPassenger {
            car_id: car.car.id,
            name,
            seat_index,
            request_passenger_id,
        })
        .await?;
    gateway
        .set_occupied_seats(car.car.id, car.car.occupied_seats + 1)
        .await?;

    Ok(passenger)
}

/// Books the lowest free seat of a car for a named passenger.
pub async fn book_seat<G>(
    gateway: &mut G,
    car_id: i64,
    passenger_name: &str,
    credentials: &Credentials,
) -> CarpoolResult<Passenger>
where
    G: CarpoolGateway + ?Sized,
{
    let name = passenger_name.trim();
    if name.is_empty() {
        return Err(CarpoolError::validation("Passenger name is required"));
    }

    let car = load_car(gateway, car_id).await?;
    access_gate::authorize_car(gateway, &car.car, credentials).await?;

    let passenger = seat_passenger(gateway, &car, name.to_string(), None).await?;

    info!(
        car_id,
        seat_index = passenger.seat_index,
        passenger_id = passenger.id,
        "Seat booked"
    );

    Ok(passenger)
}

/// Frees the seat at `seat_index`. A rider assigned to that seat goes back
/// to the waiting list.
pub async fn free_seat<G>(gateway: &mut G, car_id: i64, seat_index: i32) -> CarpoolResult<Passenger>
where
    G: CarpoolGateway + ?Sized,
{
    let car = load_car(gateway, car_id).await?;
    let passenger = car
        .passenger_at(seat_index)
        .cloned()
        .ok_or_else(|| CarpoolError::not_found(format!("Seat {} of car {}", seat_index, car_id)))?;

    gateway.remove_passenger(passenger.id).await?;
    gateway
        .set_occupied_seats(car_id, (car.car.occupied_seats - 1).max(0))
        .await?;

    if let Some(rider_id) = passenger.request_passenger_id {
        gateway.mark_ride_passenger_waiting(rider_id).await?;
    }

    info!(
        car_id,
        seat_index,
        passenger_id = passenger.id,
        ride_passenger_id = ?passenger.request_passenger_id,
        "Seat freed"
    );

    Ok(passenger)
}

/// Seats a waiting ride-request rider in a car chosen by the organizer.
pub async fn assign_ride_request_passenger<G>(
    gateway: &mut G,
    ride_passenger_id: i64,
    car_id: i64,
    credentials: &Credentials,
) -> CarpoolResult<Passenger>
where
    G: CarpoolGateway + ?Sized,
{
    let rider = gateway
        .get_ride_passenger(ride_passenger_id)
        .await?
        .ok_or_else(|| CarpoolError::not_found(format!("Ride passenger {}", ride_passenger_id)))?;
    if !rider.is_waiting() {
        return Err(CarpoolError::validation(format!(
            "Ride passenger {} is already assigned",
            ride_passenger_id
        )));
    }

    let car = load_car(gateway, car_id).await?;
    let request = gateway
        .get_ride_request(rider.request_id)
        .await?
        .ok_or_else(|| CarpoolError::not_found(format!("Ride request {}", rider.request_id)))?;
    if request.request.event_id != car.car.event_id {
        return Err(CarpoolError::validation(
            "Car and ride request belong to different events",
        ));
    }

    access_gate::authorize_car(gateway, &car.car, credentials).await?;

    let passenger = seat_passenger(gateway, &car, rider.name.clone(), Some(rider.id)).await?;
    gateway
        .mark_ride_passenger_assigned(rider.id, car_id)
        .await?;

    info!(
        car_id,
        ride_passenger_id,
        seat_index = passenger.seat_index,
        "Ride passenger assigned"
    );

    Ok(passenger)
}

/// Removes a car. Riders seated in it return to the waiting list before the
/// car and its passengers are deleted. Returns how many riders were reset.
pub async fn remove_car<G>(
    gateway: &mut G,
    car_id: i64,
    credentials: &Credentials,
) -> CarpoolResult<u64>
where
    G: CarpoolGateway + ?Sized,
{
    let car = load_car(gateway, car_id).await?;
    access_gate::authorize_car(gateway, &car.car, credentials).await?;

    // Must run before the delete, which nulls the riders' car reference.
    let reset = gateway.reset_ride_passengers_for_car(car_id).await?;
    gateway.delete_car(car_id).await?;

    info!(
        car_id,
        event_id = %car.car.event_id,
        passengers = car.passengers.len(),
        riders_reset = reset,
        "Car removed"
    );

    Ok(reset)
}

/// Releases every seat held by the riders of a ride request, then deletes
/// the request and its riders.
pub async fn remove_ride_request<G>(gateway: &mut G, request_id: i64) -> CarpoolResult<ReleasedSeats>
where
    G: CarpoolGateway + ?Sized,
{
    // Riders first, then cars: the same order an assignment takes.
    let request = gateway
        .lock_ride_request(request_id)
        .await?
        .ok_or_else(|| CarpoolError::not_found(format!("Ride request {}", request_id)))?;

    let rider_ids: Vec<i64> = request.passengers.iter().map(|p| p.id).collect();
    let seated_cars: BTreeSet<i64> = gateway
        .find_passengers_for_ride_passengers(&rider_ids)
        .await?
        .iter()
        .map(|p| p.car_id)
        .collect();

    let mut cars: BTreeMap<i64, CarWithPassengers> = BTreeMap::new();
    for car_id in seated_cars {
        cars.insert(car_id, load_car(gateway, car_id).await?);
    }

    // A seat freed before the cars were locked is gone now.
    let seated = gateway
        .find_passengers_for_ride_passengers(&rider_ids)
        .await?;

    let mut released = ReleasedSeats::default();
    for passenger in &seated {
        *released.per_car.entry(passenger.car_id).or_insert(0) += 1;
    }
    for car_id in released.per_car.keys() {
        if !cars.contains_key(car_id) {
            cars.insert(*car_id, load_car(gateway, *car_id).await?);
        }
    }

    let passenger_ids: Vec<i64> = seated.iter().map(|p| p.id).collect();
    if !passenger_ids.is_empty() {
        gateway.remove_passengers(&passenger_ids).await?;
    }

    for (car_id, removed) in &released.per_car {
        if let Some(car) = cars.get(car_id) {
            gateway
                .set_occupied_seats(*car_id, (car.car.occupied_seats - removed).max(0))
                .await?;
        }
    }

    gateway.delete_ride_request(request_id).await?;

    info!(
        request_id,
        riders = rider_ids.len(),
        seats_released = released.total(),
        cars_affected = released.per_car.len(),
        "Ride request removed"
    );

    Ok(released)
}

/// Recomputes a car's occupied-seat counter from its passenger rows and
/// repairs it on drift.
pub async fn reconcile_occupied_seats<G>(
    gateway: &mut G,
    car_id: i64,
) -> CarpoolResult<Option<SeatRepair>>
where
    G: CarpoolGateway + ?Sized,
{
    let car = load_car(gateway, car_id).await?;
    let actual = gateway.count_passengers(car_id).await? as i32;
    if actual == car.car.occupied_seats {
        return Ok(None);
    }

    if actual > car.car.seat_capacity {
        warn!(
            car_id,
            actual,
            capacity = car.car.seat_capacity,
            "More passengers than seats, clamping counter to capacity"
        );
    }
    gateway
        .set_occupied_seats(car_id, actual.min(car.car.seat_capacity))
        .await?;

    warn!(
        car_id,
        recorded = car.car.occupied_seats,
        actual,
        "Repaired occupied seat counter"
    );

    Ok(Some(SeatRepair {
        car_id,
        recorded: car.car.occupied_seats,
        actual,
    }))
}

/// Runs [`reconcile_occupied_seats`] over every car.
pub async fn reconcile_all<G>(gateway: &mut G) -> CarpoolResult<Vec<SeatRepair>>
where
    G: CarpoolGateway + ?Sized,
{
    let mut repairs = Vec::new();
    for car_id in gateway.list_car_ids().await? {
        if let Some(repair) = reconcile_occupied_seats(gateway, car_id).await? {
            repairs.push(repair);
        }
    }
    Ok(repairs)
}
