//! Car domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::passenger::{Passenger, PassengerResponse};

/// A registered vehicle with a fixed seat capacity.
///
/// The PIN is not carried here. It is only read through
/// [`CarpoolGateway::get_car_pin`](crate::gateway::CarpoolGateway::get_car_pin).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Car {
    pub id: i64,
    pub event_id: String,
    pub driver_name: String,
    pub driver_phone: Option<String>,
    pub driver_email: Option<String>,
    pub car_model: String,
    pub pickup_address: Option<String>,
    pub dropoff_address: Option<String>,
    pub seat_capacity: i32,
    pub occupied_seats: i32,
    pub requires_pin: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Car {
    pub fn has_free_seat(&self) -> bool {
        self.occupied_seats < self.seat_capacity
    }

    pub fn free_seats(&self) -> i32 {
        (self.seat_capacity - self.occupied_seats).max(0)
    }
}

/// A car together with its seated passengers, ordered by seat index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CarWithPassengers {
    pub car: Car,
    pub passengers: Vec<Passenger>,
}

impl CarWithPassengers {
    /// Smallest seat index in `[0, capacity)` not held by any passenger.
    pub fn next_free_seat_index(&self) -> Option<i32> {
        next_free_seat_index(self.car.seat_capacity, &self.passengers)
    }

    pub fn passenger_at(&self, seat_index: i32) -> Option<&Passenger> {
        self.passengers.iter().find(|p| p.seat_index == seat_index)
    }

    /// Highest occupied seat index, if any seat is taken.
    pub fn highest_seat_index(&self) -> Option<i32> {
        self.passengers.iter().map(|p| p.seat_index).max()
    }
}

/// Linear scan for the lowest unoccupied seat index. Freed low indices are reused.
pub fn next_free_seat_index(capacity: i32, passengers: &[Passenger]) -> Option<i32> {
    (0..capacity).find(|index| !passengers.iter().any(|p| p.seat_index == *index))
}

/// Data for inserting a new car.
#[derive(Debug, Clone)]
pub struct NewCar {
    pub event_id: String,
    pub driver_name: String,
    pub driver_phone: Option<String>,
    pub driver_email: Option<String>,
    pub car_model: String,
    pub pickup_address: Option<String>,
    pub dropoff_address: Option<String>,
    pub seat_capacity: i32,
    pub requires_pin: bool,
    pub car_pin: Option<String>,
}

/// Full replacement of a car's editable fields, PIN already resolved.
#[derive(Debug, Clone)]
pub struct CarChanges {
    pub driver_name: String,
    pub driver_phone: Option<String>,
    pub driver_email: Option<String>,
    pub car_model: String,
    pub pickup_address: Option<String>,
    pub dropoff_address: Option<String>,
    pub seat_capacity: i32,
    pub requires_pin: bool,
    pub car_pin: Option<String>,
}

/// Request payload for registering a car, also used for editing one.
///
/// On edit an absent `carPin` keeps the current PIN when `requiresPin` stays set.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CarRequest {
    #[validate(
        length(min = 1, max = 100, message = "Driver name must be 1-100 characters"),
        custom(function = "shared::validation::validate_not_blank", message = "Driver name is required")
    )]
    pub driver_name: String,

    #[validate(length(max = 50, message = "Phone must be at most 50 characters"))]
    pub driver_phone: Option<String>,

    #[validate(length(max = 255, message = "Email must be at most 255 characters"))]
    pub driver_email: Option<String>,

    #[validate(
        length(min = 1, max = 100, message = "Car model must be 1-100 characters"),
        custom(function = "shared::validation::validate_not_blank", message = "Car model is required")
    )]
    pub car_model: String,

    #[validate(custom(function = "shared::validation::validate_seat_capacity"))]
    pub seat_capacity: i32,

    #[validate(length(max = 300, message = "Address must be at most 300 characters"))]
    pub pickup_address: Option<String>,

    #[validate(length(max = 300, message = "Address must be at most 300 characters"))]
    pub dropoff_address: Option<String>,

    #[serde(default)]
    pub requires_pin: bool,

    pub car_pin: Option<String>,
}

/// Request payload for verifying a car PIN.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPinRequest {
    #[serde(default)]
    pub pin: String,
}

/// Response payload for car operations. Never exposes the PIN.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarResponse {
    pub id: i64,
    pub event_id: String,
    pub driver_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub driver_phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub driver_email: Option<String>,
    pub car_model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pickup_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dropoff_address: Option<String>,
    pub seat_capacity: i32,
    pub occupied_seats: i32,
    pub free_seats: i32,
    pub requires_pin: bool,
    pub passengers: Vec<PassengerResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<CarWithPassengers> for CarResponse {
    fn from(c: CarWithPassengers) -> Self {
        let free_seats = c.car.free_seats();
        let car = c.car;
        Self {
            id: car.id,
            event_id: car.event_id,
            driver_name: car.driver_name,
            driver_phone: car.driver_phone,
            driver_email: car.driver_email,
            car_model: car.car_model,
            pickup_address: car.pickup_address,
            dropoff_address: car.dropoff_address,
            seat_capacity: car.seat_capacity,
            occupied_seats: car.occupied_seats,
            free_seats,
            requires_pin: car.requires_pin,
            passengers: c.passengers.into_iter().map(Into::into).collect(),
            created_at: car.created_at,
            updated_at: car.updated_at,
        }
    }
}

/// Response for listing the cars of an event.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListCarsResponse {
    pub cars: Vec<CarResponse>,
    pub total: usize,
}
