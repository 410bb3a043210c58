//! Seated passenger domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// A rider occupying one seat index of one car.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Passenger {
    pub id: i64,
    pub car_id: i64,
    pub name: String,
    pub seat_index: i32,
    /// Ride-request passenger this seat was assigned from, if any.
    pub request_passenger_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

/// Data for inserting a seated passenger.
#[derive(Debug, Clone)]
pub struct NewPassenger {
    pub car_id: i64,
    pub name: String,
    pub seat_index: i32,
    pub request_passenger_id: Option<i64>,
}

/// Request payload for booking a seat.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BookSeatRequest {
    #[validate(
        length(min = 1, max = 100, message = "Passenger name must be 1-100 characters"),
        custom(function = "shared::validation::validate_not_blank", message = "Passenger name is required")
    )]
    pub passenger_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PassengerResponse {
    pub id: i64,
    pub car_id: i64,
    pub name: String,
    pub seat_index: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_passenger_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl From<Passenger> for PassengerResponse {
    fn from(p: Passenger) -> Self {
        Self {
            id: p.id,
            car_id: p.car_id,
            name: p.name,
            seat_index: p.seat_index,
            request_passenger_id: p.request_passenger_id,
            created_at: p.created_at,
        }
    }
}
