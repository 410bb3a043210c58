//! Ride request domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Waiting-list state of a single rider.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RidePassengerStatus {
    Waiting,
    Assigned,
}

impl RidePassengerStatus {
    /// Converts to database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            RidePassengerStatus::Waiting => "waiting",
            RidePassengerStatus::Assigned => "assigned",
        }
    }

    /// Parses from database string representation.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "waiting" => Some(RidePassengerStatus::Waiting),
            "assigned" => Some(RidePassengerStatus::Assigned),
            _ => None,
        }
    }
}

/// A waitlist entry for one or more riders needing a car.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RideRequest {
    pub id: i64,
    pub event_id: String,
    pub contact_name: String,
    pub contact_phone: Option<String>,
    pub pickup_address: Option<String>,
    pub dropoff_address: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// One rider named in a ride request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RideRequestPassenger {
    pub id: i64,
    pub request_id: i64,
    pub name: String,
    pub status: RidePassengerStatus,
    pub assigned_car_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl RideRequestPassenger {
    pub fn is_waiting(&self) -> bool {
        self.status == RidePassengerStatus::Waiting
    }
}

/// A ride request with its riders in creation order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RideRequestWithPassengers {
    pub request: RideRequest,
    pub passengers: Vec<RideRequestPassenger>,
}

/// Data for inserting a ride request (riders are inserted separately).
#[derive(Debug, Clone)]
pub struct NewRideRequest {
    pub event_id: String,
    pub contact_name: String,
    pub contact_phone: Option<String>,
    pub pickup_address: Option<String>,
    pub dropoff_address: Option<String>,
    pub notes: Option<String>,
}

/// Request payload for filing a ride request.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateRideRequestRequest {
    #[validate(
        length(min = 1, max = 100, message = "Contact name must be 1-100 characters"),
        custom(function = "shared::validation::validate_not_blank", message = "Contact name is required")
    )]
    pub contact_name: String,

    #[validate(length(max = 50, message = "Phone must be at most 50 characters"))]
    pub contact_phone: Option<String>,

    #[validate(length(max = 300, message = "Address must be at most 300 characters"))]
    pub pickup_address: Option<String>,

    #[validate(length(max = 300, message = "Address must be at most 300 characters"))]
    pub dropoff_address: Option<String>,

    #[validate(length(max = 1000, message = "Notes must be at most 1000 characters"))]
    pub notes: Option<String>,

    #[serde(default)]
    #[validate(length(max = 20, message = "At most 20 riders per request"))]
    pub passenger_names: Vec<String>,

    /// Adds the contact person to the riders when not already listed.
    #[serde(default)]
    pub contact_also_needs_ride: bool,
}

impl CreateRideRequestRequest {
    /// Trimmed, non-blank rider names, with the contact prepended when they
    /// also need a ride and are not already listed (case-insensitive).
    pub fn rider_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .passenger_names
            .iter()
            .map(|n| n.trim())
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .collect();

        let contact = self.contact_name.trim();
        if self.contact_also_needs_ride
            && !contact.is_empty()
            && !names.iter().any(|n| n.to_lowercase() == contact.to_lowercase())
        {
            names.insert(0, contact.to_string());
        }

        names
    }
}

/// Request payload for assigning a waiting rider to a car.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignRidePassengerRequest {
    pub car_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RideRequestPassengerResponse {
    pub id: i64,
    pub request_id: i64,
    pub name: String,
    pub status: RidePassengerStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_car_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl From<RideRequestPassenger> for RideRequestPassengerResponse {
    fn from(p: RideRequestPassenger) -> Self {
        Self {
            id: p.id,
            request_id: p.request_id,
            name: p.name,
            status: p.status,
            assigned_car_id: p.assigned_car_id,
            created_at: p.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RideRequestResponse {
    pub id: i64,
    pub event_id: String,
    pub contact_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pickup_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dropoff_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub passengers: Vec<RideRequestPassengerResponse>,
    pub created_at: DateTime<Utc>,
}

impl From<RideRequestWithPassengers> for RideRequestResponse {
    fn from(r: RideRequestWithPassengers) -> Self {
        let request = r.request;
        Self {
            id: request.id,
            event_id: request.event_id,
            contact_name: request.contact_name,
            contact_phone: request.contact_phone,
            pickup_address: request.pickup_address,
            dropoff_address: request.dropoff_address,
            notes: request.notes,
            passengers: r.passengers.into_iter().map(Into::into).collect(),
            created_at: request.created_at,
        }
    }
}

/// Response for listing the ride requests of an event.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListRideRequestsResponse {
    pub ride_requests: Vec<RideRequestResponse>,
    pub total: usize,
}
