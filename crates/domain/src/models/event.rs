//! Event domain model.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::car::{CarResponse, CarWithPassengers};
use super::ride_request::{RideRequestResponse, RideRequestWithPassengers};

/// A ride-sharing occasion. Root aggregate owning cars and ride requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    /// Short uppercase alphanumeric code.
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub date: NaiveDate,
    pub time: NaiveTime,
    /// Hex SHA-256 digest of the event password, `None` when unprotected.
    pub password_hash: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    pub fn is_password_protected(&self) -> bool {
        self.password_hash.is_some()
    }

    /// Local wall-clock start of the event.
    pub fn starts_at(&self) -> NaiveDateTime {
        self.date.and_time(self.time)
    }
}

/// Data for inserting a new event.
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub password_hash: Option<String>,
}

/// Editable event fields. The password is fixed at creation.
#[derive(Debug, Clone)]
pub struct EventChanges {
    pub name: String,
    pub description: Option<String>,
    pub date: NaiveDate,
    pub time: NaiveTime,
}

/// Request payload for creating an event.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    #[validate(
        length(min = 1, max = 200, message = "Event name must be 1-200 characters"),
        custom(function = "shared::validation::validate_not_blank", message = "Event name is required")
    )]
    pub name: String,

    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    pub description: Option<String>,

    pub date: NaiveDate,

    pub time: NaiveTime,

    /// Optional password protecting edit and delete.
    pub password: Option<String>,
}

/// Request payload for updating an event.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEventRequest {
    #[validate(
        length(min = 1, max = 200, message = "Event name must be 1-200 characters"),
        custom(function = "shared::validation::validate_not_blank", message = "Event name is required")
    )]
    pub name: String,

    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    pub description: Option<String>,

    pub date: NaiveDate,

    pub time: NaiveTime,
}

/// Request payload for verifying an event password.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPasswordRequest {
    #[serde(default)]
    pub password: String,
}

/// Result of a password or PIN check.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VerificationResponse {
    pub valid: bool,
}

/// Query parameters for resolving an event code from user input.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveEventQuery {
    pub input: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveEventResponse {
    pub event_id: String,
    pub name: String,
}

/// Response payload for event operations. Never exposes the password digest.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventResponse {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub password_protected: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Event> for EventResponse {
    fn from(e: Event) -> Self {
        let password_protected = e.is_password_protected();
        Self {
            id: e.id,
            name: e.name,
            description: e.description,
            date: e.date,
            time: e.time,
            password_protected,
            created_at: e.created_at,
            updated_at: e.updated_at,
        }
    }
}

/// An event with everything it owns, in creation order.
#[derive(Debug, Clone)]
pub struct EventDetails {
    pub event: Event,
    pub cars: Vec<CarWithPassengers>,
    pub ride_requests: Vec<RideRequestWithPassengers>,
}

/// Full event view: the event with its cars and ride requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDetailsResponse {
    pub event: EventResponse,
    pub cars: Vec<CarResponse>,
    pub ride_requests: Vec<RideRequestResponse>,
}

impl From<EventDetails> for EventDetailsResponse {
    fn from(d: EventDetails) -> Self {
        Self {
            event: d.event.into(),
            cars: d.cars.into_iter().map(Into::into).collect(),
            ride_requests: d.ride_requests.into_iter().map(Into::into).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_event(password_hash: Option<String>) -> Event {
        let now = Utc::now();
        Event {
            id: "ASN9UH7K".to_string(),
            name: "Picnic".to_string(),
            description: None,
            date: NaiveDate::from_ymd_opt(2030, 6, 1).unwrap(),
            time: NaiveTime::from_hms_opt(12, 30, 0).unwrap(),
            password_hash,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_starts_at() {
        let event = sample_event(None);
        assert_eq!(
            event.starts_at(),
            NaiveDate::from_ymd_opt(2030, 6, 1)
                .unwrap()
                .and_hms_opt(12, 30, 0)
                .unwrap()
        );
    }

    #[test]
    fn test_response_hides_password_hash() {
        let response: EventResponse = sample_event(Some("abc123".into())).into();
        assert!(response.password_protected);

        let json = serde_json::to_string(&response).unwrap();
        assert!(!json.contains("abc123"));
        assert!(json.contains("\"passwordProtected\":true"));
        assert!(!json.contains("description"));
    }

    #[test]
    fn test_create_request_deserialization() {
        let json = r#"{
            "name": "Picnic",
            "date": "2030-06-01",
            "time": "12:30:00",
            "password": "secret"
        }"#;
        let request: CreateEventRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.name, "Picnic");
        assert_eq!(request.password.as_deref(), Some("secret"));
        assert!(request.description.is_none());
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_create_request_rejects_blank_name() {
        let request = CreateEventRequest {
            name: "   ".into(),
            description: None,
            date: NaiveDate::from_ymd_opt(2030, 6, 1).unwrap(),
            time: NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
            password: None,
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_create_request_rejects_long_name() {
        let request = CreateEventRequest {
            name: "x".repeat(201),
            description: None,
            date: NaiveDate::from_ymd_opt(2030, 6, 1).unwrap(),
            time: NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
            password: None,
        };
        assert!(request.validate().is_err());
    }
}
