//! Event lifecycle: create, view, edit, delete and code resolution.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use tracing::info;
use validator::Validate;

use crate::error::{CarpoolError, CarpoolResult};
use crate::gateway::CarpoolGateway;
use crate::models::event::{CreateEventRequest, UpdateEventRequest};
use crate::models::{Event, EventChanges, EventDetails, NewEvent};
use crate::services::access_gate::{self, Credentials};

/// Upper bound on code generation attempts before giving up.
const MAX_CODE_ATTEMPTS: usize = 32;

/// Uppercases and trims an event code taken from a path or form.
pub fn normalize_event_id(event_id: &str) -> String {
    event_id.trim().to_uppercase()
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn ensure_not_in_past(date: NaiveDate, time: NaiveTime, now: NaiveDateTime) -> CarpoolResult<()> {
    if date.and_time(time) < now {
        return Err(CarpoolError::validation("Event date is in the past"));
    }
    Ok(())
}

/// Loads an event or fails with not-found.
pub async fn require_event<G>(gateway: &mut G, event_id: &str) -> CarpoolResult<Event>
where
    G: CarpoolGateway + ?Sized,
{
    let event_id = normalize_event_id(event_id);
    gateway
        .get_event(&event_id)
        .await?
        .ok_or_else(|| CarpoolError::not_found(format!("Event {}", event_id)))
}

/// Allocates a code no existing event uses.
async fn allocate_event_id<G>(gateway: &mut G) -> CarpoolResult<String>
where
    G: CarpoolGateway + ?Sized,
{
    for _ in 0..MAX_CODE_ATTEMPTS {
        let candidate = shared::event_code::generate_event_code();
        if gateway.get_event(&candidate).await?.is_none() {
            return Ok(candidate);
        }
    }
    Err(CarpoolError::Transport(
        "Could not allocate a free event code".into(),
    ))
}

/// Creates an event. `now` is the local wall-clock time the start must not precede.
pub async fn create_event<G>(
    gateway: &mut G,
    request: CreateEventRequest,
    now: NaiveDateTime,
) -> CarpoolResult<Event>
where
    G: CarpoolGateway + ?Sized,
{
    request.validate()?;
    ensure_not_in_past(request.date, request.time, now)?;

    let id = allocate_event_id(gateway).await?;
    let password_hash = request
        .password
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(shared::crypto::hash_event_password);

    let event = gateway
        .create_event(NewEvent {
            id,
            name: request.name.trim().to_string(),
            description: blank_to_none(request.description),
            date: request.date,
            time: request.time,
            password_hash,
        })
        .await?;

    info!(
        event_id = %event.id,
        protected = event.is_password_protected(),
        "Event created"
    );

    Ok(event)
}

/// Loads an event with its cars and ride requests.
pub async fn get_event_details<G>(gateway: &mut G, event_id: &str) -> CarpoolResult<EventDetails>
where
    G: CarpoolGateway + ?Sized,
{
    let event = require_event(gateway, event_id).await?;
    let cars = gateway.get_cars_for_event(&event.id).await?;
    let ride_requests = gateway.get_ride_requests_for_event(&event.id).await?;

    Ok(EventDetails {
        event,
        cars,
        ride_requests,
    })
}

/// Edits name, description, date and time. The password cannot change.
pub async fn update_event<G>(
    gateway: &mut G,
    event_id: &str,
    request: UpdateEventRequest,
    credentials: &Credentials,
    now: NaiveDateTime,
) -> CarpoolResult<Event>
where
    G: CarpoolGateway + ?Sized,
{
    request.validate()?;
    let event = require_event(gateway, event_id).await?;
    access_gate::authorize_event(&event, credentials)?;
    ensure_not_in_past(request.date, request.time, now)?;

    let updated = gateway
        .update_event(
            &event.id,
            EventChanges {
                name: request.name.trim().to_string(),
                description: blank_to_none(request.description),
                date: request.date,
                time: request.time,
            },
        )
        .await?
        .ok_or_else(|| CarpoolError::not_found(format!("Event {}", event.id)))?;

    info!(event_id = %updated.id, "Event updated");

    Ok(updated)
}

/// Deletes an event with everything it owns.
pub async fn delete_event<G>(
    gateway: &mut G,
    event_id: &str,
    credentials: &Credentials,
) -> CarpoolResult<()>
where
    G: CarpoolGateway + ?Sized,
{
    let event = require_event(gateway, event_id).await?;
    access_gate::authorize_event(&event, credentials)?;

    gateway.delete_event(&event.id).await?;

    info!(event_id = %event.id, "Event deleted");

    Ok(())
}

/// Resolves a bare code or a shareable link to an existing event.
pub async fn resolve_event_code<G>(gateway: &mut G, input: &str) -> CarpoolResult<Event>
where
    G: CarpoolGateway + ?Sized,
{
    let code = shared::event_code::extract_event_code(input)
        .ok_or_else(|| CarpoolError::not_found("Event code"))?;
    require_event(gateway, &code).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::InMemoryGateway;
    use crate::models::NewCar;
    use crate::services::seat_ledger;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2030, 1, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn create_request(password: Option<&str>) -> CreateEventRequest {
        CreateEventRequest {
            name: " Picnic ".into(),
            description: Some("  ".into()),
            date: NaiveDate::from_ymd_opt(2030, 6, 1).unwrap(),
            time: NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
            password: password.map(str::to_string),
        }
    }

    fn update_request(name: &str) -> UpdateEventRequest {
        UpdateEventRequest {
            name: name.into(),
            description: Some("Bring snacks".into()),
            date: NaiveDate::from_ymd_opt(2030, 6, 2).unwrap(),
            time: NaiveTime::from_hms_opt(9, 30, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_create_event() {
        let mut gw = InMemoryGateway::new();
        let event = create_event(&mut gw, create_request(None), now()).await.unwrap();

        assert_eq!(event.id.len(), 8);
        assert!(shared::event_code::is_valid_event_code(&event.id));
        assert_eq!(event.name, "Picnic");
        assert_eq!(event.description, None);
        assert!(!event.is_password_protected());
    }

    #[tokio::test]
    async fn test_create_event_hashes_trimmed_password() {
        let mut gw = InMemoryGateway::new();
        let event = create_event(&mut gw, create_request(Some("  secret ")), now())
            .await
            .unwrap();
        assert_eq!(
            event.password_hash.as_deref(),
            Some(shared::crypto::hash_event_password("secret").as_str())
        );
    }

    #[tokio::test]
    async fn test_blank_password_means_unprotected() {
        let mut gw = InMemoryGateway::new();
        let event = create_event(&mut gw, create_request(Some("   ")), now())
            .await
            .unwrap();
        assert!(!event.is_password_protected());
    }

    #[tokio::test]
    async fn test_create_event_in_past_rejected() {
        let mut gw = InMemoryGateway::new();
        let mut request = create_request(None);
        request.date = NaiveDate::from_ymd_opt(2029, 12, 31).unwrap();
        let err = create_event(&mut gw, request, now()).await.unwrap_err();
        assert_eq!(err, CarpoolError::Validation("Event date is in the past".into()));
    }

    #[tokio::test]
    async fn test_create_event_requires_name() {
        let mut gw = InMemoryGateway::new();
        let mut request = create_request(None);
        request.name = "".into();
        let err = create_event(&mut gw, request, now()).await.unwrap_err();
        assert!(matches!(err, CarpoolError::Validation(_)));
    }

    #[tokio::test]
    async fn test_get_event_details() {
        let mut gw = InMemoryGateway::new();
        let event = create_event(&mut gw, create_request(None), now()).await.unwrap();
        let car = gw
            .create_car(NewCar {
                event_id: event.id.clone(),
                driver_name: "Dana".into(),
                driver_phone: None,
                driver_email: None,
                car_model: "Golf".into(),
                pickup_address: None,
                dropoff_address: None,
                seat_capacity: 2,
                requires_pin: false,
                car_pin: None,
            })
            .await
            .unwrap();
        seat_ledger::book_seat(&mut gw, car.id, "Alice", &Credentials::none())
            .await
            .unwrap();

        let details = get_event_details(&mut gw, &event.id.to_lowercase())
            .await
            .unwrap();
        assert_eq!(details.event.id, event.id);
        assert_eq!(details.cars.len(), 1);
        assert_eq!(details.cars[0].passengers.len(), 1);
        assert!(details.ride_requests.is_empty());
    }

    #[tokio::test]
    async fn test_get_unknown_event() {
        let mut gw = InMemoryGateway::new();
        let err = get_event_details(&mut gw, "NOPE0000").await.unwrap_err();
        assert!(matches!(err, CarpoolError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_update_unprotected_event() {
        let mut gw = InMemoryGateway::new();
        let event = create_event(&mut gw, create_request(None), now()).await.unwrap();

        let updated = update_event(
            &mut gw,
            &event.id,
            update_request("Beach day"),
            &Credentials::none(),
            now(),
        )
        .await
        .unwrap();
        assert_eq!(updated.name, "Beach day");
        assert_eq!(updated.description.as_deref(), Some("Bring snacks"));
        assert_eq!(updated.time, NaiveTime::from_hms_opt(9, 30, 0).unwrap());
    }

    #[tokio::test]
    async fn test_update_protected_event_requires_password() {
        let mut gw = InMemoryGateway::new();
        let event = create_event(&mut gw, create_request(Some("secret")), now())
            .await
            .unwrap();

        let err = update_event(
            &mut gw,
            &event.id,
            update_request("Beach day"),
            &Credentials::with_event_password("wrong"),
            now(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, CarpoolError::AuthorizationFailed(_)));

        let updated = update_event(
            &mut gw,
            &event.id,
            update_request("Beach day"),
            &Credentials::with_event_password("secret"),
            now(),
        )
        .await
        .unwrap();
        assert_eq!(updated.name, "Beach day");
        assert_eq!(updated.password_hash, event.password_hash);
    }

    #[tokio::test]
    async fn test_update_event_into_past_rejected() {
        let mut gw = InMemoryGateway::new();
        let event = create_event(&mut gw, create_request(None), now()).await.unwrap();
        let mut request = update_request("Late");
        request.date = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();

        let err = update_event(&mut gw, &event.id, request, &Credentials::none(), now())
            .await
            .unwrap_err();
        assert!(matches!(err, CarpoolError::Validation(_)));
    }

    #[tokio::test]
    async fn test_delete_event() {
        let mut gw = InMemoryGateway::new();
        let event = create_event(&mut gw, create_request(Some("secret")), now())
            .await
            .unwrap();

        let err = delete_event(&mut gw, &event.id, &Credentials::none())
            .await
            .unwrap_err();
        assert!(matches!(err, CarpoolError::AuthorizationFailed(_)));

        delete_event(&mut gw, &event.id, &Credentials::with_event_password("secret"))
            .await
            .unwrap();
        assert!(gw.get_event(&event.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_resolve_event_code() {
        let mut gw = InMemoryGateway::new();
        let event = create_event(&mut gw, create_request(None), now()).await.unwrap();

        let link = format!("https://rides.example.org/?event={}", event.id.to_lowercase());
        assert_eq!(resolve_event_code(&mut gw, &link).await.unwrap().id, event.id);
        assert_eq!(
            resolve_event_code(&mut gw, &format!("{}:1", event.id))
                .await
                .unwrap()
                .id,
            event.id
        );

        assert!(matches!(
            resolve_event_code(&mut gw, "garbage").await,
            Err(CarpoolError::NotFound(_))
        ));
        assert!(matches!(
            resolve_event_code(&mut gw, "ZZZZZZZZ").await,
            Err(CarpoolError::NotFound(_))
        ));
    }
}
