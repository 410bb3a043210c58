//! Access gate: shared-secret checks in front of mutating operations.
//!
//! Cars may carry a plaintext PIN compared by exact match. Events may carry
//! an unsalted SHA-256 digest of a password. There is no lockout and no
//! rate limiting.

use tracing::warn;

use crate::error::{CarpoolError, CarpoolResult};
use crate::gateway::CarpoolGateway;
use crate::models::{Car, Event};
use crate::services::event_registry;

/// Secrets the caller presented for one operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub car_pin: Option<String>,
    pub event_password: Option<String>,
}

impl Credentials {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with_car_pin(pin: impl Into<String>) -> Self {
        Self {
            car_pin: Some(pin.into()),
            ..Self::default()
        }
    }

    pub fn with_event_password(password: impl Into<String>) -> Self {
        Self {
            event_password: Some(password.into()),
            ..Self::default()
        }
    }
}

/// Checks a PIN against the stored PIN of a car.
///
/// Returns false for an empty PIN, an unknown car, or a car without a PIN.
pub async fn verify_car_pin<G>(gateway: &mut G, car_id: i64, pin: &str) -> CarpoolResult<bool>
where
    G: CarpoolGateway + ?Sized,
{
    let pin = pin.trim();
    if pin.is_empty() {
        return Ok(false);
    }
    Ok(gateway.get_car_pin(car_id).await?.as_deref() == Some(pin))
}

/// Lets the operation proceed if the car is unprotected or the caller
/// presented its PIN.
pub async fn authorize_car<G>(
    gateway: &mut G,
    car: &Car,
    credentials: &Credentials,
) -> CarpoolResult<()>
where
    G: CarpoolGateway + ?Sized,
{
    if !car.requires_pin {
        return Ok(());
    }

    let supplied = credentials.car_pin.as_deref().unwrap_or_default();
    if verify_car_pin(gateway, car.id, supplied).await? {
        Ok(())
    } else {
        warn!(car_id = car.id, pin_supplied = !supplied.is_empty(), "Car PIN check failed");
        Err(CarpoolError::AuthorizationFailed("Incorrect PIN".into()))
    }
}

/// Checks a password against the event's stored digest.
///
/// Always false for an unprotected event or an empty password.
pub fn verify_event_password(event: &Event, password: &str) -> bool {
    match event.password_hash.as_deref() {
        Some(stored) => shared::crypto::verify_event_password(password.trim(), stored),
        None => false,
    }
}

/// Looks up the event and checks the password against it.
pub async fn check_event_password<G>(
    gateway: &mut G,
    event_id: &str,
    password: &str,
) -> CarpoolResult<bool>
where
    G: CarpoolGateway + ?Sized,
{
    let event = event_registry::require_event(gateway, event_id).await?;
    Ok(verify_event_password(&event, password))
}

/// Lets the operation proceed if the event is unprotected or the caller
/// presented its password.
pub fn authorize_event(event: &Event, credentials: &Credentials) -> CarpoolResult<()> {
    if !event.is_password_protected() {
        return Ok(());
    }

    let supplied = credentials.event_password.as_deref().unwrap_or_default();
    if verify_event_password(event, supplied) {
        Ok(())
    } else {
        warn!(event_id = %event.id, "Event password check failed");
        Err(CarpoolError::AuthorizationFailed(
            "Incorrect event password".into(),
        ))
    }
}
