//! Secrets presented with a request.
//!
//! Car-gated operations read the PIN from `X-Car-Pin`, event-gated ones the
//! password from `X-Event-Password`. Missing headers are not an error here;
//! the access gate decides whether a secret was needed.

use std::convert::Infallible;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap},
};
use domain::services::Credentials;

pub const CAR_PIN_HEADER: &str = "x-car-pin";
pub const EVENT_PASSWORD_HEADER: &str = "x-event-password";

/// Credentials taken from the request headers.
#[derive(Debug, Clone, Default)]
pub struct SuppliedCredentials(pub Credentials);

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

impl SuppliedCredentials {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self(Credentials {
            car_pin: header_value(headers, CAR_PIN_HEADER),
            event_password: header_value(headers, EVENT_PASSWORD_HEADER),
        })
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for SuppliedCredentials
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_headers(&parts.headers))
    }
}
