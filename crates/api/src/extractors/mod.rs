//! Custom request extractors.

pub mod credentials;

pub use credentials::{SuppliedCredentials, CAR_PIN_HEADER, EVENT_PASSWORD_HEADER};
