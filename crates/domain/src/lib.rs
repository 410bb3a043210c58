//! Domain layer for the carpool backend.
//!
//! This crate contains:
//! - Domain models (Event, Car, Passenger, RideRequest)
//! - The `CarpoolGateway` storage contract and an in-memory implementation
//! - Business logic services (seat ledger, access gate, registries)
//! - Domain error types

pub mod error;
pub mod gateway;
pub mod models;
pub mod services;

pub use error::{CarpoolError, CarpoolResult};
pub use gateway::{CarpoolGateway, InMemoryGateway};
