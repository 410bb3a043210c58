//! API route handlers.
//!
//! Every mutating handler opens one [`persistence::PgGateway`] transaction,
//! runs a single domain operation through it and commits only on success.

pub mod cars;
pub mod events;
pub mod health;
pub mod ride_requests;
pub mod seats;
