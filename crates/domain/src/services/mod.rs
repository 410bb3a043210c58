//! Domain services for the carpool backend.
//!
//! Services are stateless functions over a [`CarpoolGateway`](crate::gateway::CarpoolGateway).
//! The caller owns the unit of work and commits it once the service returns `Ok`.

pub mod access_gate;
pub mod car_registry;
pub mod event_registry;
pub mod maintenance;
pub mod ride_requests;
pub mod seat_ledger;

pub use access_gate::Credentials;
pub use seat_ledger::{ReleasedSeats, SeatRepair};
