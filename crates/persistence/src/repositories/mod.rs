//! Repository implementations for database operations.
//!
//! Repositories borrow a connection rather than owning a pool, so several of
//! them can work inside the same transaction.

pub mod car;
pub mod event;
pub mod passenger;
pub mod ride_request;

pub use car::CarRepository;
pub use event::EventRepository;
pub use passenger::PassengerRepository;
pub use ride_request::RideRequestRepository;
