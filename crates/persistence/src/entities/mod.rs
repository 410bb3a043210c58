//! Database entity definitions (row mappings).

pub mod car;
pub mod event;
pub mod passenger;
pub mod ride_request;

pub use car::CarEntity;
pub use event::EventEntity;
pub use passenger::PassengerEntity;
pub use ride_request::{RidePassengerStatusDb, RideRequestEntity, RideRequestPassengerEntity};
