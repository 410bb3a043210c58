//! Domain models for the carpool backend.

pub mod car;
pub mod event;
pub mod passenger;
pub mod ride_request;

pub use car::{Car, CarChanges, CarWithPassengers, NewCar};
pub use event::{Event, EventChanges, EventDetails, NewEvent};
pub use passenger::{NewPassenger, Passenger};
pub use ride_request::{
    NewRideRequest, RidePassengerStatus, RideRequest, RideRequestPassenger,
    RideRequestWithPassengers,
};
