//! Storage contract used by the seat ledger and the registries.
//!
//! A gateway value is one unit of work: every read and write of a single
//! operation goes through the same `&mut` gateway, and the caller decides
//! whether to commit it. The PostgreSQL implementation lives in the
//! `persistence` crate; [`InMemoryGateway`] backs the domain tests.

mod memory;

pub use memory::InMemoryGateway;

use async_trait::async_trait;
use chrono::NaiveDateTime;

use crate::error::CarpoolResult;
use crate::models::{
    Car, CarChanges, CarWithPassengers, Event, EventChanges, NewCar, NewEvent, NewPassenger,
    NewRideRequest, Passenger, RideRequest, RideRequestPassenger, RideRequestWithPassengers,
};

#[async_trait]
pub trait CarpoolGateway: Send {
    // Events

    async fn get_event(&mut self, event_id: &str) -> CarpoolResult<Option<Event>>;

    async fn create_event(&mut self, event: NewEvent) -> CarpoolResult<Event>;

    async fn update_event(
        &mut self,
        event_id: &str,
        changes: EventChanges,
    ) -> CarpoolResult<Option<Event>>;

    /// Deletes the event together with its cars, passengers and ride requests.
    async fn delete_event(&mut self, event_id: &str) -> CarpoolResult<bool>;

    /// Deletes every event whose date and time is earlier than `cutoff`.
    async fn cleanup_expired_events(&mut self, cutoff: NaiveDateTime) -> CarpoolResult<u64>;

    // Cars

    async fn create_car(&mut self, car: NewCar) -> CarpoolResult<Car>;

    /// Loads a car with its seated passengers. The car stays locked against
    /// concurrent mutation until the unit of work ends.
    async fn get_car(&mut self, car_id: i64) -> CarpoolResult<Option<CarWithPassengers>>;

    async fn get_cars_for_event(&mut self, event_id: &str)
        -> CarpoolResult<Vec<CarWithPassengers>>;

    async fn update_car(&mut self, car_id: i64, changes: CarChanges) -> CarpoolResult<Option<Car>>;

    /// Deletes the car; its passengers go with it and ride-request riders
    /// lose their assigned-car reference.
    async fn delete_car(&mut self, car_id: i64) -> CarpoolResult<bool>;

    /// Stored PIN of the car. `None` when the car has no PIN or does not exist.
    async fn get_car_pin(&mut self, car_id: i64) -> CarpoolResult<Option<String>>;

    async fn set_occupied_seats(&mut self, car_id: i64, occupied_seats: i32) -> CarpoolResult<()>;

    async fn list_car_ids(&mut self) -> CarpoolResult<Vec<i64>>;

    async fn count_passengers(&mut self, car_id: i64) -> CarpoolResult<i64>;

    // Seated passengers

    async fn add_passenger(&mut self, passenger: NewPassenger) -> CarpoolResult<Passenger>;

    async fn remove_passenger(&mut self, passenger_id: i64) -> CarpoolResult<bool>;

    async fn remove_passengers(&mut self, passenger_ids: &[i64]) -> CarpoolResult<u64>;

    /// Seated passengers whose ride-request link points at one of the given riders.
    async fn find_passengers_for_ride_passengers(
        &mut self,
        ride_passenger_ids: &[i64],
    ) -> CarpoolResult<Vec<Passenger>>;

    // Ride requests

    async fn create_ride_request(&mut self, request: NewRideRequest) -> CarpoolResult<RideRequest>;

    /// Inserts the riders of a request, all `waiting`, preserving order.
    async fn create_ride_request_passengers(
        &mut self,
        request_id: i64,
        names: &[String],
    ) -> CarpoolResult<Vec<RideRequestPassenger>>;

    async fn get_ride_request(
        &mut self,
        request_id: i64,
    ) -> CarpoolResult<Option<RideRequestWithPassengers>>;

    /// Loads a ride request and locks it with its riders until the unit of
    /// work ends.
    async fn lock_ride_request(
        &mut self,
        request_id: i64,
    ) -> CarpoolResult<Option<RideRequestWithPassengers>>;

    async fn get_ride_requests_for_event(
        &mut self,
        event_id: &str,
    ) -> CarpoolResult<Vec<RideRequestWithPassengers>>;

    /// Deletes the request together with its riders.
    async fn delete_ride_request(&mut self, request_id: i64) -> CarpoolResult<bool>;

    /// Loads a rider and locks it until the unit of work ends, so its status
    /// cannot change underneath an assignment.
    async fn get_ride_passenger(
        &mut self,
        ride_passenger_id: i64,
    ) -> CarpoolResult<Option<RideRequestPassenger>>;

    async fn delete_ride_passenger(&mut self, ride_passenger_id: i64) -> CarpoolResult<bool>;

    async fn mark_ride_passenger_assigned(
        &mut self,
        ride_passenger_id: i64,
        car_id: i64,
    ) -> CarpoolResult<()>;

    async fn mark_ride_passenger_waiting(&mut self, ride_passenger_id: i64) -> CarpoolResult<()>;

    /// Puts every rider assigned to the car back on the waiting list.
    async fn reset_ride_passengers_for_car(&mut self, car_id: i64) -> CarpoolResult<u64>;
}
