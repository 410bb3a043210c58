//! In-memory gateway for tests and local experimentation.
//!
//! Emulates the relational rules of the PostgreSQL schema: cascading deletes
//! (event → cars → passengers, event → ride requests → riders), `SET NULL` on
//! the rider ↔ car and passenger ↔ rider links, the unique seat index per car
//! and the occupied-seat range check. Constraint violations surface as
//! [`CarpoolError::Transport`], as a database error would.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};

use super::CarpoolGateway;
use crate::error::{CarpoolError, CarpoolResult};
use crate::models::{
    Car, CarChanges, CarWithPassengers, Event, EventChanges, NewCar, NewEvent, NewPassenger,
    NewRideRequest, Passenger, RidePassengerStatus, RideRequest, RideRequestPassenger,
    RideRequestWithPassengers,
};

#[derive(Debug, Clone)]
struct StoredCar {
    car: Car,
    pin: Option<String>,
}

/// Gateway holding all records in ordered maps. Ids are handed out from a
/// single increasing counter, so map order equals creation order.
#[derive(Debug, Clone, Default)]
pub struct InMemoryGateway {
    events: BTreeMap<String, Event>,
    cars: BTreeMap<i64, StoredCar>,
    passengers: BTreeMap<i64, Passenger>,
    ride_requests: BTreeMap<i64, RideRequest>,
    ride_passengers: BTreeMap<i64, RideRequestPassenger>,
    last_id: i64,
}

fn constraint(message: impl Into<String>) -> CarpoolError {
    CarpoolError::Transport(message.into())
}

impl InMemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }

    fn car_with_passengers(&self, car: &Car) -> CarWithPassengers {
        let mut passengers: Vec<Passenger> = self
            .passengers
            .values()
            .filter(|p| p.car_id == car.id)
            .cloned()
            .collect();
        passengers.sort_by_key(|p| p.seat_index);
        CarWithPassengers {
            car: car.clone(),
            passengers,
        }
    }

    fn request_with_passengers(&self, request: &RideRequest) -> RideRequestWithPassengers {
        RideRequestWithPassengers {
            request: request.clone(),
            passengers: self
                .ride_passengers
                .values()
                .filter(|p| p.request_id == request.id)
                .cloned()
                .collect(),
        }
    }

    fn cascade_delete_car(&mut self, car_id: i64) -> bool {
        if self.cars.remove(&car_id).is_none() {
            return false;
        }
        self.passengers.retain(|_, p| p.car_id != car_id);
        for rider in self.ride_passengers.values_mut() {
            if rider.assigned_car_id == Some(car_id) {
                rider.assigned_car_id = None;
            }
        }
        true
    }

    fn cascade_delete_ride_passenger(&mut self, ride_passenger_id: i64) -> bool {
        if self.ride_passengers.remove(&ride_passenger_id).is_none() {
            return false;
        }
        for passenger in self.passengers.values_mut() {
            if passenger.request_passenger_id == Some(ride_passenger_id) {
                passenger.request_passenger_id = None;
            }
        }
        true
    }

    fn cascade_delete_ride_request(&mut self, request_id: i64) -> bool {
        if self.ride_requests.remove(&request_id).is_none() {
            return false;
        }
        let riders: Vec<i64> = self
            .ride_passengers
            .values()
            .filter(|p| p.request_id == request_id)
            .map(|p| p.id)
            .collect();
        for rider in riders {
            self.cascade_delete_ride_passenger(rider);
        }
        true
    }

    fn cascade_delete_event(&mut self, event_id: &str) -> bool {
        if self.events.remove(event_id).is_none() {
            return false;
        }
        let cars: Vec<i64> = self
            .cars
            .values()
            .filter(|c| c.car.event_id == event_id)
            .map(|c| c.car.id)
            .collect();
        for car in cars {
            self.cascade_delete_car(car);
        }
        let requests: Vec<i64> = self
            .ride_requests
            .values()
            .filter(|r| r.event_id == event_id)
            .map(|r| r.id)
            .collect();
        for request in requests {
            self.cascade_delete_ride_request(request);
        }
        true
    }

    fn check_pin(requires_pin: bool, pin: &Option<String>) -> CarpoolResult<()> {
        if requires_pin && pin.as_deref().map_or(true, |p| p.chars().count() < 4) {
            return Err(constraint("car_pin_required check violated"));
        }
        Ok(())
    }
}

#[async_trait]
impl CarpoolGateway for InMemoryGateway {
    async fn get_event(&mut self, event_id: &str) -> CarpoolResult<Option<Event>> {
        Ok(self.events.get(event_id).cloned())
    }

    async fn create_event(&mut self, event: NewEvent) -> CarpoolResult<Event> {
        if self.events.contains_key(&event.id) {
            return Err(constraint(format!("duplicate event id {}", event.id)));
        }
        let now = Utc::now();
        let stored = Event {
            id: event.id,
            name: event.name,
            description: event.description,
            date: event.date,
            time: event.time,
            password_hash: event.password_hash,
            created_at: now,
            updated_at: now,
        };
        self.events.insert(stored.id.clone(), stored.clone());
        Ok(stored)
    }

    async fn update_event(
        &mut self,
        event_id: &str,
        changes: EventChanges,
    ) -> CarpoolResult<Option<Event>> {
        Ok(self.events.get_mut(event_id).map(|event| {
            event.name = changes.name;
            event.description = changes.description;
            event.date = changes.date;
            event.time = changes.time;
            event.updated_at = Utc::now();
            event.clone()
        }))
    }

    async fn delete_event(&mut self, event_id: &str) -> CarpoolResult<bool> {
        Ok(self.cascade_delete_event(event_id))
    }

    async fn cleanup_expired_events(&mut self, cutoff: NaiveDateTime) -> CarpoolResult<u64> {
        let expired: Vec<String> = self
            .events
            .values()
            .filter(|e| e.starts_at() < cutoff)
            .map(|e| e.id.clone())
            .collect();
        for event_id in &expired {
            self.cascade_delete_event(event_id);
        }
        Ok(expired.len() as u64)
    }

    async fn create_car(&mut self, car: NewCar) -> CarpoolResult<Car> {
        if !self.events.contains_key(&car.event_id) {
            return Err(constraint(format!("event {} does not exist", car.event_id)));
        }
        if !(1..=8).contains(&car.seat_capacity) {
            return Err(constraint("seat_capacity check violated"));
        }
        Self::check_pin(car.requires_pin, &car.car_pin)?;

        let now = Utc::now();
        let stored = Car {
            id: self.next_id(),
            event_id: car.event_id,
            driver_name: car.driver_name,
            driver_phone: car.driver_phone,
            driver_email: car.driver_email,
            car_model: car.car_model,
            pickup_address: car.pickup_address,
            dropoff_address: car.dropoff_address,
            seat_capacity: car.seat_capacity,
            occupied_seats: 0,
            requires_pin: car.requires_pin,
            created_at: now,
            updated_at: now,
        };
        self.cars.insert(
            stored.id,
            StoredCar {
                car: stored.clone(),
                pin: car.car_pin,
            },
        );
        Ok(stored)
    }

    async fn get_car(&mut self, car_id: i64) -> CarpoolResult<Option<CarWithPassengers>> {
        Ok(self
            .cars
            .get(&car_id)
            .map(|stored| self.car_with_passengers(&stored.car)))
    }

    async fn get_cars_for_event(
        &mut self,
        event_id: &str,
    ) -> CarpoolResult<Vec<CarWithPassengers>> {
        Ok(self
            .cars
            .values()
            .filter(|stored| stored.car.event_id == event_id)
            .map(|stored| self.car_with_passengers(&stored.car))
            .collect())
    }

    async fn update_car(&mut self, car_id: i64, changes: CarChanges) -> CarpoolResult<Option<Car>> {
        let Some(stored) = self.cars.get_mut(&car_id) else {
            return Ok(None);
        };
        if !(1..=8).contains(&changes.seat_capacity)
            || stored.car.occupied_seats > changes.seat_capacity
        {
            return Err(constraint("seat_capacity check violated"));
        }
        Self::check_pin(changes.requires_pin, &changes.car_pin)?;

        let car = &mut stored.car;
        car.driver_name = changes.driver_name;
        car.driver_phone = changes.driver_phone;
        car.driver_email = changes.driver_email;
        car.car_model = changes.car_model;
        car.pickup_address = changes.pickup_address;
        car.dropoff_address = changes.dropoff_address;
        car.seat_capacity = changes.seat_capacity;
        car.requires_pin = changes.requires_pin;
        car.updated_at = Utc::now();
        stored.pin = changes.car_pin;
        Ok(Some(stored.car.clone()))
    }

    async fn delete_car(&mut self, car_id: i64) -> CarpoolResult<bool> {
        Ok(self.cascade_delete_car(car_id))
    }

    async fn get_car_pin(&mut self, car_id: i64) -> CarpoolResult<Option<String>> {
        Ok(self.cars.get(&car_id).and_then(|stored| stored.pin.clone()))
    }

    async fn set_occupied_seats(&mut self, car_id: i64, occupied_seats: i32) -> CarpoolResult<()> {
        let stored = self
            .cars
            .get_mut(&car_id)
            .ok_or_else(|| CarpoolError::not_found(format!("Car {}", car_id)))?;
        if occupied_seats < 0 || occupied_seats > stored.car.seat_capacity {
            return Err(constraint("occupied_seats check violated"));
        }
        stored.car.occupied_seats = occupied_seats;
        stored.car.updated_at = Utc::now();
        Ok(())
    }

    async fn list_car_ids(&mut self) -> CarpoolResult<Vec<i64>> {
        Ok(self.cars.keys().copied().collect())
    }

    async fn count_passengers(&mut self, car_id: i64) -> CarpoolResult<i64> {
        Ok(self.passengers.values().filter(|p| p.car_id == car_id).count() as i64)
    }

    async fn add_passenger(&mut self, passenger: NewPassenger) -> CarpoolResult<Passenger> {
        if !self.cars.contains_key(&passenger.car_id) {
            return Err(constraint(format!("car {} does not exist", passenger.car_id)));
        }
        if passenger.seat_index < 0 {
            return Err(constraint("seat_index check violated"));
        }
        if self
            .passengers
            .values()
            .any(|p| p.car_id == passenger.car_id && p.seat_index == passenger.seat_index)
        {
            return Err(constraint(format!(
                "seat {} of car {} already taken",
                passenger.seat_index, passenger.car_id
            )));
        }
        if let Some(rider) = passenger.request_passenger_id {
            if !self.ride_passengers.contains_key(&rider) {
                return Err(constraint(format!("ride passenger {} does not exist", rider)));
            }
        }

        let stored = Passenger {
            id: self.next_id(),
            car_id: passenger.car_id,
            name: passenger.name,
            seat_index: passenger.seat_index,
            request_passenger_id: passenger.request_passenger_id,
            created_at: Utc::now(),
        };
        self.passengers.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn remove_passenger(&mut self, passenger_id: i64) -> CarpoolResult<bool> {
        Ok(self.passengers.remove(&passenger_id).is_some())
    }

    async fn remove_passengers(&mut self, passenger_ids: &[i64]) -> CarpoolResult<u64> {
        Ok(passenger_ids
            .iter()
            .filter(|id| self.passengers.remove(*id).is_some())
            .count() as u64)
    }

    async fn find_passengers_for_ride_passengers(
        &mut self,
        ride_passenger_ids: &[i64],
    ) -> CarpoolResult<Vec<Passenger>> {
        Ok(self
            .passengers
            .values()
            .filter(|p| {
                p.request_passenger_id
                    .map_or(false, |rider| ride_passenger_ids.contains(&rider))
            })
            .cloned()
            .collect())
    }

    async fn create_ride_request(&mut self, request: NewRideRequest) -> CarpoolResult<RideRequest> {
        if !self.events.contains_key(&request.event_id) {
            return Err(constraint(format!("event {} does not exist", request.event_id)));
        }
        let stored = RideRequest {
            id: self.next_id(),
            event_id: request.event_id,
            contact_name: request.contact_name,
            contact_phone: request.contact_phone,
            pickup_address: request.pickup_address,
            dropoff_address: request.dropoff_address,
            notes: request.notes,
            created_at: Utc::now(),
        };
        self.ride_requests.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn create_ride_request_passengers(
        &mut self,
        request_id: i64,
        names: &[String],
    ) -> CarpoolResult<Vec<RideRequestPassenger>> {
        if !self.ride_requests.contains_key(&request_id) {
            return Err(constraint(format!("ride request {} does not exist", request_id)));
        }
        let mut created = Vec::with_capacity(names.len());
        for name in names {
            let rider = RideRequestPassenger {
                id: self.next_id(),
                request_id,
                name: name.clone(),
                status: RidePassengerStatus::Waiting,
                assigned_car_id: None,
                created_at: Utc::now(),
            };
            self.ride_passengers.insert(rider.id, rider.clone());
            created.push(rider);
        }
        Ok(created)
    }

    async fn get_ride_request(
        &mut self,
        request_id: i64,
    ) -> CarpoolResult<Option<RideRequestWithPassengers>> {
        Ok(self
            .ride_requests
            .get(&request_id)
            .map(|request| self.request_with_passengers(request)))
    }

    async fn lock_ride_request(
        &mut self,
        request_id: i64,
    ) -> CarpoolResult<Option<RideRequestWithPassengers>> {
        self.get_ride_request(request_id).await
    }

    async fn get_ride_requests_for_event(
        &mut self,
        event_id: &str,
    ) -> CarpoolResult<Vec<RideRequestWithPassengers>> {
        Ok(self
            .ride_requests
            .values()
            .filter(|r| r.event_id == event_id)
            .map(|r| self.request_with_passengers(r))
            .collect())
    }

    async fn delete_ride_request(&mut self, request_id: i64) -> CarpoolResult<bool> {
        Ok(self.cascade_delete_ride_request(request_id))
    }

    async fn get_ride_passenger(
        &mut self,
        ride_passenger_id: i64,
    ) -> CarpoolResult<Option<RideRequestPassenger>> {
        Ok(self.ride_passengers.get(&ride_passenger_id).cloned())
    }

    async fn delete_ride_passenger(&mut self, ride_passenger_id: i64) -> CarpoolResult<bool> {
        Ok(self.cascade_delete_ride_passenger(ride_passenger_id))
    }

    async fn mark_ride_passenger_assigned(
        &mut self,
        ride_passenger_id: i64,
        car_id: i64,
    ) -> CarpoolResult<()> {
        if !self.cars.contains_key(&car_id) {
            return Err(constraint(format!("car {} does not exist", car_id)));
        }
        let rider = self
            .ride_passengers
            .get_mut(&ride_passenger_id)
            .ok_or_else(|| CarpoolError::not_found(format!("Ride passenger {}", ride_passenger_id)))?;
        rider.status = RidePassengerStatus::Assigned;
        rider.assigned_car_id = Some(car_id);
        Ok(())
    }

    async fn mark_ride_passenger_waiting(&mut self, ride_passenger_id: i64) -> CarpoolResult<()> {
        let rider = self
            .ride_passengers
            .get_mut(&ride_passenger_id)
            .ok_or_else(|| CarpoolError::not_found(format!("Ride passenger {}", ride_passenger_id)))?;
        rider.status = RidePassengerStatus::Waiting;
        rider.assigned_car_id = None;
        Ok(())
    }

    async fn reset_ride_passengers_for_car(&mut self, car_id: i64) -> CarpoolResult<u64> {
        let mut reset = 0;
        for rider in self.ride_passengers.values_mut() {
            if rider.assigned_car_id == Some(car_id) {
                rider.status = RidePassengerStatus::Waiting;
                rider.assigned_car_id = None;
                reset += 1;
            }
        }
        Ok(reset)
    }
}
