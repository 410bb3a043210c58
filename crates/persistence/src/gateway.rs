//! PostgreSQL implementation of the storage contract.
//!
//! A [`PgGateway`] owns one open transaction. Nothing it writes is visible
//! to other connections until [`PgGateway::commit`] is called; dropping the
//! gateway rolls everything back.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use domain::models::{
    Car, CarChanges, CarWithPassengers, Event, EventChanges, NewCar, NewEvent, NewPassenger,
    NewRideRequest, Passenger, RideRequest, RideRequestPassenger, RideRequestWithPassengers,
};
use domain::{CarpoolError, CarpoolGateway, CarpoolResult};
use sqlx::{PgPool, Postgres, Transaction};

use crate::entities::{CarEntity, RidePassengerStatusDb, RideRequestEntity};
use crate::repositories::car::CarRow;
use crate::repositories::{
    CarRepository, EventRepository, PassengerRepository, RideRequestRepository,
};

/// Unit of work over a single PostgreSQL transaction.
pub struct PgGateway {
    tx: Transaction<'static, Postgres>,
}

impl PgGateway {
    /// Opens a transaction on a pooled connection.
    pub async fn begin(pool: &PgPool) -> CarpoolResult<Self> {
        let tx = pool.begin().await?;
        Ok(Self { tx })
    }

    pub async fn commit(self) -> CarpoolResult<()> {
        self.tx.commit().await?;
        Ok(())
    }

    pub async fn rollback(self) -> CarpoolResult<()> {
        self.tx.rollback().await?;
        Ok(())
    }

    fn cars(&mut self) -> CarRepository<'_> {
        CarRepository::new(&mut self.tx)
    }

    fn events(&mut self) -> EventRepository<'_> {
        EventRepository::new(&mut self.tx)
    }

    fn passengers(&mut self) -> PassengerRepository<'_> {
        PassengerRepository::new(&mut self.tx)
    }

    fn ride_requests(&mut self) -> RideRequestRepository<'_> {
        RideRequestRepository::new(&mut self.tx)
    }

    /// Attaches seated passengers to cars, keeping the car order.
    async fn with_passengers(&mut self, cars: Vec<CarEntity>) -> CarpoolResult<Vec<CarWithPassengers>> {
        if cars.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<i64> = cars.iter().map(|c| c.id).collect();
        let mut by_car: HashMap<i64, Vec<Passenger>> = HashMap::new();
        for passenger in self.passengers().find_by_car_ids(&ids).await? {
            by_car
                .entry(passenger.car_id)
                .or_default()
                .push(passenger.into());
        }

        Ok(cars
            .into_iter()
            .map(|car| CarWithPassengers {
                passengers: by_car.remove(&car.id).unwrap_or_default(),
                car: car.into(),
            })
            .collect())
    }

    /// Attaches riders to requests, keeping the request order.
    async fn with_riders(
        &mut self,
        requests: Vec<RideRequestEntity>,
    ) -> CarpoolResult<Vec<RideRequestWithPassengers>> {
        if requests.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<i64> = requests.iter().map(|r| r.id).collect();
        let mut by_request: HashMap<i64, Vec<RideRequestPassenger>> = HashMap::new();
        for rider in self.ride_requests().find_passengers_by_request_ids(&ids).await? {
            by_request
                .entry(rider.request_id)
                .or_default()
                .push(rider.into());
        }

        Ok(requests
            .into_iter()
            .map(|request| RideRequestWithPassengers {
                passengers: by_request.remove(&request.id).unwrap_or_default(),
                request: request.into(),
            })
            .collect())
    }
}

fn car_row_from_new(car: &NewCar) -> CarRow<'_> {
    CarRow {
        driver_name: &car.driver_name,
        driver_phone: car.driver_phone.as_deref(),
        driver_email: car.driver_email.as_deref(),
        car_model: &car.car_model,
        pickup_address: car.pickup_address.as_deref(),
        dropoff_address: car.dropoff_address.as_deref(),
        seat_capacity: car.seat_capacity,
        requires_pin: car.requires_pin,
        car_pin: car.car_pin.as_deref(),
    }
}

fn car_row_from_changes(changes: &CarChanges) -> CarRow<'_> {
    CarRow {
        driver_name: &changes.driver_name,
        driver_phone: changes.driver_phone.as_deref(),
        driver_email: changes.driver_email.as_deref(),
        car_model: &changes.car_model,
        pickup_address: changes.pickup_address.as_deref(),
        dropoff_address: changes.dropoff_address.as_deref(),
        seat_capacity: changes.seat_capacity,
        requires_pin: changes.requires_pin,
        car_pin: changes.car_pin.as_deref(),
    }
}

#[async_trait]
impl CarpoolGateway for PgGateway {
    async fn get_event(&mut self, event_id: &str) -> CarpoolResult<Option<Event>> {
        Ok(self.events().find_by_id(event_id).await?.map(Into::into))
    }

    async fn create_event(&mut self, event: NewEvent) -> CarpoolResult<Event> {
        let entity = self
            .events()
            .insert(
                &event.id,
                &event.name,
                event.description.as_deref(),
                event.date,
                event.time,
                event.password_hash.as_deref(),
            )
            .await?;
        Ok(entity.into())
    }

    async fn update_event(
        &mut self,
        event_id: &str,
        changes: EventChanges,
    ) -> CarpoolResult<Option<Event>> {
        let entity = self
            .events()
            .update(
                event_id,
                &changes.name,
                changes.description.as_deref(),
                changes.date,
                changes.time,
            )
            .await?;
        Ok(entity.map(Into::into))
    }

    async fn delete_event(&mut self, event_id: &str) -> CarpoolResult<bool> {
        Ok(self.events().delete(event_id).await?)
    }

    async fn cleanup_expired_events(&mut self, cutoff: NaiveDateTime) -> CarpoolResult<u64> {
        Ok(self.events().delete_started_before(cutoff).await?)
    }

    async fn create_car(&mut self, car: NewCar) -> CarpoolResult<Car> {
        let entity = self
            .cars()
            .insert(&car.event_id, car_row_from_new(&car))
            .await?;
        Ok(entity.into())
    }

    async fn get_car(&mut self, car_id: i64) -> CarpoolResult<Option<CarWithPassengers>> {
        let Some(car) = self.cars().find_by_id_for_update(car_id).await? else {
            return Ok(None);
        };
        Ok(self.with_passengers(vec![car]).await?.pop())
    }

    async fn get_cars_for_event(&mut self, event_id: &str) -> CarpoolResult<Vec<CarWithPassengers>> {
        let cars = self.cars().find_by_event(event_id).await?;
        self.with_passengers(cars).await
    }

    async fn update_car(&mut self, car_id: i64, changes: CarChanges) -> CarpoolResult<Option<Car>> {
        let entity = self
            .cars()
            .update(car_id, car_row_from_changes(&changes))
            .await?;
        Ok(entity.map(Into::into))
    }

    async fn delete_car(&mut self, car_id: i64) -> CarpoolResult<bool> {
        Ok(self.cars().delete(car_id).await?)
    }

    async fn get_car_pin(&mut self, car_id: i64) -> CarpoolResult<Option<String>> {
        Ok(self.cars().find_pin(car_id).await?)
    }

    async fn set_occupied_seats(&mut self, car_id: i64, occupied_seats: i32) -> CarpoolResult<()> {
        let updated = self.cars().set_occupied_seats(car_id, occupied_seats).await?;
        if updated == 0 {
            return Err(CarpoolError::not_found(format!("Car {}", car_id)));
        }
        Ok(())
    }

    async fn list_car_ids(&mut self) -> CarpoolResult<Vec<i64>> {
        Ok(self.cars().list_ids().await?)
    }

    async fn count_passengers(&mut self, car_id: i64) -> CarpoolResult<i64> {
        Ok(self.passengers().count_by_car(car_id).await?)
    }

    async fn add_passenger(&mut self, passenger: NewPassenger) -> CarpoolResult<Passenger> {
        let entity = self
            .passengers()
            .insert(
                passenger.car_id,
                &passenger.name,
                passenger.seat_index,
                passenger.request_passenger_id,
            )
            .await?;
        Ok(entity.into())
    }

    async fn remove_passenger(&mut self, passenger_id: i64) -> CarpoolResult<bool> {
        Ok(self.passengers().delete(passenger_id).await?)
    }

    async fn remove_passengers(&mut self, passenger_ids: &[i64]) -> CarpoolResult<u64> {
        if passenger_ids.is_empty() {
            return Ok(0);
        }
        Ok(self.passengers().delete_many(passenger_ids).await?)
    }

    async fn find_passengers_for_ride_passengers(
        &mut self,
        ride_passenger_ids: &[i64],
    ) -> CarpoolResult<Vec<Passenger>> {
        if ride_passenger_ids.is_empty() {
            return Ok(Vec::new());
        }
        let passengers = self
            .passengers()
            .find_by_request_passenger_ids(ride_passenger_ids)
            .await?;
        Ok(passengers.into_iter().map(Into::into).collect())
    }

    async fn create_ride_request(&mut self, request: NewRideRequest) -> CarpoolResult<RideRequest> {
        let entity = self
            .ride_requests()
            .insert_request(
                &request.event_id,
                &request.contact_name,
                request.contact_phone.as_deref(),
                request.pickup_address.as_deref(),
                request.dropoff_address.as_deref(),
                request.notes.as_deref(),
            )
            .await?;
        Ok(entity.into())
    }

    async fn create_ride_request_passengers(
        &mut self,
        request_id: i64,
        names: &[String],
    ) -> CarpoolResult<Vec<RideRequestPassenger>> {
        if names.is_empty() {
            return Ok(Vec::new());
        }
        let riders = self
            .ride_requests()
            .insert_passengers(request_id, names)
            .await?;
        Ok(riders.into_iter().map(Into::into).collect())
    }

    async fn get_ride_request(
        &mut self,
        request_id: i64,
    ) -> CarpoolResult<Option<RideRequestWithPassengers>> {
        let Some(request) = self.ride_requests().find_request(request_id).await? else {
            return Ok(None);
        };
        Ok(self.with_riders(vec![request]).await?.pop())
    }

    async fn lock_ride_request(
        &mut self,
        request_id: i64,
    ) -> CarpoolResult<Option<RideRequestWithPassengers>> {
        let Some(request) = self.ride_requests().find_request_for_update(request_id).await? else {
            return Ok(None);
        };
        let passengers = self
            .ride_requests()
            .find_passengers_by_request_for_update(request_id)
            .await?
            .into_iter()
            .map(Into::into)
            .collect();
        Ok(Some(RideRequestWithPassengers {
            request: request.into(),
            passengers,
        }))
    }

    async fn get_ride_requests_for_event(
        &mut self,
        event_id: &str,
    ) -> CarpoolResult<Vec<RideRequestWithPassengers>> {
        let requests = self.ride_requests().find_requests_by_event(event_id).await?;
        self.with_riders(requests).await
    }

    async fn delete_ride_request(&mut self, request_id: i64) -> CarpoolResult<bool> {
        Ok(self.ride_requests().delete_request(request_id).await?)
    }

    async fn get_ride_passenger(
        &mut self,
        ride_passenger_id: i64,
    ) -> CarpoolResult<Option<RideRequestPassenger>> {
        let rider = self.ride_requests().find_passenger_for_update(ride_passenger_id).await?;
        Ok(rider.map(Into::into))
    }

    async fn delete_ride_passenger(&mut self, ride_passenger_id: i64) -> CarpoolResult<bool> {
        Ok(self.ride_requests().delete_passenger(ride_passenger_id).await?)
    }

    async fn mark_ride_passenger_assigned(
        &mut self,
        ride_passenger_id: i64,
        car_id: i64,
    ) -> CarpoolResult<()> {
        let updated = self
            .ride_requests()
            .set_passenger_status(ride_passenger_id, RidePassengerStatusDb::Assigned, Some(car_id))
            .await?;
        if updated == 0 {
            return Err(CarpoolError::not_found(format!(
                "Ride passenger {}",
                ride_passenger_id
            )));
        }
        Ok(())
    }

    async fn mark_ride_passenger_waiting(&mut self, ride_passenger_id: i64) -> CarpoolResult<()> {
        let updated = self
            .ride_requests()
            .set_passenger_status(ride_passenger_id, RidePassengerStatusDb::Waiting, None)
            .await?;
        if updated == 0 {
            return Err(CarpoolError::not_found(format!(
                "Ride passenger {}",
                ride_passenger_id
            )));
        }
        Ok(())
    }

    async fn reset_ride_passengers_for_car(&mut self, car_id: i64) -> CarpoolResult<u64> {
        Ok(self.ride_requests().reset_passengers_for_car(car_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_car_row_from_new() {
        let car = NewCar {
            event_id: "EVENT001".into(),
            driver_name: "Dana".into(),
            driver_phone: None,
            driver_email: Some("dana@example.org".into()),
            car_model: "Golf".into(),
            pickup_address: Some("Station".into()),
            dropoff_address: None,
            seat_capacity: 4,
            requires_pin: true,
            car_pin: Some("1234".into()),
        };
        let row = car_row_from_new(&car);
        assert_eq!(row.driver_name, "Dana");
        assert_eq!(row.driver_email, Some("dana@example.org"));
        assert_eq!(row.pickup_address, Some("Station"));
        assert_eq!(row.seat_capacity, 4);
        assert_eq!(row.car_pin, Some("1234"));
    }

    #[test]
    fn test_car_row_from_changes_clears_pin() {
        let changes = CarChanges {
            driver_name: "Dana".into(),
            driver_phone: Some("555".into()),
            driver_email: None,
            car_model: "Golf".into(),
            pickup_address: None,
            dropoff_address: Some("Lake".into()),
            seat_capacity: 5,
            requires_pin: false,
            car_pin: None,
        };
        let row = car_row_from_changes(&changes);
        assert!(!row.requires_pin);
        assert_eq!(row.car_pin, None);
        assert_eq!(row.driver_phone, Some("555"));
        assert_eq!(row.dropoff_address, Some("Lake"));
    }
}
