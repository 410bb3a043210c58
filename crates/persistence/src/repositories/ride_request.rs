//! Ride request repository for database operations.

use sqlx::PgConnection;

use crate::entities::{RidePassengerStatusDb, RideRequestEntity, RideRequestPassengerEntity};
use crate::metrics::QueryTimer;

const REQUEST_COLUMNS: &str =
    "id, event_id, contact_name, contact_phone, pickup_address, dropoff_address, notes, created_at";

const RIDER_COLUMNS: &str = "id, request_id, name, status, assigned_car_id, created_at";

/// Repository for ride requests and their riders.
pub struct RideRequestRepository<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> RideRequestRepository<'c> {
    pub fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }

    pub async fn insert_request(
        &mut self,
        event_id: &str,
        contact_name: &str,
        contact_phone: Option<&str>,
        pickup_address: Option<&str>,
        dropoff_address: Option<&str>,
        notes: Option<&str>,
    ) -> Result<RideRequestEntity, sqlx::Error> {
        let timer = QueryTimer::new("insert_ride_request");
        let result = sqlx::query_as::<_, RideRequestEntity>(&format!(
            r#"
            INSERT INTO ride_requests (
                event_id, contact_name, contact_phone, pickup_address, dropoff_address, notes
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            REQUEST_COLUMNS
        ))
        .bind(event_id)
        .bind(contact_name)
        .bind(contact_phone)
        .bind(pickup_address)
        .bind(dropoff_address)
        .bind(notes)
        .fetch_one(&mut *self.conn)
        .await;
        timer.record();
        result
    }

    /// Insert all riders of a request in one statement, preserving order.
    pub async fn insert_passengers(
        &mut self,
        request_id: i64,
        names: &[String],
    ) -> Result<Vec<RideRequestPassengerEntity>, sqlx::Error> {
        let timer = QueryTimer::new("insert_ride_request_passengers");
        let result = sqlx::query_as::<_, RideRequestPassengerEntity>(&format!(
            r#"
            INSERT INTO ride_request_passengers (request_id, name, status)
            SELECT $1, rider.name, $3
            FROM UNNEST($2::varchar[]) WITH ORDINALITY AS rider(name, position)
            ORDER BY rider.position
            RETURNING {}
            "#,
            RIDER_COLUMNS
        ))
        .bind(request_id)
        .bind(names)
        .bind(RidePassengerStatusDb::Waiting)
        .fetch_all(&mut *self.conn)
        .await;
        timer.record();

        let mut riders = result?;
        riders.sort_by_key(|r| r.id);
        Ok(riders)
    }

    pub async fn find_request(&mut self, id: i64) -> Result<Option<RideRequestEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_ride_request");
        let result = sqlx::query_as::<_, RideRequestEntity>(&format!(
            "SELECT {} FROM ride_requests WHERE id = $1",
            REQUEST_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&mut *self.conn)
        .await;
        timer.record();
        result
    }

    pub async fn find_request_for_update(
        &mut self,
        id: i64,
    ) -> Result<Option<RideRequestEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_ride_request_for_update");
        let result = sqlx::query_as::<_, RideRequestEntity>(&format!(
            "SELECT {} FROM ride_requests WHERE id = $1 FOR UPDATE",
            REQUEST_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&mut *self.conn)
        .await;
        timer.record();
        result
    }

    /// Ride requests of an event in creation order.
    pub async fn find_requests_by_event(
        &mut self,
        event_id: &str,
    ) -> Result<Vec<RideRequestEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_ride_requests_by_event");
        let result = sqlx::query_as::<_, RideRequestEntity>(&format!(
            "SELECT {} FROM ride_requests WHERE event_id = $1 ORDER BY created_at, id",
            REQUEST_COLUMNS
        ))
        .bind(event_id)
        .fetch_all(&mut *self.conn)
        .await;
        timer.record();
        result
    }

    /// Riders of the given requests in creation order.
    pub async fn find_passengers_by_request_ids(
        &mut self,
        request_ids: &[i64],
    ) -> Result<Vec<RideRequestPassengerEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_ride_passengers_by_requests");
        let result = sqlx::query_as::<_, RideRequestPassengerEntity>(&format!(
            "SELECT {} FROM ride_request_passengers WHERE request_id = ANY($1) ORDER BY id",
            RIDER_COLUMNS
        ))
        .bind(request_ids)
        .fetch_all(&mut *self.conn)
        .await;
        timer.record();
        result
    }

    /// Riders of one request, locked in id order.
    pub async fn find_passengers_by_request_for_update(
        &mut self,
        request_id: i64,
    ) -> Result<Vec<RideRequestPassengerEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_ride_passengers_for_update");
        let result = sqlx::query_as::<_, RideRequestPassengerEntity>(&format!(
            "SELECT {} FROM ride_request_passengers WHERE request_id = $1 ORDER BY id FOR UPDATE",
            RIDER_COLUMNS
        ))
        .bind(request_id)
        .fetch_all(&mut *self.conn)
        .await;
        timer.record();
        result
    }

    /// Delete a request. Its riders cascade.
    pub async fn delete_request(&mut self, id: i64) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("delete_ride_request");
        let result = sqlx::query("DELETE FROM ride_requests WHERE id = $1")
            .bind(id)
            .execute(&mut *self.conn)
            .await;
        timer.record();
        Ok(result?.rows_affected() > 0)
    }

    /// Rider by id, row-locked until the transaction ends.
    pub async fn find_passenger_for_update(
        &mut self,
        id: i64,
    ) -> Result<Option<RideRequestPassengerEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_ride_passenger_for_update");
        let result = sqlx::query_as::<_, RideRequestPassengerEntity>(&format!(
            "SELECT {} FROM ride_request_passengers WHERE id = $1 FOR UPDATE",
            RIDER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&mut *self.conn)
        .await;
        timer.record();
        result
    }

    pub async fn delete_passenger(&mut self, id: i64) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("delete_ride_passenger");
        let result = sqlx::query("DELETE FROM ride_request_passengers WHERE id = $1")
            .bind(id)
            .execute(&mut *self.conn)
            .await;
        timer.record();
        Ok(result?.rows_affected() > 0)
    }

    /// Set a rider's status and car. Returns the number of rows updated.
    pub async fn set_passenger_status(
        &mut self,
        id: i64,
        status: RidePassengerStatusDb,
        assigned_car_id: Option<i64>,
    ) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("set_ride_passenger_status");
        let result = sqlx::query(
            "UPDATE ride_request_passengers SET status = $2, assigned_car_id = $3 WHERE id = $1",
        )
        .bind(id)
        .bind(status)
        .bind(assigned_car_id)
        .execute(&mut *self.conn)
        .await;
        timer.record();
        Ok(result?.rows_affected())
    }

    /// Put every rider assigned to a car back on the waiting list.
    pub async fn reset_passengers_for_car(&mut self, car_id: i64) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("reset_ride_passengers_for_car");
        let result = sqlx::query(
            r#"
            UPDATE ride_request_passengers
            SET status = $2, assigned_car_id = NULL
            WHERE assigned_car_id = $1
            "#,
        )
        .bind(car_id)
        .bind(RidePassengerStatusDb::Waiting)
        .execute(&mut *self.conn)
        .await;
        timer.record();
        Ok(result?.rows_affected())
    }
}
