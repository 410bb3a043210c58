//! Seated passenger repository for database operations.

use sqlx::PgConnection;

use crate::entities::PassengerEntity;
use crate::metrics::QueryTimer;

const PASSENGER_COLUMNS: &str = "id, car_id, name, seat_index, request_passenger_id, created_at";

/// Repository for passenger-related database operations.
pub struct PassengerRepository<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> PassengerRepository<'c> {
    pub fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }

    /// Seat a passenger.
    pub async fn insert(
        &mut self,
        car_id: i64,
        name: &str,
        seat_index: i32,
        request_passenger_id: Option<i64>,
    ) -> Result<PassengerEntity, sqlx::Error> {
        let timer = QueryTimer::new("insert_passenger");
        let result = sqlx::query_as::<_, PassengerEntity>(&format!(
            r#"
            INSERT INTO passengers (car_id, name, seat_index, request_passenger_id)
            VALUES ($1, $2, $3, $4)
            RETURNING {}
            "#,
            PASSENGER_COLUMNS
        ))
        .bind(car_id)
        .bind(name)
        .bind(seat_index)
        .bind(request_passenger_id)
        .fetch_one(&mut *self.conn)
        .await;
        timer.record();
        result
    }

    /// Passengers of the given cars, ordered by car then seat index.
    pub async fn find_by_car_ids(&mut self, car_ids: &[i64]) -> Result<Vec<PassengerEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_passengers_by_cars");
        let result = sqlx::query_as::<_, PassengerEntity>(&format!(
            "SELECT {} FROM passengers WHERE car_id = ANY($1) ORDER BY car_id, seat_index",
            PASSENGER_COLUMNS
        ))
        .bind(car_ids)
        .fetch_all(&mut *self.conn)
        .await;
        timer.record();
        result
    }

    /// Passengers seated from any of the given ride-request riders.
    pub async fn find_by_request_passenger_ids(
        &mut self,
        ride_passenger_ids: &[i64],
    ) -> Result<Vec<PassengerEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_passengers_by_ride_passengers");
        let result = sqlx::query_as::<_, PassengerEntity>(&format!(
            "SELECT {} FROM passengers WHERE request_passenger_id = ANY($1) ORDER BY id",
            PASSENGER_COLUMNS
        ))
        .bind(ride_passenger_ids)
        .fetch_all(&mut *self.conn)
        .await;
        timer.record();
        result
    }

    pub async fn delete(&mut self, id: i64) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("delete_passenger");
        let result = sqlx::query("DELETE FROM passengers WHERE id = $1")
            .bind(id)
            .execute(&mut *self.conn)
            .await;
        timer.record();
        Ok(result?.rows_affected() > 0)
    }

    pub async fn delete_many(&mut self, ids: &[i64]) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("delete_passengers");
        let result = sqlx::query("DELETE FROM passengers WHERE id = ANY($1)")
            .bind(ids)
            .execute(&mut *self.conn)
            .await;
        timer.record();
        Ok(result?.rows_affected())
    }

    /// Number of passengers seated in a car.
    pub async fn count_by_car(&mut self, car_id: i64) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_passengers_by_car");
        let result = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM passengers WHERE car_id = $1")
            .bind(car_id)
            .fetch_one(&mut *self.conn)
            .await;
        timer.record();
        result
    }
}
