//! Car repository for database operations.

use sqlx::PgConnection;

use crate::entities::CarEntity;
use crate::metrics::QueryTimer;

const CAR_COLUMNS: &str = "id, event_id, driver_name, driver_phone, driver_email, car_model, \
     pickup_address, dropoff_address, seat_capacity, occupied_seats, requires_pin, \
     created_at, updated_at";

/// Column values of a car row, minus the generated ones.
#[derive(Debug, Clone, Copy)]
pub struct CarRow<'a> {
    pub driver_name: &'a str,
    pub driver_phone: Option<&'a str>,
    pub driver_email: Option<&'a str>,
    pub car_model: &'a str,
    pub pickup_address: Option<&'a str>,
    pub dropoff_address: Option<&'a str>,
    pub seat_capacity: i32,
    pub requires_pin: bool,
    pub car_pin: Option<&'a str>,
}

/// Repository for car-related database operations.
pub struct CarRepository<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> CarRepository<'c> {
    pub fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }

    /// Insert a car with no occupied seats.
    pub async fn insert(&mut self, event_id: &str, row: CarRow<'_>) -> Result<CarEntity, sqlx::Error> {
        let timer = QueryTimer::new("insert_car");
        let result = sqlx::query_as::<_, CarEntity>(&format!(
            r#"
            INSERT INTO cars (
                event_id, driver_name, driver_phone, driver_email, car_model,
                pickup_address, dropoff_address, seat_capacity, occupied_seats,
                requires_pin, car_pin
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 0, $9, $10)
            RETURNING {}
            "#,
            CAR_COLUMNS
        ))
        .bind(event_id)
        .bind(row.driver_name)
        .bind(row.driver_phone)
        .bind(row.driver_email)
        .bind(row.car_model)
        .bind(row.pickup_address)
        .bind(row.dropoff_address)
        .bind(row.seat_capacity)
        .bind(row.requires_pin)
        .bind(row.car_pin)
        .fetch_one(&mut *self.conn)
        .await;
        timer.record();
        result
    }

    /// Find a car and lock its row until the transaction ends.
    pub async fn find_by_id_for_update(&mut self, id: i64) -> Result<Option<CarEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_car_for_update");
        let result = sqlx::query_as::<_, CarEntity>(&format!(
            "SELECT {} FROM cars WHERE id = $1 FOR UPDATE",
            CAR_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&mut *self.conn)
        .await;
        timer.record();
        result
    }

    /// Cars of an event in registration order.
    pub async fn find_by_event(&mut self, event_id: &str) -> Result<Vec<CarEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_cars_by_event");
        let result = sqlx::query_as::<_, CarEntity>(&format!(
            "SELECT {} FROM cars WHERE event_id = $1 ORDER BY created_at, id",
            CAR_COLUMNS
        ))
        .bind(event_id)
        .fetch_all(&mut *self.conn)
        .await;
        timer.record();
        result
    }

    /// Replace the editable fields of a car.
    pub async fn update(&mut self, id: i64, row: CarRow<'_>) -> Result<Option<CarEntity>, sqlx::Error> {
        let timer = QueryTimer::new("update_car");
        let result = sqlx::query_as::<_, CarEntity>(&format!(
            r#"
            UPDATE cars
            SET driver_name = $2, driver_phone = $3, driver_email = $4, car_model = $5,
                pickup_address = $6, dropoff_address = $7, seat_capacity = $8,
                requires_pin = $9, car_pin = $10, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            CAR_COLUMNS
        ))
        .bind(id)
        .bind(row.driver_name)
        .bind(row.driver_phone)
        .bind(row.driver_email)
        .bind(row.car_model)
        .bind(row.pickup_address)
        .bind(row.dropoff_address)
        .bind(row.seat_capacity)
        .bind(row.requires_pin)
        .bind(row.car_pin)
        .fetch_optional(&mut *self.conn)
        .await;
        timer.record();
        result
    }

    /// Delete a car. Its passengers cascade.
    pub async fn delete(&mut self, id: i64) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("delete_car");
        let result = sqlx::query("DELETE FROM cars WHERE id = $1")
            .bind(id)
            .execute(&mut *self.conn)
            .await;
        timer.record();
        Ok(result?.rows_affected() > 0)
    }

    /// Stored PIN of a car, if the car exists and has one.
    pub async fn find_pin(&mut self, id: i64) -> Result<Option<String>, sqlx::Error> {
        let timer = QueryTimer::new("find_car_pin");
        let result = sqlx::query_scalar::<_, Option<String>>("SELECT car_pin FROM cars WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.conn)
            .await;
        timer.record();
        Ok(result?.flatten())
    }

    /// Overwrite the occupied-seat counter. Returns the number of rows updated.
    pub async fn set_occupied_seats(&mut self, id: i64, occupied_seats: i32) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("set_occupied_seats");
        let result = sqlx::query(
            "UPDATE cars SET occupied_seats = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(occupied_seats)
        .execute(&mut *self.conn)
        .await;
        timer.record();
        Ok(result?.rows_affected())
    }

    /// Ids of all cars.
    pub async fn list_ids(&mut self) -> Result<Vec<i64>, sqlx::Error> {
        let timer = QueryTimer::new("list_car_ids");
        let result = sqlx::query_scalar::<_, i64>("SELECT id FROM cars ORDER BY id")
            .fetch_all(&mut *self.conn)
            .await;
        timer.record();
        result
    }
}
