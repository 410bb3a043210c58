//! Car entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database row mapping for the cars table, without the PIN column.
#[derive(Debug, Clone, FromRow)]
pub struct CarEntity {
    pub id: i64,
    pub event_id: String,
    pub driver_name: String,
    pub driver_phone: Option<String>,
    pub driver_email: Option<String>,
    pub car_model: String,
    pub pickup_address: Option<String>,
    pub dropoff_address: Option<String>,
    pub seat_capacity: i32,
    pub occupied_seats: i32,
    pub requires_pin: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<CarEntity> for domain::models::Car {
    fn from(entity: CarEntity) -> Self {
        Self {
            id: entity.id,
            event_id: entity.event_id,
            driver_name: entity.driver_name,
            driver_phone: entity.driver_phone,
            driver_email: entity.driver_email,
            car_model: entity.car_model,
            pickup_address: entity.pickup_address,
            dropoff_address: entity.dropoff_address,
            seat_capacity: entity.seat_capacity,
            occupied_seats: entity.occupied_seats,
            requires_pin: entity.requires_pin,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}
