//! Seated passenger entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database row mapping for the passengers table.
#[derive(Debug, Clone, FromRow)]
pub struct PassengerEntity {
    pub id: i64,
    pub car_id: i64,
    pub name: String,
    pub seat_index: i32,
    pub request_passenger_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl From<PassengerEntity> for domain::models::Passenger {
    fn from(entity: PassengerEntity) -> Self {
        Self {
            id: entity.id,
            car_id: entity.car_id,
            name: entity.name,
            seat_index: entity.seat_index,
            request_passenger_id: entity.request_passenger_id,
            created_at: entity.created_at,
        }
    }
}
