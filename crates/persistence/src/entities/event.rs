//! Event entity (database row mapping).

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sqlx::FromRow;

/// Database row mapping for the events table.
#[derive(Debug, Clone, FromRow)]
pub struct EventEntity {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub password_hash: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<EventEntity> for domain::models::Event {
    fn from(entity: EventEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            description: entity.description,
            date: entity.date,
            time: entity.time,
            password_hash: entity.password_hash,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}
