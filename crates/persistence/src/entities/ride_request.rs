//! Ride request entities (database row mappings).

use chrono::{DateTime, Utc};
use domain::models::RidePassengerStatus;
use sqlx::FromRow;

/// Database enum for ride_passenger_status that maps to PostgreSQL enum type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "ride_passenger_status", rename_all = "lowercase")]
pub enum RidePassengerStatusDb {
    Waiting,
    Assigned,
}

impl From<RidePassengerStatusDb> for RidePassengerStatus {
    fn from(db_status: RidePassengerStatusDb) -> Self {
        match db_status {
            RidePassengerStatusDb::Waiting => RidePassengerStatus::Waiting,
            RidePassengerStatusDb::Assigned => RidePassengerStatus::Assigned,
        }
    }
}

impl From<RidePassengerStatus> for RidePassengerStatusDb {
    fn from(status: RidePassengerStatus) -> Self {
        match status {
            RidePassengerStatus::Waiting => RidePassengerStatusDb::Waiting,
            RidePassengerStatus::Assigned => RidePassengerStatusDb::Assigned,
        }
    }
}

/// Database row mapping for the ride_requests table.
#[derive(Debug, Clone, FromRow)]
pub struct RideRequestEntity {
    pub id: i64,
    pub event_id: String,
    pub contact_name: String,
    pub contact_phone: Option<String>,
    pub pickup_address: Option<String>,
    pub dropoff_address: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<RideRequestEntity> for domain::models::RideRequest {
    fn from(entity: RideRequestEntity) -> Self {
        Self {
            id: entity.id,
            event_id: entity.event_id,
            contact_name: entity.contact_name,
            contact_phone: entity.contact_phone,
            pickup_address: entity.pickup_address,
            dropoff_address: entity.dropoff_address,
            notes: entity.notes,
            created_at: entity.created_at,
        }
    }
}

/// Database row mapping for the ride_request_passengers table.
#[derive(Debug, Clone, FromRow)]
pub struct RideRequestPassengerEntity {
    pub id: i64,
    pub request_id: i64,
    pub name: String,
    pub status: RidePassengerStatusDb,
    pub assigned_car_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl From<RideRequestPassengerEntity> for domain::models::RideRequestPassenger {
    fn from(entity: RideRequestPassengerEntity) -> Self {
        Self {
            id: entity.id,
            request_id: entity.request_id,
            name: entity.name,
            status: entity.status.into(),
            assigned_car_id: entity.assigned_car_id,
            created_at: entity.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_conversion() {
        assert_eq!(
            RidePassengerStatus::from(RidePassengerStatusDb::Waiting),
            RidePassengerStatus::Waiting
        );
        assert_eq!(
            RidePassengerStatusDb::from(RidePassengerStatus::Assigned),
            RidePassengerStatusDb::Assigned
        );
    }

    #[test]
    fn test_ride_passenger_entity_conversion() {
        let entity = RideRequestPassengerEntity {
            id: 5,
            request_id: 2,
            name: "Ben".into(),
            status: RidePassengerStatusDb::Assigned,
            assigned_car_id: Some(9),
            created_at: Utc::now(),
        };
        let rider: domain::models::RideRequestPassenger = entity.into();
        assert_eq!(rider.status, RidePassengerStatus::Assigned);
        assert_eq!(rider.assigned_car_id, Some(9));
        assert!(!rider.is_waiting());
    }
}
