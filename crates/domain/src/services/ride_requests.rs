//! Ride requests: the waiting list of riders without a seat.

use tracing::info;
use validator::Validate;

use crate::error::{CarpoolError, CarpoolResult};
use crate::gateway::CarpoolGateway;
use crate::models::ride_request::CreateRideRequestRequest;
use crate::models::{NewRideRequest, RideRequestWithPassengers};
use crate::services::event_registry::require_event;

fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Files a ride request. All riders start out waiting.
pub async fn create_ride_request<G>(
    gateway: &mut G,
    event_id: &str,
    request: CreateRideRequestRequest,
) -> CarpoolResult<RideRequestWithPassengers>
where
    G: CarpoolGateway + ?Sized,
{
    request.validate()?;
    let event = require_event(gateway, event_id).await?;

    let names = request.rider_names();
    if names.is_empty() {
        return Err(CarpoolError::validation("At least one rider name is required"));
    }
    for name in &names {
        shared::validation::validate_name_length(name)
            .map_err(|_| CarpoolError::validation("Rider names must be at most 100 characters"))?;
    }

    let created = gateway
        .create_ride_request(NewRideRequest {
            event_id: event.id,
            contact_name: request.contact_name.trim().to_string(),
            contact_phone: blank_to_none(request.contact_phone),
            pickup_address: blank_to_none(request.pickup_address),
            dropoff_address: blank_to_none(request.dropoff_address),
            notes: blank_to_none(request.notes),
        })
        .await?;
    let passengers = gateway
        .create_ride_request_passengers(created.id, &names)
        .await?;

    info!(
        request_id = created.id,
        event_id = %created.event_id,
        riders = passengers.len(),
        "Ride request created"
    );

    Ok(RideRequestWithPassengers {
        request: created,
        passengers,
    })
}

/// Ride requests of an event with their riders.
pub async fn list_ride_requests<G>(
    gateway: &mut G,
    event_id: &str,
) -> CarpoolResult<Vec<RideRequestWithPassengers>>
where
    G: CarpoolGateway + ?Sized,
{
    let event = require_event(gateway, event_id).await?;
    gateway.get_ride_requests_for_event(&event.id).await
}

/// Removes one rider from a request. Only allowed while the rider is waiting;
/// an assigned rider's seat has to be freed first.
pub async fn remove_ride_passenger<G>(gateway: &mut G, ride_passenger_id: i64) -> CarpoolResult<()>
where
    G: CarpoolGateway + ?Sized,
{
    let rider = gateway
        .get_ride_passenger(ride_passenger_id)
        .await?
        .ok_or_else(|| CarpoolError::not_found(format!("Ride passenger {}", ride_passenger_id)))?;
    if !rider.is_waiting() {
        return Err(CarpoolError::validation(
            "Free the seat of an assigned rider before removing them",
        ));
    }

    gateway.delete_ride_passenger(ride_passenger_id).await?;

    info!(
        ride_passenger_id,
        request_id = rider.request_id,
        "Ride passenger removed"
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::InMemoryGateway;
    use crate::models::{NewCar, NewEvent, RidePassengerStatus};
    use crate::services::access_gate::Credentials;
    use crate::services::seat_ledger;
    use chrono::{NaiveDate, NaiveTime};
    use fake::faker::name::en::Name;
    use fake::Fake;

    const EVENT: &str = "RIDES001";

    async fn gateway_with_event() -> InMemoryGateway {
        let mut gw = InMemoryGateway::new();
        gw.create_event(NewEvent {
            id: EVENT.into(),
            name: "Rides".into(),
            description: None,
            date: NaiveDate::from_ymd_opt(2030, 4, 4).unwrap(),
            time: NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
            password_hash: None,
        })
        .await
        .unwrap();
        gw
    }

    fn request(names: Vec<String>, contact_rides: bool) -> CreateRideRequestRequest {
        CreateRideRequestRequest {
            contact_name: "Maya".into(),
            contact_phone: Some("  ".into()),
            pickup_address: Some("Station".into()),
            dropoff_address: None,
            notes: None,
            passenger_names: names,
            contact_also_needs_ride: contact_rides,
        }
    }

    #[tokio::test]
    async fn test_create_ride_request() {
        let mut gw = gateway_with_event().await;
        let names: Vec<String> = (0..3).map(|_| Name().fake()).collect();

        let created = create_ride_request(&mut gw, EVENT, request(names.clone(), false))
            .await
            .unwrap();

        assert_eq!(created.request.contact_phone, None);
        assert_eq!(created.request.pickup_address.as_deref(), Some("Station"));
        let created_names: Vec<String> = created.passengers.iter().map(|p| p.name.clone()).collect();
        assert_eq!(created_names, names);
        assert!(created
            .passengers
            .iter()
            .all(|p| p.status == RidePassengerStatus::Waiting && p.assigned_car_id.is_none()));
    }

    #[tokio::test]
    async fn test_contact_prepended_when_riding() {
        let mut gw = gateway_with_event().await;
        let created = create_ride_request(&mut gw, EVENT, request(vec!["Ben".into()], true))
            .await
            .unwrap();
        let names: Vec<&str> = created.passengers.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Maya", "Ben"]);
    }

    #[tokio::test]
    async fn test_ride_request_needs_a_rider() {
        let mut gw = gateway_with_event().await;
        let err = create_ride_request(&mut gw, EVENT, request(vec!["  ".into()], false))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            CarpoolError::Validation("At least one rider name is required".into())
        );
    }

    #[tokio::test]
    async fn test_overlong_rider_name_rejected() {
        let mut gw = gateway_with_event().await;
        let err = create_ride_request(&mut gw, EVENT, request(vec!["Ben".into(), "x".repeat(150)], false))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            CarpoolError::Validation("Rider names must be at most 100 characters".into())
        );
        assert!(list_ride_requests(&mut gw, EVENT).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_ride_request_unknown_event() {
        let mut gw = gateway_with_event().await;
        let err = create_ride_request(&mut gw, "NOPE0000", request(vec!["Ben".into()], false))
            .await
            .unwrap_err();
        assert!(matches!(err, CarpoolError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_list_ride_requests() {
        let mut gw = gateway_with_event().await;
        create_ride_request(&mut gw, EVENT, request(vec!["Ben".into()], false))
            .await
            .unwrap();
        create_ride_request(&mut gw, EVENT, request(vec!["Cleo".into(), "Dev".into()], false))
            .await
            .unwrap();

        let listed = list_ride_requests(&mut gw, EVENT).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].passengers.len(), 1);
        assert_eq!(listed[1].passengers.len(), 2);
    }

    #[tokio::test]
    async fn test_remove_waiting_ride_passenger() {
        let mut gw = gateway_with_event().await;
        let created = create_ride_request(&mut gw, EVENT, request(vec!["Ben".into(), "Cleo".into()], false))
            .await
            .unwrap();

        remove_ride_passenger(&mut gw, created.passengers[0].id)
            .await
            .unwrap();

        let remaining = gw.get_ride_request(created.request.id).await.unwrap().unwrap();
        assert_eq!(remaining.passengers.len(), 1);
        assert_eq!(remaining.passengers[0].name, "Cleo");
    }

    #[tokio::test]
    async fn test_remove_assigned_ride_passenger_rejected() {
        let mut gw = gateway_with_event().await;
        let car = gw
            .create_car(NewCar {
                event_id: EVENT.into(),
                driver_name: "Dana".into(),
                driver_phone: None,
                driver_email: None,
                car_model: "Golf".into(),
                pickup_address: None,
                dropoff_address: None,
                seat_capacity: 2,
                requires_pin: false,
                car_pin: None,
            })
            .await
            .unwrap();
        let created = create_ride_request(&mut gw, EVENT, request(vec!["Ben".into()], false))
            .await
            .unwrap();
        let rider_id = created.passengers[0].id;
        seat_ledger::assign_ride_request_passenger(&mut gw, rider_id, car.id, &Credentials::none())
            .await
            .unwrap();

        let err = remove_ride_passenger(&mut gw, rider_id).await.unwrap_err();
        assert!(matches!(err, CarpoolError::Validation(_)));
        assert!(gw.get_ride_passenger(rider_id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_remove_unknown_ride_passenger() {
        let mut gw = gateway_with_event().await;
        let err = remove_ride_passenger(&mut gw, 404).await.unwrap_err();
        assert!(matches!(err, CarpoolError::NotFound(_)));
    }
}
