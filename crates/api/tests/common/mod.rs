//! Common test utilities for integration tests.
//!
//! The tests run against a real PostgreSQL database named by
//! `TEST_DATABASE_URL`. When the variable is unset or the database cannot be
//! reached, [`setup`] returns `None` and the calling test returns early.

#![allow(dead_code)]

use std::time::Duration;

use axum::{
    body::Body,
    http::{header, Method, Request, Response, StatusCode},
    Router,
};
use carpool_api::{
    app::create_app,
    config::{
        Config, DatabaseConfig, LoggingConfig, MaintenanceConfig, SecurityConfig, ServerConfig,
    },
};
use chrono::{Duration as ChronoDuration, Local};
use fake::{faker::name::en::Name, Fake};
use serde_json::{json, Value};
use sqlx::{postgres::PgPoolOptions, PgPool};
use tower::ServiceExt;

pub const CAR_PIN_HEADER: &str = "X-Car-Pin";
pub const EVENT_PASSWORD_HEADER: &str = "X-Event-Password";

/// Connects to the test database and applies migrations.
pub async fn create_test_pool() -> Option<PgPool> {
    let database_url = std::env::var("TEST_DATABASE_URL").ok()?;

    let pool = match PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(5))
        .connect(&database_url)
        .await
    {
        Ok(pool) => pool,
        Err(e) => {
            eprintln!("Skipping integration test, database unreachable: {}", e);
            return None;
        }
    };

    persistence::db::run_migrations(&pool)
        .await
        .expect("Failed to run migrations");
    Some(pool)
}

pub fn test_config() -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            request_timeout_secs: 30,
        },
        database: DatabaseConfig {
            url: std::env::var("TEST_DATABASE_URL").unwrap_or_default(),
            max_connections: 10,
            min_connections: 1,
            connect_timeout_secs: 5,
            idle_timeout_secs: 600,
        },
        logging: LoggingConfig {
            level: "debug".to_string(),
            format: "pretty".to_string(),
        },
        security: SecurityConfig::default(),
        maintenance: MaintenanceConfig::default(),
    }
}

/// Router plus pool, or `None` when no test database is available.
pub async fn setup() -> Option<(Router, PgPool)> {
    let pool = create_test_pool().await?;
    Some((create_app(test_config(), pool.clone()), pool))
}

pub fn json_request(method: Method, uri: &str, body: Value, headers: &[(&str, &str)]) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    builder
        .body(Body::from(body.to_string()))
        .expect("Failed to build request")
}

pub fn empty_request(method: Method, uri: &str, headers: &[(&str, &str)]) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    builder.body(Body::empty()).expect("Failed to build request")
}

/// Sends a request and returns the status with the parsed JSON body
/// (`Value::Null` for an empty body).
pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response: Response<Body> = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            panic!(
                "Non-JSON body with status {}: {}",
                status,
                String::from_utf8_lossy(&bytes)
            )
        })
    };
    (status, json)
}

/// Date a month from now, so created events are never in the past.
pub fn future_date() -> String {
    (Local::now().date_naive() + ChronoDuration::days(30))
        .format("%Y-%m-%d")
        .to_string()
}

/// Creates an event and returns its code.
pub async fn create_test_event(app: &Router, password: Option<&str>) -> String {
    let (status, body) = send(
        app,
        json_request(
            Method::POST,
            "/api/v1/events",
            json!({
                "name": "Lake Picnic",
                "description": "Bring a blanket",
                "date": future_date(),
                "time": "11:00:00",
                "password": password,
            }),
            &[],
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create event failed: {}", body);
    body["id"].as_str().expect("missing event id").to_string()
}

/// Registers a car and returns its id.
pub async fn register_test_car(
    app: &Router,
    event_id: &str,
    seat_capacity: i32,
    pin: Option<&str>,
) -> i64 {
    let driver_name: String = Name().fake();
    let (status, body) = send(
        app,
        json_request(
            Method::POST,
            &format!("/api/v1/events/{}/cars", event_id),
            json!({
                "driverName": driver_name,
                "carModel": "Golf",
                "seatCapacity": seat_capacity,
                "requiresPin": pin.is_some(),
                "carPin": pin,
            }),
            &[],
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "register car failed: {}", body);
    body["id"].as_i64().expect("missing car id")
}

/// Books a seat and returns the response status and body.
pub async fn book_seat(
    app: &Router,
    car_id: i64,
    name: &str,
    headers: &[(&str, &str)],
) -> (StatusCode, Value) {
    send(
        app,
        json_request(
            Method::POST,
            &format!("/api/v1/cars/{}/seats", car_id),
            json!({ "passengerName": name }),
            headers,
        ),
    )
    .await
}

/// Fetches the event view.
pub async fn get_event(app: &Router, event_id: &str) -> (StatusCode, Value) {
    send(
        app,
        empty_request(Method::GET, &format!("/api/v1/events/{}", event_id), &[]),
    )
    .await
}

/// Removes an event created by a test.
pub async fn delete_test_event(pool: &PgPool, event_id: &str) {
    sqlx::query("DELETE FROM events WHERE id = $1")
        .bind(event_id)
        .execute(pool)
        .await
        .ok();
}
