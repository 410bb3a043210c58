use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::middleware::{metrics_handler, metrics_middleware, trace_id};
use crate::routes::{cars, events, health, ride_requests, seats};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() {
        return layer.allow_origin(Any);
    }
    let origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
    layer.allow_origin(AllowOrigin::list(origins))
}

pub fn create_app(config: Config, pool: PgPool) -> Router {
    let config = Arc::new(config);
    let state = AppState {
        pool,
        config: config.clone(),
    };

    let event_routes = Router::new()
        .route("/api/v1/events", post(events::create_event))
        .route("/api/v1/events/resolve", get(events::resolve_event))
        .route(
            "/api/v1/events/:event_id",
            get(events::get_event)
                .patch(events::update_event)
                .delete(events::delete_event),
        )
        .route(
            "/api/v1/events/:event_id/verify-password",
            post(events::verify_password),
        )
        .route(
            "/api/v1/events/:event_id/cars",
            get(cars::list_cars).post(cars::register_car),
        )
        .route(
            "/api/v1/events/:event_id/ride-requests",
            get(ride_requests::list_ride_requests).post(ride_requests::create_ride_request),
        );

    let car_routes = Router::new()
        .route(
            "/api/v1/cars/:car_id",
            put(cars::edit_car).delete(cars::remove_car),
        )
        .route("/api/v1/cars/:car_id/verify-pin", post(cars::verify_pin))
        .route("/api/v1/cars/:car_id/seats", post(seats::book_seat))
        .route(
            "/api/v1/cars/:car_id/seats/:seat_index",
            delete(seats::free_seat),
        );

    let ride_routes = Router::new()
        .route(
            "/api/v1/ride-requests/:request_id",
            delete(ride_requests::remove_ride_request),
        )
        .route(
            "/api/v1/ride-passengers/:id",
            delete(ride_requests::remove_ride_passenger),
        )
        .route(
            "/api/v1/ride-passengers/:id/assign",
            post(seats::assign_ride_passenger),
        );

    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::ready))
        .route("/api/health/live", get(health::live))
        .route("/metrics", get(metrics_handler));

    Router::new()
        .merge(public_routes)
        .merge(event_routes)
        .merge(car_routes)
        .merge(ride_routes)
        // Global middleware (order matters: bottom layers run first)
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(cors_layer(&config.security.cors_origins))
        .with_state(state)
}
