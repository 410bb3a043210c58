//! Database metrics collection.
//!
//! Every repository query is timed with [`QueryTimer`]; the pool gauges are
//! refreshed from the api's metrics endpoint.

use metrics::{gauge, histogram};
use sqlx::PgPool;
use std::time::Instant;

/// Record database query duration.
///
/// Call this function after executing a query to record its duration.
pub fn record_query_duration(query_name: &str, duration_secs: f64) {
    histogram!(
        "database_query_duration_seconds",
        "query" => query_name.to_string()
    )
    .record(duration_secs);
}

/// Record database connection pool metrics.
///
/// Call this function periodically to track pool health.
pub fn record_pool_metrics(pool: &PgPool) {
    let size = pool.size() as usize;
    let idle = pool.num_idle();
    let active = size.saturating_sub(idle);

    gauge!("database_connections_active").set(active as f64);
    gauge!("database_connections_idle").set(idle as f64);
    gauge!("database_connections_total").set(size as f64);
}

/// A helper to time database operations and record metrics.
///
/// Usage:
/// ```ignore
/// let timer = QueryTimer::new("find_car_for_update");
/// let result = sqlx::query_as::<_, CarEntity>(...).fetch_optional(&mut *self.conn).await;
/// timer.record();
/// result
/// ```
pub struct QueryTimer {
    query_name: String,
    start: Instant,
}

impl QueryTimer {
    /// Create a new timer for the given query name.
    pub fn new(query_name: impl Into<String>) -> Self {
        Self {
            query_name: query_name.into(),
            start: Instant::now(),
        }
    }

    /// Record the elapsed duration to metrics.
    pub fn record(self) {
        let duration = self.start.elapsed().as_secs_f64();
        record_query_duration(&self.query_name, duration);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_timer_names() {
        assert_eq!(QueryTimer::new("delete_car").query_name, "delete_car");
        let owned = format!("count_{}", "passengers_by_car");
        assert_eq!(QueryTimer::new(owned).query_name, "count_passengers_by_car");
    }

    #[test]
    fn test_query_timer_record_without_recorder() {
        // No global recorder installed: recording is a no-op.
        QueryTimer::new("list_car_ids").record();
    }
}
