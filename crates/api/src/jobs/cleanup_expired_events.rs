//! Deletes events that ended their grace period.

use chrono::Local;
use domain::services::maintenance;
use domain::CarpoolResult;
use persistence::PgGateway;
use sqlx::PgPool;

use super::scheduler::{Job, JobFrequency};
use crate::config::MaintenanceConfig;
use crate::middleware::metrics::record_expired_events_deleted;

/// Runs one sweep in its own transaction, measured against local time.
pub async fn sweep_expired_events(pool: &PgPool, grace_hours: i64) -> CarpoolResult<u64> {
    let now = Local::now().naive_local();
    let mut gateway = PgGateway::begin(pool).await?;
    let deleted = maintenance::cleanup_expired_events(&mut gateway, now, grace_hours).await?;
    gateway.commit().await?;
    record_expired_events_deleted(deleted);
    Ok(deleted)
}

pub struct CleanupExpiredEventsJob {
    pool: PgPool,
    grace_hours: i64,
    interval_minutes: u64,
}

impl CleanupExpiredEventsJob {
    pub fn new(pool: PgPool, config: &MaintenanceConfig) -> Self {
        Self {
            pool,
            grace_hours: config.expired_event_grace_hours,
            interval_minutes: config.cleanup_interval_minutes,
        }
    }
}

#[async_trait::async_trait]
impl Job for CleanupExpiredEventsJob {
    fn name(&self) -> &'static str {
        "cleanup_expired_events"
    }

    fn frequency(&self) -> JobFrequency {
        JobFrequency::Minutes(self.interval_minutes)
    }

    async fn execute(&self) -> CarpoolResult<()> {
        sweep_expired_events(&self.pool, self.grace_hours).await?;
        Ok(())
    }
}
