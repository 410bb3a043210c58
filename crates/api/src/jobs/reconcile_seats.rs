//! Repairs drift between `occupied_seats` and the seated passengers.

use domain::services::seat_ledger;
use domain::CarpoolResult;
use persistence::PgGateway;
use sqlx::PgPool;
use tracing::info;

use super::scheduler::{Job, JobFrequency};
use crate::middleware::metrics::record_occupied_seats_repaired;

pub struct ReconcileSeatsJob {
    pool: PgPool,
    interval_minutes: u64,
}

impl ReconcileSeatsJob {
    pub fn new(pool: PgPool, interval_minutes: u64) -> Self {
        Self {
            pool,
            interval_minutes,
        }
    }
}

#[async_trait::async_trait]
impl Job for ReconcileSeatsJob {
    fn name(&self) -> &'static str {
        "reconcile_seats"
    }

    fn frequency(&self) -> JobFrequency {
        JobFrequency::Minutes(self.interval_minutes)
    }

    async fn execute(&self) -> CarpoolResult<()> {
        let mut gateway = PgGateway::begin(&self.pool).await?;
        let repairs = seat_ledger::reconcile_all(&mut gateway).await?;
        gateway.commit().await?;

        if !repairs.is_empty() {
            info!(repaired = repairs.len(), "Occupied seat counters repaired");
        }
        record_occupied_seats_repaired(repairs.len() as u64);
        Ok(())
    }
}
