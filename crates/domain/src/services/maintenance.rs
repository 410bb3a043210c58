//! Housekeeping sweeps over stored events.

use chrono::{Duration, NaiveDateTime};
use tracing::info;

use crate::error::CarpoolResult;
use crate::gateway::CarpoolGateway;

/// Hours an event stays visible after its start.
pub const DEFAULT_GRACE_HOURS: i64 = 24;

/// Longest accepted grace period: one year.
pub const MAX_GRACE_HOURS: i64 = 24 * 365;

/// Events starting before this instant are expired.
///
/// Saturates at the earliest representable instant, so an oversized grace
/// period expires nothing.
pub fn expiry_cutoff(now: NaiveDateTime, grace_hours: i64) -> NaiveDateTime {
    Duration::try_hours(grace_hours.max(0))
        .and_then(|grace| now.checked_sub_signed(grace))
        .unwrap_or(NaiveDateTime::MIN)
}

/// Deletes events that started more than `grace_hours` before `now`.
pub async fn cleanup_expired_events<G>(
    gateway: &mut G,
    now: NaiveDateTime,
    grace_hours: i64,
) -> CarpoolResult<u64>
where
    G: CarpoolGateway + ?Sized,
{
    let cutoff = expiry_cutoff(now, grace_hours);
    let deleted = gateway.cleanup_expired_events(cutoff).await?;
    if deleted > 0 {
        info!(deleted, %cutoff, "Expired events deleted");
    }
    Ok(deleted)
}
