//! Background job scheduler and job implementations.

mod cleanup_expired_events;
mod reconcile_seats;
mod scheduler;

pub use cleanup_expired_events::{sweep_expired_events, CleanupExpiredEventsJob};
pub use reconcile_seats::ReconcileSeatsJob;
pub use scheduler::{Job, JobFrequency, JobScheduler};
