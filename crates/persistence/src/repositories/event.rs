//! Event repository for database operations.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use sqlx::PgConnection;

use crate::entities::EventEntity;
use crate::metrics::QueryTimer;

const EVENT_COLUMNS: &str =
    "id, name, description, date, time, password_hash, created_at, updated_at";

/// Repository for event-related database operations.
pub struct EventRepository<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> EventRepository<'c> {
    pub fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }

    /// Find an event by its code.
    pub async fn find_by_id(&mut self, id: &str) -> Result<Option<EventEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_event_by_id");
        let result = sqlx::query_as::<_, EventEntity>(&format!(
            "SELECT {} FROM events WHERE id = $1",
            EVENT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&mut *self.conn)
        .await;
        timer.record();
        result
    }

    /// Insert a new event.
    pub async fn insert(
        &mut self,
        id: &str,
        name: &str,
        description: Option<&str>,
        date: NaiveDate,
        time: NaiveTime,
        password_hash: Option<&str>,
    ) -> Result<EventEntity, sqlx::Error> {
        let timer = QueryTimer::new("insert_event");
        let result = sqlx::query_as::<_, EventEntity>(&format!(
            r#"
            INSERT INTO events (id, name, description, date, time, password_hash)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            EVENT_COLUMNS
        ))
        .bind(id)
        .bind(name)
        .bind(description)
        .bind(date)
        .bind(time)
        .bind(password_hash)
        .fetch_one(&mut *self.conn)
        .await;
        timer.record();
        result
    }

    /// Update the editable fields of an event.
    pub async fn update(
        &mut self,
        id: &str,
        name: &str,
        description: Option<&str>,
        date: NaiveDate,
        time: NaiveTime,
    ) -> Result<Option<EventEntity>, sqlx::Error> {
        let timer = QueryTimer::new("update_event");
        let result = sqlx::query_as::<_, EventEntity>(&format!(
            r#"
            UPDATE events
            SET name = $2, description = $3, date = $4, time = $5, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            EVENT_COLUMNS
        ))
        .bind(id)
        .bind(name)
        .bind(description)
        .bind(date)
        .bind(time)
        .fetch_optional(&mut *self.conn)
        .await;
        timer.record();
        result
    }

    /// Delete an event. Cars, passengers and ride requests cascade.
    pub async fn delete(&mut self, id: &str) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("delete_event");
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(&mut *self.conn)
            .await;
        timer.record();
        Ok(result?.rows_affected() > 0)
    }

    /// Delete every event whose start lies before `cutoff`.
    pub async fn delete_started_before(&mut self, cutoff: NaiveDateTime) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("delete_expired_events");
        let result = sqlx::query("DELETE FROM events WHERE (date + time) < $1")
            .bind(cutoff)
            .execute(&mut *self.conn)
            .await;
        timer.record();
        Ok(result?.rows_affected())
    }
}
