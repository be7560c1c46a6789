//! Call repository.
//!
//! Calls are the only table with upsert semantics: conversation
//! re-imports are expected to be safe to repeat verbatim, so saving an
//! existing call id replaces all columns.

use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use super::models::CallRecord;
use super::parse_datetime;
use super::pool::{AsyncSqlitePool, DieselError};
use crate::models::Call;
use crate::schema::call;

impl From<CallRecord> for Call {
    fn from(record: CallRecord) -> Self {
        Call {
            call_id: record.call_id,
            agent_name: record.agent_name,
            phone_number: record.phone_number,
            duration: record.duration,
            agent_speech_rate: record.agent_speech_rate,
            customer_speech_rate: record.customer_speech_rate,
            silence_rate: record.silence_rate,
            cross_talk_rate: record.cross_talk_rate,
            agent_interrupt_count: record.agent_interrupt_count,
            created_at: parse_datetime(&record.created_at),
        }
    }
}

/// Diesel-based call repository with compile-time query checking.
#[derive(Clone)]
pub struct CallRepository {
    pool: AsyncSqlitePool,
}

impl CallRepository {
    /// Create a new call repository with an existing pool.
    pub fn new(pool: AsyncSqlitePool) -> Self {
        Self { pool }
    }

    /// Get a call by id.
    pub async fn get(&self, call_id: &str) -> Result<Option<Call>, DieselError> {
        let mut conn = self.pool.get().await?;

        call::table
            .find(call_id)
            .first::<CallRecord>(&mut conn)
            .await
            .optional()
            .map(|opt| opt.map(Call::from))
    }

    /// Get all calls, ordered by id for a stable default order.
    pub async fn get_all(&self) -> Result<Vec<Call>, DieselError> {
        let mut conn = self.pool.get().await?;

        call::table
            .order(call::call_id.asc())
            .load::<CallRecord>(&mut conn)
            .await
            .map(|records| records.into_iter().map(Call::from).collect())
    }

    /// Save a call (insert or replace all columns keyed by call id).
    pub async fn save(&self, item: &Call) -> Result<(), DieselError> {
        let mut conn = self.pool.get().await?;

        let created_at = item.created_at.to_rfc3339();

        diesel::replace_into(call::table)
            .values((
                call::call_id.eq(&item.call_id),
                call::agent_name.eq(&item.agent_name),
                call::phone_number.eq(&item.phone_number),
                call::duration.eq(item.duration),
                call::agent_speech_rate.eq(item.agent_speech_rate),
                call::customer_speech_rate.eq(item.customer_speech_rate),
                call::silence_rate.eq(item.silence_rate),
                call::cross_talk_rate.eq(item.cross_talk_rate),
                call::agent_interrupt_count.eq(item.agent_interrupt_count),
                call::created_at.eq(&created_at),
            ))
            .execute(&mut conn)
            .await?;

        Ok(())
    }

    /// Check if a call exists.
    pub async fn exists(&self, call_id: &str) -> Result<bool, DieselError> {
        let mut conn = self.pool.get().await?;

        use diesel::dsl::count_star;
        let count: i64 = call::table
            .filter(call::call_id.eq(call_id))
            .select(count_star())
            .first(&mut conn)
            .await?;

        Ok(count > 0)
    }

    /// Count all calls.
    pub async fn count(&self) -> Result<u64, DieselError> {
        let mut conn = self.pool.get().await?;

        use diesel::dsl::count_star;
        let count: i64 = call::table.select(count_star()).first(&mut conn).await?;
        Ok(count as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::setup_test_db;
    use chrono::{TimeZone, Utc};

    fn sample_call(id: &str) -> Call {
        Call {
            call_id: id.to_string(),
            agent_name: "Ayşe Yılmaz".to_string(),
            phone_number: "5318671534".to_string(),
            duration: Some(125.5),
            agent_speech_rate: Some(52.3),
            customer_speech_rate: Some(38.1),
            silence_rate: Some(7.2),
            cross_talk_rate: Some(2.4),
            agent_interrupt_count: Some(2),
            created_at: Utc.with_ymd_and_hms(2025, 7, 24, 20, 3, 10).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_call_round_trip() {
        let (ctx, _dir) = setup_test_db().await;
        let repo = ctx.calls();

        let item = sample_call("123e4567-e89b-12d3-a456-426614174000");
        repo.save(&item).await.unwrap();

        let fetched = repo
            .get("123e4567-e89b-12d3-a456-426614174000")
            .await
            .unwrap()
            .unwrap();

        // No precision loss, no unit conversion
        assert_eq!(fetched.duration, Some(125.5));
        assert_eq!(fetched.agent_speech_rate, Some(52.3));
        assert_eq!(fetched.agent_interrupt_count, Some(2));
        assert_eq!(fetched, item);
    }

    #[tokio::test]
    async fn test_save_replaces_existing() {
        let (ctx, _dir) = setup_test_db().await;
        let repo = ctx.calls();

        let mut item = sample_call("123e4567-e89b-12d3-a456-426614174000");
        repo.save(&item).await.unwrap();

        item.agent_name = "Mehmet Kaya".to_string();
        item.duration = None;
        repo.save(&item).await.unwrap();

        assert_eq!(repo.count().await.unwrap(), 1);
        let fetched = repo.get(&item.call_id).await.unwrap().unwrap();
        assert_eq!(fetched.agent_name, "Mehmet Kaya");
        assert_eq!(fetched.duration, None);
    }

    #[tokio::test]
    async fn test_get_missing_is_none() {
        let (ctx, _dir) = setup_test_db().await;
        let repo = ctx.calls();

        assert!(repo
            .get("00000000-0000-0000-0000-000000000000")
            .await
            .unwrap()
            .is_none());
        assert!(!repo
            .exists("00000000-0000-0000-0000-000000000000")
            .await
            .unwrap());
    }
}
