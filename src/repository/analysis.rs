//! Base and issue analysis repositories.
//!
//! Both tables are insert-if-absent: the converters check for an
//! existing row and skip duplicates, never overwrite. The one sanctioned
//! mutation is the organization-metadata fill-in, which only lands while
//! the column is still NULL.

use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use super::models::{BaseAnalysisRecord, IssueAnalysisRecord};
use super::pool::{AsyncSqlitePool, DieselError};
use crate::models::{BaseAnalysisResult, IssueAnalysisResult};
use crate::schema::{base_analysis_result, issue_analysis_result};

impl From<BaseAnalysisRecord> for BaseAnalysisResult {
    fn from(record: BaseAnalysisRecord) -> Self {
        BaseAnalysisResult {
            call_id: record.call_id,
            call_reason: record.call_reason,
            call_reason_detail: record.call_reason_detail,
            follow_up_required: record.follow_up_required,
            organization_metadata: record.organization_metadata,
        }
    }
}

impl From<IssueAnalysisRecord> for IssueAnalysisResult {
    fn from(record: IssueAnalysisRecord) -> Self {
        IssueAnalysisResult {
            call_id: record.call_id,
            sub_category: record.sub_category,
            sub_issue_type: record.sub_issue_type,
            churn_risk: record.churn_risk,
            urgency_level: record.urgency_level,
            related_with_previous_call: record.related_with_previous_call,
            related_detail: record.related_detail,
        }
    }
}

/// Repository for base analysis results.
#[derive(Clone)]
pub struct BaseAnalysisRepository {
    pool: AsyncSqlitePool,
}

impl BaseAnalysisRepository {
    pub fn new(pool: AsyncSqlitePool) -> Self {
        Self { pool }
    }

    /// Get a base analysis result by call id.
    pub async fn get(&self, call_id: &str) -> Result<Option<BaseAnalysisResult>, DieselError> {
        let mut conn = self.pool.get().await?;

        base_analysis_result::table
            .find(call_id)
            .first::<BaseAnalysisRecord>(&mut conn)
            .await
            .optional()
            .map(|opt| opt.map(BaseAnalysisResult::from))
    }

    /// Check if a base analysis result exists for a call.
    pub async fn exists(&self, call_id: &str) -> Result<bool, DieselError> {
        let mut conn = self.pool.get().await?;

        use diesel::dsl::count_star;
        let count: i64 = base_analysis_result::table
            .filter(base_analysis_result::call_id.eq(call_id))
            .select(count_star())
            .first(&mut conn)
            .await?;

        Ok(count > 0)
    }

    /// Insert a new base analysis result.
    ///
    /// Fails on a duplicate call id; callers are expected to check
    /// `exists` first and skip.
    pub async fn insert(&self, item: &BaseAnalysisResult) -> Result<(), DieselError> {
        let mut conn = self.pool.get().await?;

        diesel::insert_into(base_analysis_result::table)
            .values((
                base_analysis_result::call_id.eq(&item.call_id),
                base_analysis_result::call_reason.eq(&item.call_reason),
                base_analysis_result::call_reason_detail.eq(&item.call_reason_detail),
                base_analysis_result::follow_up_required.eq(item.follow_up_required),
                base_analysis_result::organization_metadata.eq(&item.organization_metadata),
            ))
            .execute(&mut conn)
            .await?;

        Ok(())
    }

    /// True when the stored organization metadata is still NULL.
    pub async fn metadata_is_empty(&self, call_id: &str) -> Result<Option<bool>, DieselError> {
        let mut conn = self.pool.get().await?;

        let metadata: Option<Option<String>> = base_analysis_result::table
            .find(call_id)
            .select(base_analysis_result::organization_metadata)
            .first(&mut conn)
            .await
            .optional()?;

        Ok(metadata.map(|m| m.is_none()))
    }

    /// Fill in the organization metadata column.
    ///
    /// Monotonic: only rows whose metadata is still NULL are touched.
    /// Returns true when a row was updated.
    pub async fn set_organization_metadata(
        &self,
        call_id: &str,
        metadata_json: &str,
    ) -> Result<bool, DieselError> {
        let mut conn = self.pool.get().await?;

        let rows = diesel::update(
            base_analysis_result::table
                .filter(base_analysis_result::call_id.eq(call_id))
                .filter(base_analysis_result::organization_metadata.is_null()),
        )
        .set(base_analysis_result::organization_metadata.eq(metadata_json))
        .execute(&mut conn)
        .await?;

        Ok(rows > 0)
    }

    /// Count all base analysis results.
    pub async fn count(&self) -> Result<u64, DieselError> {
        let mut conn = self.pool.get().await?;

        use diesel::dsl::count_star;
        let count: i64 = base_analysis_result::table
            .select(count_star())
            .first(&mut conn)
            .await?;
        Ok(count as u64)
    }
}

/// Repository for issue analysis results.
#[derive(Clone)]
pub struct IssueAnalysisRepository {
    pool: AsyncSqlitePool,
}

impl IssueAnalysisRepository {
    pub fn new(pool: AsyncSqlitePool) -> Self {
        Self { pool }
    }

    /// Get an issue analysis result by call id.
    pub async fn get(&self, call_id: &str) -> Result<Option<IssueAnalysisResult>, DieselError> {
        let mut conn = self.pool.get().await?;

        issue_analysis_result::table
            .find(call_id)
            .first::<IssueAnalysisRecord>(&mut conn)
            .await
            .optional()
            .map(|opt| opt.map(IssueAnalysisResult::from))
    }

    /// Check if an issue analysis result exists for a call.
    pub async fn exists(&self, call_id: &str) -> Result<bool, DieselError> {
        let mut conn = self.pool.get().await?;

        use diesel::dsl::count_star;
        let count: i64 = issue_analysis_result::table
            .filter(issue_analysis_result::call_id.eq(call_id))
            .select(count_star())
            .first(&mut conn)
            .await?;

        Ok(count > 0)
    }

    /// Insert a new issue analysis result.
    ///
    /// The converter guarantees a base analysis row exists first; the
    /// foreign key backs that up at the schema level.
    pub async fn insert(&self, item: &IssueAnalysisResult) -> Result<(), DieselError> {
        let mut conn = self.pool.get().await?;

        diesel::insert_into(issue_analysis_result::table)
            .values((
                issue_analysis_result::call_id.eq(&item.call_id),
                issue_analysis_result::sub_category.eq(&item.sub_category),
                issue_analysis_result::sub_issue_type.eq(&item.sub_issue_type),
                issue_analysis_result::churn_risk.eq(item.churn_risk),
                issue_analysis_result::urgency_level.eq(&item.urgency_level),
                issue_analysis_result::related_with_previous_call
                    .eq(item.related_with_previous_call),
                issue_analysis_result::related_detail.eq(&item.related_detail),
            ))
            .execute(&mut conn)
            .await?;

        Ok(())
    }

    /// Count all issue analysis results.
    pub async fn count(&self) -> Result<u64, DieselError> {
        let mut conn = self.pool.get().await?;

        use diesel::dsl::count_star;
        let count: i64 = issue_analysis_result::table
            .select(count_star())
            .first(&mut conn)
            .await?;
        Ok(count as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Call;
    use crate::repository::test_support::setup_test_db;
    use chrono::Utc;

    const CALL_ID: &str = "123e4567-e89b-12d3-a456-426614174000";

    async fn seed_call(ctx: &crate::repository::DbContext) {
        let item = Call {
            call_id: CALL_ID.to_string(),
            agent_name: "agent".to_string(),
            phone_number: "5551234567".to_string(),
            duration: Some(60.0),
            agent_speech_rate: None,
            customer_speech_rate: None,
            silence_rate: None,
            cross_talk_rate: None,
            agent_interrupt_count: None,
            created_at: Utc::now(),
        };
        ctx.calls().save(&item).await.unwrap();
    }

    fn base_result() -> BaseAnalysisResult {
        BaseAnalysisResult {
            call_id: CALL_ID.to_string(),
            call_reason: "billing".to_string(),
            call_reason_detail: "overcharge".to_string(),
            follow_up_required: true,
            organization_metadata: None,
        }
    }

    #[tokio::test]
    async fn test_base_insert_and_get() {
        let (ctx, _dir) = setup_test_db().await;
        seed_call(&ctx).await;

        let repo = ctx.base_results();
        repo.insert(&base_result()).await.unwrap();

        assert!(repo.exists(CALL_ID).await.unwrap());
        let fetched = repo.get(CALL_ID).await.unwrap().unwrap();
        assert_eq!(fetched.call_reason, "billing");
        assert!(fetched.follow_up_required);
        assert_eq!(fetched.organization_metadata, None);
    }

    #[tokio::test]
    async fn test_metadata_fill_in_is_monotonic() {
        let (ctx, _dir) = setup_test_db().await;
        seed_call(&ctx).await;

        let repo = ctx.base_results();
        repo.insert(&base_result()).await.unwrap();

        assert_eq!(repo.metadata_is_empty(CALL_ID).await.unwrap(), Some(true));

        let updated = repo
            .set_organization_metadata(CALL_ID, r#"{"organization_name":"NUR TİCARET"}"#)
            .await
            .unwrap();
        assert!(updated);
        assert_eq!(repo.metadata_is_empty(CALL_ID).await.unwrap(), Some(false));

        // Second write must not overwrite
        let updated_again = repo
            .set_organization_metadata(CALL_ID, r#"{"organization_name":"other"}"#)
            .await
            .unwrap();
        assert!(!updated_again);

        let fetched = repo.get(CALL_ID).await.unwrap().unwrap();
        assert_eq!(
            fetched.organization_metadata.as_deref(),
            Some(r#"{"organization_name":"NUR TİCARET"}"#)
        );
    }

    #[tokio::test]
    async fn test_metadata_check_for_missing_row() {
        let (ctx, _dir) = setup_test_db().await;
        let repo = ctx.base_results();
        assert_eq!(repo.metadata_is_empty(CALL_ID).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_issue_insert_and_get() {
        let (ctx, _dir) = setup_test_db().await;
        seed_call(&ctx).await;
        ctx.base_results().insert(&base_result()).await.unwrap();

        let repo = ctx.issue_results();
        let item = IssueAnalysisResult {
            call_id: CALL_ID.to_string(),
            sub_category: "pos_device".to_string(),
            sub_issue_type: "hardware_failure".to_string(),
            churn_risk: 7,
            urgency_level: "high".to_string(),
            related_with_previous_call: true,
            related_detail: "second call about the same terminal".to_string(),
        };
        repo.insert(&item).await.unwrap();

        assert!(repo.exists(CALL_ID).await.unwrap());
        let fetched = repo.get(CALL_ID).await.unwrap().unwrap();
        assert_eq!(fetched.churn_risk, 7);
        assert_eq!(fetched.sub_category, "pos_device");
    }
}
