//! Read-only repository over the aggregate join view.
//!
//! This is a view, so only SELECT operations are supported. The filter
//! is a closed struct of optional fields; the same filter application
//! backs both the data query and the count query, so the two can never
//! drift apart.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use super::models::AnalysisViewRecord;
use super::parse_datetime;
use super::pool::{AsyncSqlitePool, DieselError};
use crate::models::AnalysisRow;
use crate::schema::analysis_result_view as view;

/// Filter criteria for aggregate rows. All fields are optional and
/// AND-combined; `None` means "no constraint".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalysisFilter {
    /// Case-insensitive substring match on the agent name.
    pub agent_name: Option<String>,
    /// Exact phone number match.
    pub phone_number: Option<String>,
    pub follow_up_required: Option<bool>,
    /// Case-insensitive substring match on the call reason.
    pub reason_contains: Option<String>,
    pub created_from: Option<DateTime<Utc>>,
    pub created_to: Option<DateTime<Utc>>,
    pub duration_min: Option<f64>,
    pub duration_max: Option<f64>,
    pub agent_speech_rate_min: Option<f64>,
    pub agent_speech_rate_max: Option<f64>,
    pub customer_speech_rate_min: Option<f64>,
    pub customer_speech_rate_max: Option<f64>,
    pub silence_rate_min: Option<f64>,
    pub silence_rate_max: Option<f64>,
    pub cross_talk_rate_min: Option<f64>,
    pub cross_talk_rate_max: Option<f64>,
    pub agent_interrupt_count_min: Option<i32>,
    pub agent_interrupt_count_max: Option<i32>,
    pub churn_risk_min: Option<i32>,
    pub churn_risk_max: Option<i32>,
}

impl From<AnalysisViewRecord> for AnalysisRow {
    fn from(record: AnalysisViewRecord) -> Self {
        AnalysisRow {
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
            base_call_id: record.base_call_id,
            call_reason: record.call_reason,
            call_reason_detail: record.call_reason_detail,
            follow_up_required: record.follow_up_required,
            organization_metadata: record.organization_metadata,
            issue_call_id: record.issue_call_id,
            issue_sub_category: record.issue_sub_category,
            sub_issue_type: record.sub_issue_type,
            churn_risk: record.churn_risk,
            urgency_level: record.urgency_level,
            related_with_previous_call: record.related_with_previous_call,
            related_detail: record.related_detail,
        }
    }
}

/// Apply an [`AnalysisFilter`] to a boxed query over the view.
///
/// A macro rather than a function so the identical filter chain
/// compiles against both the row query and the count query.
macro_rules! apply_filters {
    ($query:expr, $filter:expr) => {{
        let mut query = $query;
        let filter = $filter;
        if let Some(ref v) = filter.agent_name {
            query = query.filter(view::agent_name.like(format!("%{}%", v)));
        }
        if let Some(ref v) = filter.phone_number {
            query = query.filter(view::phone_number.eq(v.clone()));
        }
        if let Some(v) = filter.follow_up_required {
            query = query.filter(view::follow_up_required.eq(v));
        }
        if let Some(ref v) = filter.reason_contains {
            query = query.filter(view::call_reason.like(format!("%{}%", v)));
        }
        // RFC 3339 UTC strings compare lexicographically in timestamp order
        if let Some(v) = filter.created_from {
            query = query.filter(view::created_at.ge(v.to_rfc3339()));
        }
        if let Some(v) = filter.created_to {
            query = query.filter(view::created_at.le(v.to_rfc3339()));
        }
        if let Some(v) = filter.duration_min {
            query = query.filter(view::duration.ge(v));
        }
        if let Some(v) = filter.duration_max {
            query = query.filter(view::duration.le(v));
        }
        if let Some(v) = filter.agent_speech_rate_min {
            query = query.filter(view::agent_speech_rate.ge(v));
        }
        if let Some(v) = filter.agent_speech_rate_max {
            query = query.filter(view::agent_speech_rate.le(v));
        }
        if let Some(v) = filter.customer_speech_rate_min {
            query = query.filter(view::customer_speech_rate.ge(v));
        }
        if let Some(v) = filter.customer_speech_rate_max {
            query = query.filter(view::customer_speech_rate.le(v));
        }
        if let Some(v) = filter.silence_rate_min {
            query = query.filter(view::silence_rate.ge(v));
        }
        if let Some(v) = filter.silence_rate_max {
            query = query.filter(view::silence_rate.le(v));
        }
        if let Some(v) = filter.cross_talk_rate_min {
            query = query.filter(view::cross_talk_rate.ge(v));
        }
        if let Some(v) = filter.cross_talk_rate_max {
            query = query.filter(view::cross_talk_rate.le(v));
        }
        if let Some(v) = filter.agent_interrupt_count_min {
            query = query.filter(view::agent_interrupt_count.ge(v));
        }
        if let Some(v) = filter.agent_interrupt_count_max {
            query = query.filter(view::agent_interrupt_count.le(v));
        }
        if let Some(v) = filter.churn_risk_min {
            query = query.filter(view::churn_risk.ge(v));
        }
        if let Some(v) = filter.churn_risk_max {
            query = query.filter(view::churn_risk.le(v));
        }
        query
    }};
}

/// Read-only repository for the aggregate analysis view.
#[derive(Clone)]
pub struct AnalysisViewRepository {
    pool: AsyncSqlitePool,
}

impl AnalysisViewRepository {
    pub fn new(pool: AsyncSqlitePool) -> Self {
        Self { pool }
    }

    /// Get a single aggregate row by call id.
    pub async fn get_by_call_id(&self, call_id: &str) -> Result<Option<AnalysisRow>, DieselError> {
        let mut conn = self.pool.get().await?;

        view::table
            .filter(view::call_id.eq(call_id))
            .first::<AnalysisViewRecord>(&mut conn)
            .await
            .optional()
            .map(|opt| opt.map(AnalysisRow::from))
    }

    /// List aggregate rows matching the filter, ordered by call id,
    /// with pagination applied after filtering.
    pub async fn list(
        &self,
        filter: &AnalysisFilter,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<AnalysisRow>, DieselError> {
        let mut conn = self.pool.get().await?;

        let mut query = apply_filters!(view::table.into_boxed(), filter)
            .order(view::call_id.asc());
        if let Some(offset) = offset {
            query = query.offset(offset);
        }
        if let Some(limit) = limit {
            query = query.limit(limit);
        }

        let records: Vec<AnalysisViewRecord> = query.load(&mut conn).await?;
        Ok(records.into_iter().map(AnalysisRow::from).collect())
    }

    /// Count rows matching the filter, before any pagination.
    pub async fn count(&self, filter: &AnalysisFilter) -> Result<u64, DieselError> {
        let mut conn = self.pool.get().await?;

        use diesel::dsl::count_star;
        let query = apply_filters!(view::table.select(count_star()).into_boxed(), filter);

        let count: i64 = query.first(&mut conn).await?;
        Ok(count as u64)
    }
}
