//! Read service over the aggregate analysis view.
//!
//! Responsible for the list-with-count contract (data page and total
//! count computed under the same filter) and for the two presentation
//! coercions the API promises: churn risk as a string and organization
//! metadata as a JSON-encoded string.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::AnalysisRow;
use crate::repository::{AnalysisFilter, AnalysisViewRepository, DbContext, DieselError};

/// One aggregate row as presented by the API.
///
/// Call columns are always present; base and issue analysis columns are
/// null when the left join found no row.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResultDto {
    pub call_id: String,
    pub agent_name: String,
    pub phone_number: String,
    pub duration: Option<f64>,
    pub agent_speech_rate: Option<f64>,
    pub customer_speech_rate: Option<f64>,
    pub silence_rate: Option<f64>,
    pub cross_talk_rate: Option<f64>,
    pub agent_interrupt_count: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub base_analysis_call_id: Option<String>,
    pub call_reason: Option<String>,
    pub call_reason_detail: Option<String>,
    pub is_follow_up_required: Option<bool>,
    /// JSON-encoded string or null, regardless of how the store held it.
    pub organization_metadata: Option<String>,
    pub issue_analysis_id: Option<String>,
    pub issue_sub_category: Option<String>,
    pub sub_issue_type: Option<String>,
    /// Stored as a small integer; presented as a string.
    pub churn_risk: Option<String>,
    pub urgency_level: Option<String>,
    pub related_with_previous_call: Option<bool>,
    pub previous_call_relation_detail: Option<String>,
}

/// A page of aggregate rows plus the pre-pagination match count.
#[derive(Debug, Clone)]
pub struct AnalysisPage {
    pub count: u64,
    pub data: Vec<AnalysisResultDto>,
}

/// Normalize a stored organization-metadata value to a JSON-encoded
/// string.
///
/// The column may hold a JSON document (the metadata pass writes one) or
/// a bare string from older imports; the latter is re-encoded so the
/// API always ships valid JSON or null.
pub fn normalize_organization_metadata(raw: Option<&str>) -> Option<String> {
    let raw = raw?;
    match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(serde_json::Value::Object(_)) | Ok(serde_json::Value::Array(_)) => {
            Some(raw.to_string())
        }
        // Bare scalar or non-JSON text from a legacy import
        Ok(_) | Err(_) => Some(serde_json::Value::String(raw.to_string()).to_string()),
    }
}

fn to_dto(row: AnalysisRow) -> AnalysisResultDto {
    AnalysisResultDto {
        organization_metadata: normalize_organization_metadata(
            row.organization_metadata.as_deref(),
        ),
        churn_risk: row.churn_risk.map(|c| c.to_string()),
        call_id: row.call_id,
        agent_name: row.agent_name,
        phone_number: row.phone_number,
        duration: row.duration,
        agent_speech_rate: row.agent_speech_rate,
        customer_speech_rate: row.customer_speech_rate,
        silence_rate: row.silence_rate,
        cross_talk_rate: row.cross_talk_rate,
        agent_interrupt_count: row.agent_interrupt_count,
        created_at: row.created_at,
        base_analysis_call_id: row.base_call_id,
        call_reason: row.call_reason,
        call_reason_detail: row.call_reason_detail,
        is_follow_up_required: row.follow_up_required,
        issue_analysis_id: row.issue_call_id,
        issue_sub_category: row.issue_sub_category,
        sub_issue_type: row.sub_issue_type,
        urgency_level: row.urgency_level,
        related_with_previous_call: row.related_with_previous_call,
        previous_call_relation_detail: row.related_detail,
    }
}

/// Read-only service for aggregate analysis results.
#[derive(Clone)]
pub struct AnalysisService {
    view: AnalysisViewRepository,
}

impl AnalysisService {
    pub fn new(ctx: &DbContext) -> Self {
        Self {
            view: ctx.analysis_view(),
        }
    }

    /// Fetch a filtered page together with the total matching count.
    ///
    /// Both queries run under the same filter; the count ignores
    /// pagination, so `count >= data.len()` always holds.
    pub async fn results_with_count(
        &self,
        filter: &AnalysisFilter,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<AnalysisPage, DieselError> {
        let rows = self.view.list(filter, limit, offset).await?;
        let count = self.view.count(filter).await?;

        Ok(AnalysisPage {
            count,
            data: rows.into_iter().map(to_dto).collect(),
        })
    }

    /// Fetch a single aggregate row by call id.
    pub async fn result_by_call_id(
        &self,
        call_id: &str,
    ) -> Result<Option<AnalysisResultDto>, DieselError> {
        Ok(self.view.get_by_call_id(call_id).await?.map(to_dto))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BaseAnalysisResult, Call, IssueAnalysisResult};
    use crate::repository::test_support::setup_test_db;

    #[test]
    fn test_metadata_normalization() {
        assert_eq!(normalize_organization_metadata(None), None);

        // A stored JSON document passes through unchanged
        let doc = r#"{"organization_name":"ACME"}"#;
        assert_eq!(
            normalize_organization_metadata(Some(doc)).as_deref(),
            Some(doc)
        );

        // Legacy bare text becomes a JSON string
        assert_eq!(
            normalize_organization_metadata(Some("plain text")).as_deref(),
            Some(r#""plain text""#)
        );
    }

    #[tokio::test]
    async fn test_churn_risk_presented_as_string() {
        let (ctx, _dir) = setup_test_db().await;
        let call_id = "123e4567-e89b-12d3-a456-426614174000";

        ctx.calls()
            .save(&Call {
                call_id: call_id.to_string(),
                agent_name: "alice".to_string(),
                phone_number: "5551234567".to_string(),
                duration: Some(60.0),
                agent_speech_rate: None,
                customer_speech_rate: None,
                silence_rate: None,
                cross_talk_rate: None,
                agent_interrupt_count: None,
                created_at: chrono::Utc::now(),
            })
            .await
            .unwrap();
        ctx.base_results()
            .insert(&BaseAnalysisResult {
                call_id: call_id.to_string(),
                call_reason: "billing".to_string(),
                call_reason_detail: "overcharge".to_string(),
                follow_up_required: true,
                organization_metadata: None,
            })
            .await
            .unwrap();
        ctx.issue_results()
            .insert(&IssueAnalysisResult {
                call_id: call_id.to_string(),
                sub_category: "pos_device".to_string(),
                sub_issue_type: "hardware_failure".to_string(),
                churn_risk: 7,
                urgency_level: "high".to_string(),
                related_with_previous_call: false,
                related_detail: String::new(),
            })
            .await
            .unwrap();

        let service = AnalysisService::new(&ctx);
        let dto = service.result_by_call_id(call_id).await.unwrap().unwrap();
        assert_eq!(dto.churn_risk.as_deref(), Some("7"));
        assert_eq!(dto.organization_metadata, None);

        // A call with no issue row keeps churn risk null
        assert!(service
            .result_by_call_id("ffffffff-ffff-ffff-ffff-ffffffffffff")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_count_is_pre_pagination() {
        let (ctx, _dir) = setup_test_db().await;
        for i in 0..5 {
            ctx.calls()
                .save(&Call {
                    call_id: format!("00000000-0000-0000-0000-00000000000{}", i),
                    agent_name: "alice".to_string(),
                    phone_number: "5551234567".to_string(),
                    duration: None,
                    agent_speech_rate: None,
                    customer_speech_rate: None,
                    silence_rate: None,
                    cross_talk_rate: None,
                    agent_interrupt_count: None,
                    created_at: chrono::Utc::now(),
                })
                .await
                .unwrap();
        }

        let service = AnalysisService::new(&ctx);
        let page = service
            .results_with_count(&AnalysisFilter::default(), Some(2), None)
            .await
            .unwrap();
        assert_eq!(page.count, 5);
        assert_eq!(page.data.len(), 2);
    }
}
