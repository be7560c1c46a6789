//! Analysis result models derived from artifact files.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Base analysis of a call, produced for every analyzed conversation.
///
/// The organization metadata field starts out empty and is filled in
/// exactly once by a later ingestion pass; it is never overwritten.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseAnalysisResult {
    /// Call identifier this analysis belongs to (1:1 with the call).
    pub call_id: String,
    /// Why the customer called.
    pub call_reason: String,
    /// Free-text elaboration of the call reason.
    pub call_reason_detail: String,
    /// Whether the call needs a follow-up.
    pub follow_up_required: bool,
    /// Organization metadata as a JSON string, once the metadata pass ran.
    pub organization_metadata: Option<String>,
}

/// Issue-specific analysis, present only for calls flagged as issues.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueAnalysisResult {
    /// Call identifier (1:1 with the base analysis).
    pub call_id: String,
    /// Issue sub category.
    pub sub_category: String,
    /// Sub issue type.
    pub sub_issue_type: String,
    /// Customer attrition risk, 0-10 inclusive.
    pub churn_risk: i32,
    /// Urgency level label.
    pub urgency_level: String,
    /// Whether the issue relates to a previous call.
    pub related_with_previous_call: bool,
    /// Detail of the previous-call relation.
    pub related_detail: String,
}

/// Organization metadata extracted from the semi-structured
/// `key='value'` string carried by analysis artifacts.
///
/// Every field is optional in the source; a failed capture yields an
/// empty string rather than an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrganizationMetadata {
    pub organization_id: String,
    pub organization_name: String,
    pub organization_type: String,
    pub organization_industry: String,
    pub organization_phone: String,
}

impl OrganizationMetadata {
    /// True when no capture produced a value.
    pub fn is_empty(&self) -> bool {
        self.organization_id.is_empty()
            && self.organization_name.is_empty()
            && self.organization_type.is_empty()
            && self.organization_industry.is_empty()
            && self.organization_phone.is_empty()
    }
}

/// One row of the read-only aggregate view: a call left-joined to its
/// base and issue analysis results. Base and issue columns are None
/// when the corresponding row does not exist.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisRow {
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
    pub base_call_id: Option<String>,
    pub call_reason: Option<String>,
    pub call_reason_detail: Option<String>,
    pub follow_up_required: Option<bool>,
    pub organization_metadata: Option<String>,
    pub issue_call_id: Option<String>,
    pub issue_sub_category: Option<String>,
    pub sub_issue_type: Option<String>,
    pub churn_risk: Option<i32>,
    pub urgency_level: Option<String>,
    pub related_with_previous_call: Option<bool>,
    pub related_detail: Option<String>,
}
