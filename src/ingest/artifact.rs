//! Analysis artifact parsing.
//!
//! An artifact is a JSON file produced by the analysis pipeline: an
//! array whose first element carries an `insights` object and,
//! optionally, an `organization_metadata` string. Only the first
//! element is ever read; anything structurally off is a per-file parse
//! failure for the converters.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

/// Errors raised while reading a single artifact file.
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("failed to read file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("expected a non-empty JSON array")]
    NotAnArray,

    #[error("first element has no insights object")]
    MissingInsights,
}

/// First element of an analysis artifact.
#[derive(Debug, Clone, Deserialize)]
pub struct ArtifactEntry {
    #[serde(default)]
    pub insights: Option<Insights>,
    #[serde(default)]
    pub organization_metadata: Option<String>,
}

/// The `insights` object of an artifact.
///
/// `issue_sub_category` doubles as the issue sentinel: when it is null
/// the call carries no issue analysis. `churn_risk` stays a raw JSON
/// value so the issue converter can reject non-integer payloads itself.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Insights {
    pub call_reason: String,
    pub call_reason_detail: String,
    pub is_follow_up_required: bool,
    pub issue_sub_category: Option<String>,
    pub sub_issue_type: Option<String>,
    pub churn_risk: Option<serde_json::Value>,
    pub urgency_level: Option<String>,
    pub related_with_previous_call: bool,
    pub related_with_previous_call_detail: Option<String>,
}

/// Read an artifact file and return its first element.
pub fn read_artifact(path: &Path) -> Result<ArtifactEntry, ArtifactError> {
    let content = std::fs::read_to_string(path)?;
    let value: serde_json::Value = serde_json::from_str(&content)?;

    let first = value
        .as_array()
        .and_then(|arr| arr.first())
        .ok_or(ArtifactError::NotAnArray)?;

    Ok(serde_json::from_value(first.clone())?)
}

/// Read an artifact and require its `insights` object.
pub fn read_insights(path: &Path) -> Result<Insights, ArtifactError> {
    read_artifact(path)?
        .insights
        .ok_or(ArtifactError::MissingInsights)
}
