//! Wire DTOs for the REST API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::services::{AnalysisResultDto, MerchantCompleteDto};

/// Generic response envelope for single-object endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T> {
    pub is_success: bool,
    pub message: Option<String>,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            is_success: true,
            message: None,
            data,
        }
    }
}

/// Response envelope for the aggregate list endpoint: a data page plus
/// the pre-pagination match count.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisListResponse {
    pub is_success: bool,
    pub count: u64,
    pub message: Option<String>,
    pub data: Vec<AnalysisResultDto>,
}

/// Health check payload.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
    pub version: &'static str,
}

/// Body of the merchant batch lookup.
#[derive(Debug, Clone, Deserialize)]
pub struct MerchantBatchRequest {
    pub merchant_ids: Vec<i32>,
}

/// Response of the merchant batch lookup.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MerchantBatchResponse {
    pub merchants: Vec<MerchantCompleteDto>,
    pub total_count: usize,
}

/// Body for creating a call row over the API.
///
/// The call id is optional; a fresh UUID is assigned when absent, and
/// the creation timestamp defaults to now.
#[derive(Debug, Clone, Deserialize)]
pub struct CallCreateRequest {
    pub call_id: Option<String>,
    pub agent_name: String,
    pub phone_number: String,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub agent_speech_rate: Option<f64>,
    #[serde(default)]
    pub customer_speech_rate: Option<f64>,
    #[serde(default)]
    pub silence_rate: Option<f64>,
    #[serde(default)]
    pub cross_talk_rate: Option<f64>,
    #[serde(default)]
    pub agent_interrupt_count: Option<i32>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}
