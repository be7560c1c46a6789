//! HTTP request handlers for the REST API.

use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use super::dto::{
    AnalysisListResponse, ApiResponse, CallCreateRequest, HealthResponse, MerchantBatchRequest,
    MerchantBatchResponse,
};
use super::AppState;
use crate::models::Call;
use crate::repository::AnalysisFilter;
use crate::services::search_api::{
    BatchSearchRequest, RecommendRequest, SearchRequest, TextSearchRequest,
};
use crate::services::{normalize_phone, validate_batch_ids, SearchApiError};

fn internal_error(e: impl std::fmt::Display) -> Response {
    tracing::error!("Internal error: {}", e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({"detail": "Internal server error"})),
    )
        .into_response()
}

fn bad_request(detail: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(serde_json::json!({"detail": detail})),
    )
        .into_response()
}

fn not_found(detail: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({"detail": detail})),
    )
        .into_response()
}

/// Health check.
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy",
        timestamp: Utc::now(),
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Parse a creation-time bound, expanding date-only values to the start
/// or end of the day.
fn parse_time_bound(value: &str, end_of_day: bool) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(naive.and_utc());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        let naive = if end_of_day {
            date.and_hms_opt(23, 59, 59)?
        } else {
            date.and_hms_opt(0, 0, 0)?
        };
        return Some(naive.and_utc());
    }
    None
}

/// Build the closed filter struct from the raw query map.
///
/// Unknown keys and unparsable values of known keys are logged and
/// ignored; only pagination bounds are strict enough to reject the
/// request.
fn build_filter(
    params: &HashMap<String, String>,
) -> Result<(AnalysisFilter, Option<i64>, Option<i64>), String> {
    let mut filter = AnalysisFilter::default();
    let mut limit = None;
    let mut offset = None;

    macro_rules! numeric {
        ($target:expr, $ty:ty, $key:expr, $value:expr) => {{
            match $value.parse::<$ty>() {
                Ok(v) => $target = Some(v),
                Err(_) => tracing::warn!("Ignoring invalid value for filter {}: {}", $key, $value),
            }
        }};
    }

    for (key, value) in params {
        match key.as_str() {
            "limit" => match value.parse::<i64>() {
                Ok(v) if (1..=1000).contains(&v) => limit = Some(v),
                _ => return Err(format!("limit must be an integer in 1..=1000, got '{}'", value)),
            },
            "offset" => match value.parse::<i64>() {
                Ok(v) if v >= 0 => offset = Some(v),
                _ => return Err(format!("offset must be a non-negative integer, got '{}'", value)),
            },
            "agent_name" => filter.agent_name = Some(value.clone()),
            "phone_number" => filter.phone_number = Some(value.clone()),
            "follow_up_required" => match value.parse::<bool>() {
                Ok(v) => filter.follow_up_required = Some(v),
                Err(_) => {
                    tracing::warn!("Ignoring invalid value for filter {}: {}", key, value)
                }
            },
            "reason_contains" => filter.reason_contains = Some(value.clone()),
            "created_at_from" => match parse_time_bound(value, false) {
                Some(v) => filter.created_from = Some(v),
                None => tracing::warn!("Ignoring invalid created_at_from date: {}", value),
            },
            "created_at_to" => match parse_time_bound(value, true) {
                Some(v) => filter.created_to = Some(v),
                None => tracing::warn!("Ignoring invalid created_at_to date: {}", value),
            },
            "duration_min" => numeric!(filter.duration_min, f64, key, value),
            "duration_max" => numeric!(filter.duration_max, f64, key, value),
            "agent_speech_rate_min" => numeric!(filter.agent_speech_rate_min, f64, key, value),
            "agent_speech_rate_max" => numeric!(filter.agent_speech_rate_max, f64, key, value),
            "customer_speech_rate_min" => numeric!(filter.customer_speech_rate_min, f64, key, value),
            "customer_speech_rate_max" => numeric!(filter.customer_speech_rate_max, f64, key, value),
            "silence_rate_min" => numeric!(filter.silence_rate_min, f64, key, value),
            "silence_rate_max" => numeric!(filter.silence_rate_max, f64, key, value),
            "cross_talk_rate_min" => numeric!(filter.cross_talk_rate_min, f64, key, value),
            "cross_talk_rate_max" => numeric!(filter.cross_talk_rate_max, f64, key, value),
            "agent_interrupt_count_min" => numeric!(filter.agent_interrupt_count_min, i32, key, value),
            "agent_interrupt_count_max" => numeric!(filter.agent_interrupt_count_max, i32, key, value),
            "churn_risk_min" => numeric!(filter.churn_risk_min, i32, key, value),
            "churn_risk_max" => numeric!(filter.churn_risk_max, i32, key, value),
            unknown => tracing::warn!("Ignoring unknown filter key: {}", unknown),
        }
    }

    Ok((filter, limit, offset))
}

/// List aggregate analysis results with filters, pagination and a total
/// count computed under the same filter.
pub async fn list_analysis_results(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let (filter, limit, offset) = match build_filter(&params) {
        Ok(parsed) => parsed,
        Err(detail) => return bad_request(&detail),
    };

    match state.analysis.results_with_count(&filter, limit, offset).await {
        Ok(page) => Json(AnalysisListResponse {
            is_success: true,
            count: page.count,
            message: None,
            data: page.data,
        })
        .into_response(),
        Err(e) => internal_error(e),
    }
}

/// Fetch one aggregate row by call id.
pub async fn get_analysis_result(
    State(state): State<AppState>,
    Path(call_id): Path<String>,
) -> Response {
    if uuid::Uuid::parse_str(&call_id).is_err() {
        return bad_request("call_id must be a UUID");
    }

    match state.analysis.result_by_call_id(&call_id).await {
        Ok(Some(dto)) => Json(ApiResponse::ok(dto)).into_response(),
        Ok(None) => not_found("Analysis result not found for the specified call"),
        Err(e) => internal_error(e),
    }
}

/// List all calls.
pub async fn list_calls(State(state): State<AppState>) -> Response {
    match state.db.calls().get_all().await {
        Ok(calls) => Json(ApiResponse::ok(calls)).into_response(),
        Err(e) => internal_error(e),
    }
}

/// Fetch one call by id.
pub async fn get_call(State(state): State<AppState>, Path(call_id): Path<String>) -> Response {
    if uuid::Uuid::parse_str(&call_id).is_err() {
        return bad_request("call_id must be a UUID");
    }

    match state.db.calls().get(&call_id).await {
        Ok(Some(call)) => Json(ApiResponse::ok(call)).into_response(),
        Ok(None) => not_found("Call not found"),
        Err(e) => internal_error(e),
    }
}

/// Create (or replace) a call row.
pub async fn create_call(
    State(state): State<AppState>,
    Json(body): Json<CallCreateRequest>,
) -> Response {
    let call_id = match body.call_id {
        Some(id) => {
            if uuid::Uuid::parse_str(&id).is_err() {
                return bad_request("call_id must be a UUID");
            }
            id.to_lowercase()
        }
        None => uuid::Uuid::new_v4().to_string(),
    };

    let item = Call {
        call_id,
        agent_name: body.agent_name,
        phone_number: body.phone_number,
        duration: body.duration,
        agent_speech_rate: body.agent_speech_rate,
        customer_speech_rate: body.customer_speech_rate,
        silence_rate: body.silence_rate,
        cross_talk_rate: body.cross_talk_rate,
        agent_interrupt_count: body.agent_interrupt_count,
        created_at: body.created_at.unwrap_or_else(Utc::now),
    };

    match state.db.calls().save(&item).await {
        Ok(()) => Json(ApiResponse::ok(item)).into_response(),
        Err(e) => internal_error(e),
    }
}

/// Composite merchant lookup by id.
pub async fn merchant_complete(
    State(state): State<AppState>,
    Path(merchant_id): Path<i32>,
) -> Response {
    match state.merchants.merchant_complete(merchant_id).await {
        Ok(Some(dto)) => Json(dto).into_response(),
        Ok(None) => not_found(&format!("Merchant not found: {}", merchant_id)),
        Err(e) => internal_error(e),
    }
}

/// Composite merchant batch lookup (request body).
pub async fn merchants_batch(
    State(state): State<AppState>,
    Json(body): Json<MerchantBatchRequest>,
) -> Response {
    if let Err(e) = validate_batch_ids(&body.merchant_ids) {
        return bad_request(&e.to_string());
    }

    match state.merchants.merchants_batch(&body.merchant_ids).await {
        Ok(merchants) => {
            let total_count = merchants.len();
            Json(MerchantBatchResponse {
                merchants,
                total_count,
            })
            .into_response()
        }
        Err(e) => internal_error(e),
    }
}

/// Composite merchant lookup via repeated `merchant_ids` query params.
pub async fn merchants_by_ids(
    State(state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
) -> Response {
    let mut merchant_ids = Vec::new();
    for (key, value) in params {
        if key != "merchant_ids" {
            tracing::warn!("Ignoring unknown query key: {}", key);
            continue;
        }
        match value.parse::<i32>() {
            Ok(id) => merchant_ids.push(id),
            Err(_) => return bad_request(&format!("invalid merchant id: '{}'", value)),
        }
    }

    if let Err(e) = validate_batch_ids(&merchant_ids) {
        return bad_request(&e.to_string());
    }

    match state.merchants.merchants_batch(&merchant_ids).await {
        Ok(merchants) => Json(merchants).into_response(),
        Err(e) => internal_error(e),
    }
}

/// Composite merchant lookup by phone number.
pub async fn merchant_by_phone(
    State(state): State<AppState>,
    Path(phone): Path<String>,
) -> Response {
    let canonical = match normalize_phone(&phone) {
        Ok(p) => p,
        Err(e) => return bad_request(&e.to_string()),
    };

    match state.merchants.merchant_by_phone(&canonical).await {
        Ok(Some(dto)) => Json(dto).into_response(),
        Ok(None) => not_found(&format!("No merchant found for phone: {}", phone)),
        Err(e) => internal_error(e),
    }
}

fn search_error(e: SearchApiError) -> Response {
    match e {
        SearchApiError::InvalidRequest(detail) => bad_request(&detail),
        SearchApiError::Upstream { status, message } => {
            tracing::error!("Search service error {}: {}", status, message);
            (
                StatusCode::BAD_GATEWAY,
                Json(serde_json::json!({"detail": "Search service error"})),
            )
                .into_response()
        }
        SearchApiError::Connection(e) => {
            tracing::error!("Search service unreachable: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(serde_json::json!({"detail": "Search service unavailable"})),
            )
                .into_response()
        }
    }
}

/// Health of the external search service.
pub async fn search_health(State(state): State<AppState>) -> Response {
    match state.search.health().await {
        Ok(value) => Json(value).into_response(),
        Err(e) => search_error(e),
    }
}

/// List search collections.
pub async fn search_collections(State(state): State<AppState>) -> Response {
    match state.search.list_collections().await {
        Ok(names) => Json(names).into_response(),
        Err(e) => search_error(e),
    }
}

/// Collection metadata.
pub async fn search_collection_info(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Response {
    match state.search.collection_info(&name).await {
        Ok(info) => Json(info).into_response(),
        Err(e) => search_error(e),
    }
}

/// Vector search proxy.
pub async fn search_vectors(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(request): Json<SearchRequest>,
) -> Response {
    match state.search.search(&name, &request).await {
        Ok(found) => Json(found).into_response(),
        Err(e) => search_error(e),
    }
}

/// Text search proxy.
pub async fn search_text(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(request): Json<TextSearchRequest>,
) -> Response {
    match state.search.text_search(&name, &request).await {
        Ok(found) => Json(found).into_response(),
        Err(e) => search_error(e),
    }
}

/// Recommendation proxy.
pub async fn search_recommend(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(request): Json<RecommendRequest>,
) -> Response {
    match state.search.recommend(&name, &request).await {
        Ok(found) => Json(found).into_response(),
        Err(e) => search_error(e),
    }
}

/// Batch search proxy.
pub async fn search_batch(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(request): Json<BatchSearchRequest>,
) -> Response {
    match state.search.batch_search(&name, &request).await {
        Ok(found) => Json(found).into_response(),
        Err(e) => search_error(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_bound_expansion() {
        // Date-only values expand to the bounds of the day
        assert_eq!(
            parse_time_bound("2025-07-24", false).unwrap().to_rfc3339(),
            "2025-07-24T00:00:00+00:00"
        );
        assert_eq!(
            parse_time_bound("2025-07-24", true).unwrap().to_rfc3339(),
            "2025-07-24T23:59:59+00:00"
        );
        assert!(parse_time_bound("2025-07-24 13:30:00", false).is_some());
        assert!(parse_time_bound("2025-07-24T13:30:00Z", false).is_some());
        assert!(parse_time_bound("yesterday", false).is_none());
    }

    #[test]
    fn test_build_filter_ignores_unknown_keys() {
        let mut params = HashMap::new();
        params.insert("agent_name".to_string(), "alice".to_string());
        params.insert("sort_by".to_string(), "duration".to_string());
        params.insert("churn_risk_min".to_string(), "not-a-number".to_string());

        let (filter, limit, offset) = build_filter(&params).unwrap();
        assert_eq!(filter.agent_name.as_deref(), Some("alice"));
        // Unknown key and unparsable value both fall away silently
        assert_eq!(filter.churn_risk_min, None);
        assert_eq!(limit, None);
        assert_eq!(offset, None);
    }

    #[test]
    fn test_build_filter_rejects_bad_pagination() {
        let mut params = HashMap::new();
        params.insert("limit".to_string(), "0".to_string());
        assert!(build_filter(&params).is_err());

        params.insert("limit".to_string(), "1001".to_string());
        assert!(build_filter(&params).is_err());

        params.insert("limit".to_string(), "100".to_string());
        params.insert("offset".to_string(), "-1".to_string());
        assert!(build_filter(&params).is_err());
    }
}
