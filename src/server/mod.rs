//! REST API server.
//!
//! Exposes the aggregate analysis view, call records, composite
//! merchant lookups and a thin proxy to the external vector-search
//! service. Each request handler acquires its own database connection
//! for the lifetime of the request.

mod dto;
mod handlers;
mod routes;

pub use routes::create_router;

use std::net::SocketAddr;

use crate::config::Settings;
use crate::repository::DbContext;
use crate::services::{AnalysisService, MerchantService, SearchApiClient};

/// Shared state for the web server.
#[derive(Clone)]
pub struct AppState {
    pub db: DbContext,
    pub analysis: AnalysisService,
    pub merchants: MerchantService,
    pub search: SearchApiClient,
}

impl AppState {
    pub fn new(settings: &Settings) -> Self {
        let db = settings.create_db_context();
        Self {
            analysis: AnalysisService::new(&db),
            merchants: MerchantService::new(&db),
            search: SearchApiClient::new(&settings.search_api_url),
            db,
        }
    }
}

/// Start the web server.
pub async fn serve(settings: &Settings, host: &str, port: u16) -> anyhow::Result<()> {
    let state = AppState::new(settings);
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    tracing::info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use crate::models::{BaseAnalysisResult, Call, Merchant, MerchantPerson, MerchantTicket};
    use crate::repository::test_support::setup_test_db;

    const CALL_ID: &str = "123e4567-e89b-12d3-a456-426614174000";

    fn make_app(ctx: &DbContext) -> axum::Router {
        let state = AppState {
            db: ctx.clone(),
            analysis: AnalysisService::new(ctx),
            merchants: MerchantService::new(ctx),
            search: SearchApiClient::new("http://localhost:8083"),
        };
        create_router(state)
    }

    async fn setup_test_app() -> (axum::Router, DbContext, tempfile::TempDir) {
        let (ctx, dir) = setup_test_db().await;
        let app = make_app(&ctx);
        (app, ctx, dir)
    }

    async fn setup_test_app_with_data() -> (axum::Router, DbContext, tempfile::TempDir) {
        let (ctx, dir) = setup_test_db().await;

        for i in 0..4 {
            let call_id = if i == 0 {
                CALL_ID.to_string()
            } else {
                format!("00000000-0000-0000-0000-00000000000{}", i)
            };
            ctx.calls()
                .save(&Call {
                    call_id: call_id.clone(),
                    agent_name: "Ayşe Yılmaz".to_string(),
                    phone_number: "5318671534".to_string(),
                    duration: Some(125.5),
                    agent_speech_rate: Some(52.3),
                    customer_speech_rate: Some(38.1),
                    silence_rate: Some(7.2),
                    cross_talk_rate: Some(2.4),
                    agent_interrupt_count: Some(2),
                    created_at: chrono::Utc::now(),
                })
                .await
                .unwrap();

            ctx.base_results()
                .insert(&BaseAnalysisResult {
                    call_id,
                    call_reason: "billing".to_string(),
                    call_reason_detail: "overcharge".to_string(),
                    follow_up_required: i < 3,
                    organization_metadata: None,
                })
                .await
                .unwrap();
        }

        ctx.merchants()
            .insert(&Merchant {
                merchant_id: 301,
                name: "NUR TİCARET".to_string(),
                brand: None,
                status: Some("active".to_string()),
                city: Some("İstanbul".to_string()),
                district: None,
                address: None,
                tax_no: None,
                tax_office: None,
                sector: Some("Elektrik - Elektronik".to_string()),
                employee_count: Some(4),
                hardware: None,
                fiscal_no: None,
                service: None,
                ticket_summary: None,
                inserted_at: chrono::Utc::now(),
            })
            .await
            .unwrap();
        ctx.merchant_persons()
            .insert(&MerchantPerson {
                merchant_id: 301,
                state: Some(1),
                name: Some("Owner".to_string()),
                phone: Some("5318671534".to_string()),
            })
            .await
            .unwrap();
        ctx.merchant_tickets()
            .insert(&MerchantTicket {
                ticket_id: 9,
                merchant_id: 301,
                order_no: None,
                type_id: Some(1),
                kind_id: None,
                sub_type_id: None,
                ticket_time: None,
                explanation: Some("terminal down".to_string()),
                first_explanation: None,
            })
            .await
            .unwrap();
        ctx.ticket_details()
            .insert(9, Some("reseated cables"))
            .await
            .unwrap();

        let app = make_app(&ctx);
        (app, ctx, dir)
    }

    async fn get_json(app: &axum::Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if body.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&body).unwrap()
        };
        (status, json)
    }

    async fn post_json(
        app: &axum::Router,
        uri: &str,
        body: serde_json::Value,
    ) -> (StatusCode, serde_json::Value) {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    #[tokio::test]
    async fn test_health() {
        let (app, _ctx, _dir) = setup_test_app().await;

        let (status, json) = get_json(&app, "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
        assert!(json["timestamp"].is_string());
    }

    #[tokio::test]
    async fn test_analysis_results_empty() {
        let (app, _ctx, _dir) = setup_test_app().await;

        let (status, json) = get_json(&app, "/analysis-result").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["is_success"], true);
        assert_eq!(json["count"], 0);
        assert_eq!(json["data"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_analysis_results_count_is_pre_pagination() {
        let (app, _ctx, _dir) = setup_test_app_with_data().await;

        let (status, json) =
            get_json(&app, "/analysis-result?follow_up_required=true&limit=2").await;
        assert_eq!(status, StatusCode::OK);
        // Three rows match; the page holds two
        assert_eq!(json["count"], 3);
        assert_eq!(json["data"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_analysis_results_unknown_filter_is_ignored() {
        let (app, _ctx, _dir) = setup_test_app_with_data().await;

        let (status, json) = get_json(&app, "/analysis-result?sort_by=duration").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["count"], 4);
    }

    #[tokio::test]
    async fn test_analysis_results_bad_limit_is_rejected() {
        let (app, _ctx, _dir) = setup_test_app().await;

        let (status, _) = get_json(&app, "/analysis-result?limit=0").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = get_json(&app, "/analysis-result?limit=1001").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_analysis_result_by_call_id() {
        let (app, _ctx, _dir) = setup_test_app_with_data().await;

        let (status, json) = get_json(&app, &format!("/analysis-result/{}", CALL_ID)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["is_success"], true);
        assert_eq!(json["data"]["call_id"], CALL_ID);
        assert_eq!(json["data"]["call_reason"], "billing");
        // Churn risk stays null without an issue row
        assert!(json["data"]["churn_risk"].is_null());

        let (status, _) =
            get_json(&app, "/analysis-result/ffffffff-ffff-ffff-ffff-ffffffffffff").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = get_json(&app, "/analysis-result/not-a-uuid").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_call_create_and_fetch() {
        let (app, _ctx, _dir) = setup_test_app().await;

        let (status, json) = post_json(
            &app,
            "/call",
            serde_json::json!({
                "agent_name": "Bob",
                "phone_number": "5551234567",
                "duration": 42.0
            }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let call_id = json["data"]["call_id"].as_str().unwrap().to_string();

        let (status, json) = get_json(&app, &format!("/call/{}", call_id)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["agent_name"], "Bob");
        assert_eq!(json["data"]["duration"], 42.0);

        let (status, json) = get_json(&app, "/call").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_merchant_complete() {
        let (app, _ctx, _dir) = setup_test_app_with_data().await;

        let (status, json) = get_json(&app, "/api/v1/merchants/complete/301").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["merchantId"], 301);
        assert_eq!(json["merchantName"], "NUR TİCARET");
        assert_eq!(json["merchantPersonName"], "Owner");
        // Zero contacts render as null, not []
        assert!(json["contactIds"].is_null());
        assert_eq!(json["tickets"][0]["ticketDetail"], "reseated cables");

        let (status, _) = get_json(&app, "/api/v1/merchants/complete/999").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_merchant_batch_bounds() {
        let (app, _ctx, _dir) = setup_test_app_with_data().await;

        let (status, _) =
            post_json(&app, "/api/v1/merchants/complete/batch", serde_json::json!({"merchant_ids": []}))
                .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let too_many: Vec<i32> = (0..101).collect();
        let (status, _) = post_json(
            &app,
            "/api/v1/merchants/complete/batch",
            serde_json::json!({"merchant_ids": too_many}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        // Missing ids are skipped, not errors
        let (status, json) = post_json(
            &app,
            "/api/v1/merchants/complete/batch",
            serde_json::json!({"merchant_ids": [301, 999]}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["totalCount"], 1);
        assert_eq!(json["merchants"][0]["merchantId"], 301);
    }

    #[tokio::test]
    async fn test_merchants_by_query_ids() {
        let (app, _ctx, _dir) = setup_test_app_with_data().await;

        let (status, json) = get_json(
            &app,
            "/api/v1/merchants/complete?merchant_ids=301&merchant_ids=999",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json.as_array().unwrap().len(), 1);

        let (status, _) = get_json(&app, "/api/v1/merchants/complete").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_merchant_phone_lookup() {
        let (app, _ctx, _dir) = setup_test_app_with_data().await;

        // Country code and leading zero both normalize away
        for phone in ["905318671534", "05318671534", "5318671534"] {
            let (status, json) =
                get_json(&app, &format!("/api/v1/merchants/search/phone/{}", phone)).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(json["merchantId"], 301);
        }

        let (status, _) = get_json(&app, "/api/v1/merchants/search/phone/12345").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = get_json(&app, "/api/v1/merchants/search/phone/5550000000").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_search_proxy_rejects_invalid_request_before_forwarding() {
        let (app, _ctx, _dir) = setup_test_app().await;

        // limit out of bounds never reaches the (absent) search service
        let (status, _) = post_json(
            &app,
            "/search/collections/calls/search",
            serde_json::json!({"vector": [0.1, 0.2], "limit": 0}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = post_json(
            &app,
            "/search/collections/calls/search/text",
            serde_json::json!({"query": ""}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
