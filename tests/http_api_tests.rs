//! HTTP surface tests driving the full router: authentication, tenant
//! scoping, and the booking flow end to end.

use anyhow::Result;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use chrono::{Duration, Utc};
use sea_orm::DatabaseConnection;
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

use roomops::config::AppConfig;
use roomops::server::{AppState, create_app};

#[path = "test_utils/mod.rs"]
mod test_utils;
use test_utils::{create_test_tenant, setup_test_db};

const TOKEN: &str = "test-token-123";

async fn setup_app() -> Result<(Router, DatabaseConnection, Uuid)> {
    let db = setup_test_db().await?;
    let tenant = create_test_tenant(&db).await?;

    let config = AppConfig {
        operator_tokens: vec![TOKEN.to_string()],
        profile: "test".to_string(),
        ..AppConfig::default()
    };
    let app = create_app(AppState::new(config, db.clone()));

    Ok((app, db, tenant.0))
}

fn api_request(
    method: &str,
    uri: &str,
    tenant: Option<Uuid>,
    body: Option<Value>,
) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", TOKEN));

    if let Some(tenant) = tenant {
        builder = builder.header("X-Tenant-Id", tenant.to_string());
    }

    match body {
        Some(value) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(value.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn root_and_health_are_open() -> Result<()> {
    let (app, _db, _tenant) = setup_app().await?;

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["service"], "roomops");

    let response = app
        .oneshot(
            Request::builder()
                .uri("/healthz")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    Ok(())
}

#[tokio::test]
async fn api_requires_bearer_token() -> Result<()> {
    let (app, _db, tenant) = setup_app().await?;

    let request = Request::builder()
        .method("GET")
        .uri("/api/v1/rooms")
        .header("X-Tenant-Id", tenant.to_string())
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    Ok(())
}

#[tokio::test]
async fn api_requires_tenant_header() -> Result<()> {
    let (app, _db, _tenant) = setup_app().await?;

    let response = app
        .oneshot(api_request("GET", "/api/v1/rooms", None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let (app, _db, _tenant) = setup_app().await?;
    let request = Request::builder()
        .method("GET")
        .uri("/api/v1/rooms")
        .header(header::AUTHORIZATION, format!("Bearer {}", TOKEN))
        .header("X-Tenant-Id", "not-a-uuid")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    Ok(())
}

#[tokio::test]
async fn room_creation_and_duplicate_names() -> Result<()> {
    let (app, _db, tenant) = setup_app().await?;

    let response = app
        .clone()
        .oneshot(api_request(
            "POST",
            "/api/v1/rooms",
            Some(tenant),
            Some(json!({ "name": "204", "base_rate": 120.0 })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = json_body(response).await;
    assert_eq!(body["name"], "204");
    assert_eq!(body["status"], "AVAILABLE");

    // Same name again conflicts.
    let response = app
        .clone()
        .oneshot(api_request(
            "POST",
            "/api/v1/rooms",
            Some(tenant),
            Some(json!({ "name": "204" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // Empty name is a validation failure.
    let response = app
        .oneshot(api_request(
            "POST",
            "/api/v1/rooms",
            Some(tenant),
            Some(json!({ "name": "  " })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["code"], "VALIDATION_FAILED");

    Ok(())
}

#[tokio::test]
async fn booking_flow_over_http() -> Result<()> {
    let (app, _db, tenant) = setup_app().await?;

    let response = app
        .clone()
        .oneshot(api_request(
            "POST",
            "/api/v1/rooms",
            Some(tenant),
            Some(json!({ "name": "301", "base_rate": 100.0 })),
        ))
        .await
        .unwrap();
    let room: Value = json_body(response).await;
    let room_id = room["id"].as_str().unwrap().to_string();

    // Book the next hour so check-in is inside the window.
    let start = Utc::now();
    let end = start + Duration::hours(1);

    let response = app
        .clone()
        .oneshot(api_request(
            "POST",
            "/api/v1/bookings",
            Some(tenant),
            Some(json!({
                "room_id": room_id,
                "start_at": start.to_rfc3339(),
                "end_at": end.to_rfc3339(),
                "guest_name": "A. Guest",
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let booking = json_body(response).await;
    assert_eq!(booking["status"], "RESERVED");
    assert_eq!(booking["amount"], 100.0);
    let booking_id = booking["id"].as_str().unwrap().to_string();

    // The probe now reports the same interval as unavailable with OVERLAP.
    let probe_uri = format!(
        "/api/v1/rooms/{}/availability?start={}&end={}",
        room_id,
        urlencode(&start.to_rfc3339()),
        urlencode(&end.to_rfc3339()),
    );
    let response = app
        .clone()
        .oneshot(api_request("GET", &probe_uri, Some(tenant), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let probe = json_body(response).await;
    assert_eq!(probe["available"], false);
    assert_eq!(probe["reason"], "OVERLAP");
    assert_eq!(probe["conflicts"].as_array().unwrap().len(), 1);

    // Check in, check out, complete housekeeping.
    let response = app
        .clone()
        .oneshot(api_request(
            "POST",
            &format!("/api/v1/bookings/{}/check-in", booking_id),
            Some(tenant),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let checked_in = json_body(response).await;
    assert_eq!(checked_in["status"], "CHECKED_IN");

    let response = app
        .clone()
        .oneshot(api_request(
            "POST",
            &format!("/api/v1/bookings/{}/check-out", booking_id),
            Some(tenant),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let checkout = json_body(response).await;
    assert_eq!(checkout["booking"]["status"], "CHECKED_OUT");
    assert_eq!(checkout["housekeeping_task"]["status"], "IN_PROGRESS");
    let task_id = checkout["housekeeping_task"]["id"].as_str().unwrap();

    let response = app
        .clone()
        .oneshot(api_request(
            "POST",
            &format!("/api/v1/housekeeping-tasks/{}/complete", task_id),
            Some(tenant),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let task = json_body(response).await;
    assert_eq!(task["status"], "CLEAN");

    // The room is bookable again.
    let response = app
        .oneshot(api_request("GET", "/api/v1/rooms", Some(tenant), None))
        .await
        .unwrap();
    let rooms = json_body(response).await;
    assert_eq!(rooms[0]["status"], "AVAILABLE");

    Ok(())
}

#[tokio::test]
async fn invalid_interval_is_a_bad_request() -> Result<()> {
    let (app, _db, tenant) = setup_app().await?;

    let response = app
        .clone()
        .oneshot(api_request(
            "POST",
            "/api/v1/rooms",
            Some(tenant),
            Some(json!({ "name": "302" })),
        ))
        .await
        .unwrap();
    let room = json_body(response).await;
    let room_id = room["id"].as_str().unwrap().to_string();

    let start = Utc::now();
    let response = app
        .oneshot(api_request(
            "POST",
            "/api/v1/bookings",
            Some(tenant),
            Some(json!({
                "room_id": room_id,
                "start_at": start.to_rfc3339(),
                "end_at": (start - Duration::hours(1)).to_rfc3339(),
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["code"], "INVALID_INTERVAL");

    Ok(())
}

#[tokio::test]
async fn kpi_endpoint_validates_window() -> Result<()> {
    let (app, _db, tenant) = setup_app().await?;

    let response = app
        .clone()
        .oneshot(api_request(
            "GET",
            "/api/v1/kpis?window=month_to_date",
            Some(tenant),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["window"], "month_to_date");
    assert_eq!(body["occupied"], 0);

    let response = app
        .oneshot(api_request(
            "GET",
            "/api/v1/kpis?window=fortnight",
            Some(tenant),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    Ok(())
}

#[tokio::test]
async fn errors_carry_trace_ids() -> Result<()> {
    let (app, _db, tenant) = setup_app().await?;

    let response = app
        .oneshot(api_request(
            "POST",
            &format!("/api/v1/bookings/{}/check-in", Uuid::new_v4()),
            Some(tenant),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(response.headers().get("X-Trace-Id").is_some());

    let body = json_body(response).await;
    assert_eq!(body["code"], "NOT_FOUND");
    assert!(body["trace_id"].is_string());

    Ok(())
}

/// Percent-encode the characters RFC 3339 timestamps put in query strings.
fn urlencode(value: &str) -> String {
    value.replace('+', "%2B").replace(':', "%3A")
}
