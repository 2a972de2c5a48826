//! Route tests against the router built with in-memory collaborators.

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use factsheet_weights::{
    testing::{MockFetcher, MockHoldings, MockOcr, MockResolver, MockTextExtractor},
    CacheEntry, CacheStore, ConstituentWeight, FetchLog, FetchLogEntry, MemoryStore, StoreError,
    WeightsStore, WeightsWorkflow,
};
use serde_json::Value;
use tower::ServiceExt;
use weights_server::build_app;

const ISIN: &str = "CH0454664001";
const PDF_URL: &str = "https://cdn.21shares.com/uploads/current-documents/factsheets/all/Factsheet_ABTC.pdf";

/// A store whose database is gone.
struct UnreachableStore;

fn unreachable() -> StoreError {
    StoreError::Database("connection refused".into())
}

#[async_trait]
impl CacheStore for UnreachableStore {
    async fn get_entry(&self, _isin: &str) -> Result<Option<CacheEntry>, StoreError> {
        Err(unreachable())
    }

    async fn upsert_entry(&self, _entry: &CacheEntry) -> Result<(), StoreError> {
        Err(unreachable())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Err(unreachable())
    }
}

#[async_trait]
impl FetchLog for UnreachableStore {
    async fn append(&self, _entry: &FetchLogEntry) -> Result<(), StoreError> {
        Err(unreachable())
    }
}

fn app_with(store: Arc<dyn WeightsStore>) -> Router {
    let workflow = WeightsWorkflow::new(
        Arc::new(MockResolver::new()),
        Arc::new(MockFetcher::new()),
        Arc::new(MockTextExtractor::new()),
        Arc::new(MockHoldings::new()),
        Arc::new(MockOcr::new()),
        store,
    );
    build_app(Arc::new(workflow))
}

fn cached_app() -> Router {
    let entry = CacheEntry::success(
        ISIN,
        PDF_URL,
        &[ConstituentWeight::whole("BTC")],
        chrono::Utc::now(),
        chrono::Duration::hours(1),
        1,
    )
    .unwrap();
    app_with(Arc::new(MemoryStore::new().with_entry(entry)))
}

async fn post_weights(app: Router, body: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/weights")
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn get_health(app: Router) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri("/api/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_weights_returns_result() {
    let (status, json) = post_weights(cached_app(), r#"{"isin": "ch0454664001"}"#).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["isin"], ISIN);
    assert_eq!(json["cacheStatus"], "HIT");
    assert_eq!(json["sourcePdfUrl"], PDF_URL);
    assert_eq!(json["constituents"][0]["name"], "BTC");
    assert_eq!(json["constituents"][0]["weight"], 100.0);
}

#[tokio::test]
async fn test_weights_maps_workflow_error() {
    let (status, json) = post_weights(cached_app(), r#"{"isin": "XX"}"#).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "INVALID_IDENTIFIER");
    assert!(json["error"].is_string());
    assert!(json["httpStatus"].is_null());
}

#[tokio::test]
async fn test_weights_rejects_bad_body() {
    for body in [r#"{}"#, r#"{"isin": 42}"#, r#"{"isin": ""}"#, "not json"] {
        let (status, json) = post_weights(cached_app(), body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", body);
        assert!(json["error"].is_string());
        assert!(json.get("code").is_none());
    }
}

#[tokio::test]
async fn test_health_ok() {
    let (status, json) = get_health(app_with(Arc::new(MemoryStore::new()))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["db"], "connected");
    assert!(json["timestamp"].is_string());
}

#[tokio::test]
async fn test_health_reports_unreachable_database() {
    let (status, json) = get_health(app_with(Arc::new(UnreachableStore))).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["status"], "error");
    assert_eq!(json["db"], "disconnected");
    assert!(json["message"].as_str().unwrap().contains("connection refused"));
}

#[tokio::test]
async fn test_store_failures_do_not_escape_the_workflow() {
    let (status, json) = post_weights(app_with(Arc::new(UnreachableStore)), r#"{"isin": "CH0454664001"}"#).await;

    // cache read fails as a miss, then nothing resolves
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "URL_NOT_FOUND");
}
