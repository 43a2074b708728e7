//! Failure injection tests: unreachable, slow, broken and erroring instances.

use std::time::{Duration, Instant};

use reqwest::StatusCode;
use serde_json::{json, Value};

use trace_federation::config::InstanceConfig;

mod common;

#[tokio::test]
async fn test_every_instance_down_is_500() {
    let config = common::federation_config(vec![
        InstanceConfig::new("a", common::closed_endpoint().await),
        InstanceConfig::new("b", common::closed_endpoint().await),
    ]);
    let federation = common::start_federation(config).await;

    let res = reqwest::get(federation.url("/api/search/tag/region/values"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = res.text().await.unwrap();
    assert!(
        body.starts_with("failed to combine tag values results: all 2 instances failed"),
        "unexpected body: {body}"
    );
}

#[tokio::test]
async fn test_every_instance_down_for_trace_is_500_not_404() {
    let config = common::federation_config(vec![
        InstanceConfig::new("a", common::closed_endpoint().await),
        InstanceConfig::new("b", common::closed_endpoint().await),
    ]);
    let federation = common::start_federation(config).await;

    let res = reqwest::get(federation.url("/api/traces/0af7651916cd43dd8448eb211c80319c"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_not_found_with_failures_is_404() {
    let missing = common::start_mock_instance(404, json!({})).await;
    let config = common::federation_config(vec![
        missing.config("a"),
        InstanceConfig::new("b", common::closed_endpoint().await),
    ]);
    let federation = common::start_federation(config).await;

    let res = reqwest::get(federation.url("/api/traces/0af7651916cd43dd8448eb211c80319c"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_slow_instance_bounded_by_query_timeout() {
    let fast = common::start_mock_instance(200, json!({ "tagNames": ["service.name"] })).await;
    let slow = common::start_slow_mock_instance(
        200,
        json!({ "tagNames": ["late"] }),
        Duration::from_secs(30),
    )
    .await;

    let mut config = common::federation_config(vec![fast.config("fast"), slow.config("slow")]);
    config.query.timeout_secs = 1;
    let federation = common::start_federation(config).await;

    let started = Instant::now();
    let res = reqwest::get(federation.url("/api/search/tags")).await.unwrap();
    let elapsed = started.elapsed();

    assert_eq!(res.status(), StatusCode::OK);
    assert!(elapsed < Duration::from_secs(5), "took {elapsed:?}");
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["tagNames"], json!(["service.name"]));
    assert_eq!(body["federation"]["instancesResponded"], 1);
    assert_eq!(body["federation"]["instancesFailed"], 1);
}

#[tokio::test]
async fn test_instance_timeout_tighter_than_query_timeout() {
    let fast = common::start_mock_instance(200, json!({ "tagNames": ["a"] })).await;
    let slow = common::start_slow_mock_instance(
        200,
        json!({ "tagNames": ["b"] }),
        Duration::from_secs(30),
    )
    .await;

    let mut slow_config = slow.config("slow");
    slow_config.timeout_secs = 1;
    let config = common::federation_config(vec![fast.config("fast"), slow_config]);
    let federation = common::start_federation(config).await;

    let started = Instant::now();
    let body: Value = reqwest::get(federation.url("/api/search/tags"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert!(started.elapsed() < Duration::from_secs(4));
    assert_eq!(body["tagNames"], json!(["a"]));
    assert_eq!(body["federation"]["instancesFailed"], 1);
}

#[tokio::test]
async fn test_malformed_body_counts_as_failure() {
    let good = common::start_mock_instance(200, common::search_body(&[("t1", 1)])).await;
    let garbage = common::start_garbage_instance().await;
    let config = common::federation_config(vec![good.config("good"), garbage.config("garbage")]);
    let federation = common::start_federation(config).await;

    let res = reqwest::get(federation.url("/api/search")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["traces"].as_array().unwrap().len(), 1);
    assert_eq!(body["federation"]["instancesFailed"], 1);
    assert_eq!(body["federation"]["instancesResponded"], 1);
}

#[tokio::test]
async fn test_instance_error_status_counts_as_failure() {
    let good = common::start_mock_instance(200, json!({ "tagValues": ["x"] })).await;
    let broken = common::start_mock_instance(500, json!({ "error": "compactor exploded" })).await;
    let config = common::federation_config(vec![good.config("good"), broken.config("broken")]);
    let federation = common::start_federation(config).await;

    let body: Value = reqwest::get(federation.url("/api/search/tag/region/values"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["tagValues"], json!(["x"]));
    assert_eq!(body["federation"]["instancesFailed"], 1);
}

#[tokio::test]
async fn test_not_found_on_tags_is_a_failure() {
    let good = common::start_mock_instance(200, json!({ "tagNames": ["x"] })).await;
    let missing = common::start_mock_instance(404, json!({})).await;
    let config = common::federation_config(vec![good.config("good"), missing.config("missing")]);
    let federation = common::start_federation(config).await;

    let body: Value = reqwest::get(federation.url("/api/search/tags"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["federation"]["instancesFailed"], 1);
    assert_eq!(body["federation"]["instancesNotFound"], 0);
}

#[tokio::test]
async fn test_strict_mode_rejects_partial_results() {
    let good = common::start_mock_instance(200, json!({ "tagNames": ["x"] })).await;
    let mut config = common::federation_config(vec![
        good.config("good"),
        InstanceConfig::new("down", common::closed_endpoint().await),
    ]);
    config.query.fail_on_partial = true;
    let federation = common::start_federation(config).await;

    let res = reqwest::get(federation.url("/api/search/tags")).await.unwrap();
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        res.text().await.unwrap(),
        "failed to combine tags results: 1 of 2 instances failed"
    );
}

#[tokio::test]
async fn test_invalid_limit_rejected() {
    let good = common::start_mock_instance(200, common::search_body(&[])).await;
    let federation = common::start_federation(common::federation_config(vec![good.config("a")])).await;

    let res = reqwest::get(federation.url("/api/search?limit=lots")).await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert!(good.requests().is_empty());
}
