mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use crate::common::{cause, test_router, FakeRegistry};

async fn get_json(router: axum::Router, uri: &str) -> (StatusCode, Value) {
    let response = router
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&body).unwrap();
    (status, json)
}

#[tokio::test]
async fn test_list_causes_success() {
    let registry = FakeRegistry::new()
        .with_cause(cause(1, "Clean Water", 10, 1500))
        .with_cause(cause(2, "School Books", 4, 1000));
    let (status, json) = get_json(test_router(registry), "/api/causes").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ready");
    assert_eq!(json["total"], 2);
    assert_eq!(json["partial_failures"], 0);

    let causes = json["causes"].as_array().unwrap();
    assert_eq!(causes[0]["name"], "Clean Water");
    // 1.5 of 10 ETH -> 15%
    assert_eq!(causes[0]["funded_percentage"], 15);
    // 1.0 of 4 ETH -> 25%
    assert_eq!(causes[1]["funded_percentage"], 25);
}

#[tokio::test]
async fn test_list_causes_excludes_inactive() {
    let mut inactive = cause(2, "Dormant", 10, 0);
    inactive.is_active = false;
    let registry = FakeRegistry::new()
        .with_cause(cause(1, "Active", 10, 0))
        .with_cause(inactive);
    let (status, json) = get_json(test_router(registry), "/api/causes").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["total"], 1);
    assert_eq!(json["causes"][0]["id"], 1);
}

#[tokio::test]
async fn test_list_causes_featured_first_stable_order() {
    let mut a = cause(1, "A", 10, 0);
    a.featured = true;
    let b = cause(2, "B", 10, 0);
    let mut c = cause(3, "C", 10, 0);
    c.featured = true;
    let d = cause(4, "D", 10, 0);
    let registry = FakeRegistry::new()
        .with_cause(a)
        .with_cause(b)
        .with_cause(c)
        .with_cause(d);

    let (_, json) = get_json(test_router(registry), "/api/causes").await;
    let order: Vec<u64> = json["causes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["id"].as_u64().unwrap())
        .collect();
    assert_eq!(order, vec![1, 3, 2, 4]);
}

#[tokio::test]
async fn test_search_matches_description_case_insensitively() {
    let mut wells = cause(1, "Rural Wells", 10, 0);
    wells.description = "Clean Water for everyone".to_string();
    let registry = FakeRegistry::new()
        .with_cause(wells)
        .with_cause(cause(2, "School Books", 4, 0));

    let (status, json) = get_json(test_router(registry), "/api/causes?q=water").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["total"], 1);
    assert_eq!(json["causes"][0]["id"], 1);
}

#[tokio::test]
async fn test_category_filter_and_all_sentinel() {
    let mut health = cause(1, "Clinic", 10, 0);
    health.category = "Health".to_string();
    let mut water = cause(2, "Wells", 10, 0);
    water.category = "Water".to_string();
    let registry = FakeRegistry::new().with_cause(health).with_cause(water);
    let router = test_router(registry);

    let (_, json) = get_json(router.clone(), "/api/causes?category=Water").await;
    assert_eq!(json["total"], 1);
    assert_eq!(json["causes"][0]["id"], 2);

    let (_, json) = get_json(router, "/api/causes?category=All").await;
    assert_eq!(json["total"], 2);
}

#[tokio::test]
async fn test_featured_endpoint_requires_active_and_featured() {
    let mut featured = cause(1, "Featured", 10, 0);
    featured.featured = true;
    let plain = cause(2, "Plain", 10, 0);
    let mut inactive_featured = cause(3, "Hidden", 10, 0);
    inactive_featured.featured = true;
    inactive_featured.is_active = false;
    let registry = FakeRegistry::new()
        .with_cause(featured)
        .with_cause(plain)
        .with_cause(inactive_featured);

    let (status, json) = get_json(test_router(registry), "/api/causes/featured").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["total"], 1);
    assert_eq!(json["causes"][0]["id"], 1);
}

#[tokio::test]
async fn test_categories_deduplicated_with_all_first() {
    let mut health = cause(1, "Clinic", 10, 0);
    health.category = "Health".to_string();
    let mut water = cause(2, "Wells", 10, 0);
    water.category = "Water".to_string();
    let mut clinic2 = cause(3, "Clinic Two", 10, 0);
    clinic2.category = "Health".to_string();
    let registry = FakeRegistry::new()
        .with_cause(health)
        .with_cause(water)
        .with_cause(clinic2);

    let (status, json) = get_json(test_router(registry), "/api/causes/categories").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, serde_json::json!(["All", "Health", "Water"]));
}

#[tokio::test]
async fn test_overview_includes_inactive_and_sums_totals() {
    // raised = 1.5, 2.0 and 0 ETH -> total 3.5
    let mut a = cause(1, "A", 10, 1500);
    a.donors_count = 3;
    let mut b = cause(2, "B", 10, 2000);
    b.donors_count = 2;
    b.is_active = false;
    let c = cause(3, "C", 10, 0);
    let registry = FakeRegistry::new()
        .with_cause(a)
        .with_cause(b)
        .with_cause(c);

    let (status, json) = get_json(test_router(registry), "/api/dashboard/overview").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["total_causes"], 3);
    assert_eq!(json["total_donors"], 6);
    assert_eq!(json["total_raised_eth"], "3.5");
    assert_eq!(json["causes"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_cause_detail_and_overfunded_percentage() {
    // goal=10, raised=15 -> 150%, deliberately unclamped
    let registry = FakeRegistry::new().with_cause(cause(7, "Overfunded", 10, 15000));
    let (status, json) = get_json(test_router(registry), "/api/causes/7").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["id"], 7);
    assert_eq!(json["funded_percentage"], 150);
}

#[tokio::test]
async fn test_cause_detail_not_found() {
    let registry = FakeRegistry::new().with_cause(cause(1, "Only", 10, 0));
    let (status, json) = get_json(test_router(registry), "/api/causes/99").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "CAUSE_NOT_FOUND");
}

#[tokio::test]
async fn test_cause_detail_fetch_failure_is_bad_gateway() {
    // The detail route bypasses the snapshot, so a reader failure surfaces
    // as a retryable error rather than a 404
    let registry = FakeRegistry::new().with_failing_id(9);
    let (status, json) = get_json(test_router(registry), "/api/causes/9").await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(json["code"], "DETAIL_FETCH_FAILED");
}

#[tokio::test]
async fn test_zero_goal_reports_fully_funded() {
    let registry = FakeRegistry::new().with_cause(cause(1, "No Goal", 0, 500));
    let (_, json) = get_json(test_router(registry), "/api/causes/1").await;
    assert_eq!(json["funded_percentage"], 100);
}

#[tokio::test]
async fn test_empty_registry_is_ready_not_error() {
    let registry = FakeRegistry::new();
    let (status, json) = get_json(test_router(registry), "/api/causes").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ready");
    assert_eq!(json["total"], 0);
    assert_eq!(json["partial_failures"], 0);
}

#[tokio::test]
async fn test_discovery_failure_is_retryable_error() {
    let mut registry = FakeRegistry::new();
    registry.fail_discovery = true;
    let (status, json) = get_json(test_router(registry), "/api/causes").await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(json["code"], "DISCOVERY_FAILED");
}

#[tokio::test]
async fn test_partial_detail_failure_still_succeeds() {
    let registry = FakeRegistry::new()
        .with_cause(cause(1, "First", 10, 0))
        .with_failing_id(2)
        .with_cause(cause(3, "Third", 10, 0));
    let (status, json) = get_json(test_router(registry), "/api/causes").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ready");
    assert_eq!(json["partial_failures"], 1);
    let ids: Vec<u64> = json["causes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["id"].as_u64().unwrap())
        .collect();
    assert_eq!(ids, vec![1, 3]);
}
