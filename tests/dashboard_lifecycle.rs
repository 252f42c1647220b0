//! Dashboard lifecycle against a mock Datadog API.

use hemmer_provider_datadog::testing::{
    assert_error_contains, assert_plan_changes_attribute, assert_plan_creates, ProviderTester,
    TestError,
};
use hemmer_provider_datadog::{DatadogProvider, ProviderError, RetryPolicy, DASHBOARD_RESOURCE};
use serde_json::{json, Value};
use std::time::Duration;
use wiremock::matchers::{body_json, body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const DASHBOARD_ID: &str = "abc-def-ghi";
const DASHBOARD_PATH: &str = "/api/v1/dashboard/abc-def-ghi";

fn retry(timeout: Duration) -> RetryPolicy {
    RetryPolicy {
        timeout,
        initial_backoff: Duration::from_millis(10),
        max_backoff: Duration::from_millis(50),
    }
}

fn dashboard_response(title: &str) -> Value {
    json!({
        "id": DASHBOARD_ID,
        "title": title,
        "description": null,
        "layout_type": "ordered",
        "is_read_only": false,
        "notify_list": [],
        "template_variables": [],
        "url": "/dashboard/abc-def-ghi/ops",
        "widgets": [{"id": 4711, "definition": {"type": "note", "content": "hello"}}]
    })
}

fn config(title: &str, lists: &[i64]) -> Value {
    json!({
        "title": title,
        "layout_type": "ordered",
        "dashboard_lists": lists,
        "widget": [{"note_definition": [{"content": "hello"}]}]
    })
}

fn list_items() -> Value {
    json!({"dashboards": [{"id": DASHBOARD_ID, "type": "custom_timeboard"}]})
}

async fn configured(server: &MockServer, timeout: Duration) -> ProviderTester<DatadogProvider> {
    Mock::given(method("GET"))
        .and(path("/api/v1/validate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"valid": true})))
        .mount(server)
        .await;

    let tester = ProviderTester::new(DatadogProvider::new().with_retry(retry(timeout)));
    tester
        .configure(json!({
            "api_key": "api-key",
            "app_key": "app-key",
            "api_url": server.uri()
        }))
        .await
        .unwrap();
    tester
}

#[tokio::test]
async fn test_create_waits_for_dashboard_and_syncs_lists() {
    let server = MockServer::start().await;
    let tester = configured(&server, Duration::from_secs(5)).await;

    Mock::given(method("POST"))
        .and(path("/api/v1/dashboard"))
        .and(body_partial_json(json!({
            "title": "Ops",
            "layout_type": "ordered",
            "is_read_only": false,
            "widgets": [{"definition": {"type": "note", "content": "hello"}}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(dashboard_response("Ops")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(DASHBOARD_PATH))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"errors": ["Not found"]})))
        .up_to_n_times(2)
        .with_priority(1)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(DASHBOARD_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(dashboard_response("Ops")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v2/dashboard/lists/manual/1/dashboards"))
        .and(body_json(list_items()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;
    // A failing list does not fail the create.
    Mock::given(method("POST"))
        .and(path("/api/v2/dashboard/lists/manual/2/dashboards"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let plan = tester
        .plan_create(DASHBOARD_RESOURCE, config("Ops", &[1, 2]))
        .await
        .unwrap();
    assert_plan_creates(&plan);

    let state = tester
        .create(DASHBOARD_RESOURCE, plan.planned_state)
        .await
        .unwrap();

    assert_eq!(state["id"], json!(DASHBOARD_ID));
    assert_eq!(state["url"], json!("/dashboard/abc-def-ghi/ops"));
    assert_eq!(state["is_read_only"], json!(false));
    assert_eq!(state["dashboard_lists"], json!([1, 2]));
    assert_eq!(state["dashboard_lists_removed"], json!([]));
    assert_eq!(
        state["widget"][0]["note_definition"][0]["content"],
        json!("hello")
    );
}

#[tokio::test]
async fn test_create_times_out_while_dashboard_is_missing() {
    let server = MockServer::start().await;
    let tester = configured(&server, Duration::from_millis(100)).await;

    Mock::given(method("POST"))
        .and(path("/api/v1/dashboard"))
        .respond_with(ResponseTemplate::new(200).set_body_json(dashboard_response("Ops")))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(DASHBOARD_PATH))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let plan = tester
        .plan_create(DASHBOARD_RESOURCE, config("Ops", &[]))
        .await
        .unwrap();
    let err = tester
        .create(DASHBOARD_RESOURCE, plan.planned_state)
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::DeadlineExceeded(_)), "{:?}", err);
}

#[tokio::test]
async fn test_create_api_error_is_wrapped() {
    let server = MockServer::start().await;
    let tester = configured(&server, Duration::from_secs(5)).await;

    Mock::given(method("POST"))
        .and(path("/api/v1/dashboard"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(json!({"errors": ["Invalid widget definition"]})),
        )
        .mount(&server)
        .await;

    let plan = tester
        .plan_create(DASHBOARD_RESOURCE, config("Ops", &[]))
        .await
        .unwrap();
    let err = tester
        .create(DASHBOARD_RESOURCE, plan.planned_state)
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::InvalidRequest(_)));
    assert_eq!(
        err.message(),
        "error creating dashboard: HTTP 400: Invalid widget definition"
    );
}

#[tokio::test]
async fn test_read_missing_dashboard_returns_null() {
    let server = MockServer::start().await;
    let tester = configured(&server, Duration::from_secs(5)).await;

    Mock::given(method("GET"))
        .and(path(DASHBOARD_PATH))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let state = tester
        .read(DASHBOARD_RESOURCE, json!({"id": DASHBOARD_ID}))
        .await
        .unwrap();
    assert!(state.is_null());
}

#[tokio::test]
async fn test_read_keeps_dashboard_lists() {
    let server = MockServer::start().await;
    let tester = configured(&server, Duration::from_secs(5)).await;

    Mock::given(method("GET"))
        .and(path(DASHBOARD_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(dashboard_response("Renamed")))
        .mount(&server)
        .await;

    let state = tester
        .read(
            DASHBOARD_RESOURCE,
            json!({
                "id": DASHBOARD_ID,
                "title": "Ops",
                "dashboard_lists": [7],
                "dashboard_lists_removed": [3]
            }),
        )
        .await
        .unwrap();
    assert_eq!(state["title"], json!("Renamed"));
    assert_eq!(state["dashboard_lists"], json!([7]));
    assert_eq!(state["dashboard_lists_removed"], json!([3]));
}

#[tokio::test]
async fn test_read_server_error_is_wrapped() {
    let server = MockServer::start().await;
    let tester = configured(&server, Duration::from_secs(5)).await;

    Mock::given(method("GET"))
        .and(path(DASHBOARD_PATH))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream unavailable"))
        .mount(&server)
        .await;

    let err = tester
        .read(DASHBOARD_RESOURCE, json!({"id": DASHBOARD_ID}))
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::Unavailable(_)));
    assert_eq!(
        err.message(),
        "error getting dashboard: HTTP 503: upstream unavailable"
    );
}

#[tokio::test]
async fn test_update_replaces_dashboard_and_moves_lists() {
    let server = MockServer::start().await;
    let tester = configured(&server, Duration::from_secs(5)).await;

    Mock::given(method("PUT"))
        .and(path(DASHBOARD_PATH))
        .and(body_partial_json(json!({"title": "Ops v2"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(dashboard_response("Ops v2")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v2/dashboard/lists/manual/2/dashboards"))
        .and(body_json(list_items()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/v2/dashboard/lists/manual/1/dashboards"))
        .and(body_json(list_items()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(DASHBOARD_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(dashboard_response("Ops v2")))
        .mount(&server)
        .await;

    let mut prior = config("Ops", &[1, 2]);
    prior["id"] = json!(DASHBOARD_ID);
    prior["is_read_only"] = json!(false);
    prior["dashboard_lists_removed"] = json!([]);

    let plan = tester
        .plan_update(DASHBOARD_RESOURCE, prior.clone(), config("Ops v2", &[2]))
        .await
        .unwrap();
    assert_plan_changes_attribute(&plan, "title");
    assert_plan_changes_attribute(&plan, "dashboard_lists_removed");
    assert_eq!(plan.planned_state["id"], json!(DASHBOARD_ID));

    let state = tester
        .update(DASHBOARD_RESOURCE, prior, plan.planned_state)
        .await
        .unwrap();
    assert_eq!(state["title"], json!("Ops v2"));
    assert_eq!(state["dashboard_lists"], json!([2]));
    assert_eq!(state["dashboard_lists_removed"], json!([1]));
}

#[tokio::test]
async fn test_delete_dashboard() {
    let server = MockServer::start().await;
    let tester = configured(&server, Duration::from_secs(5)).await;

    Mock::given(method("DELETE"))
        .and(path(DASHBOARD_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"deleted_dashboard_id": DASHBOARD_ID})))
        .expect(1)
        .mount(&server)
        .await;

    tester
        .lifecycle_delete(DASHBOARD_RESOURCE, json!({"id": DASHBOARD_ID, "title": "Ops"}))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_delete_failure_is_wrapped() {
    let server = MockServer::start().await;
    let tester = configured(&server, Duration::from_secs(5)).await;

    Mock::given(method("DELETE"))
        .and(path(DASHBOARD_PATH))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({"errors": ["Forbidden"]})))
        .mount(&server)
        .await;

    let err = tester
        .delete(DASHBOARD_RESOURCE, json!({"id": DASHBOARD_ID}))
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::PermissionDenied(_)));
    assert_eq!(err.message(), "error deleting dashboard: HTTP 403: Forbidden");
}

#[tokio::test]
async fn test_import_dashboard() {
    let server = MockServer::start().await;
    let tester = configured(&server, Duration::from_secs(5)).await;

    Mock::given(method("GET"))
        .and(path(DASHBOARD_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(dashboard_response("Ops")))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/dashboard/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let imported = tester
        .import_resource(DASHBOARD_RESOURCE, DASHBOARD_ID)
        .await
        .unwrap();
    assert_eq!(imported.len(), 1);
    assert_eq!(imported[0].resource_type, DASHBOARD_RESOURCE);
    assert_eq!(imported[0].state["id"], json!(DASHBOARD_ID));
    assert_eq!(imported[0].state["title"], json!("Ops"));
    assert!(imported[0].state.get("dashboard_lists").is_none());

    let err = tester
        .import_resource(DASHBOARD_RESOURCE, "missing")
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_configure_rejects_invalid_credentials() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/validate"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({"errors": ["Forbidden"]})))
        .mount(&server)
        .await;

    let tester = ProviderTester::new(DatadogProvider::new());
    let err = tester
        .configure(json!({"api_key": "bad", "app_key": "bad", "api_url": server.uri()}))
        .await
        .unwrap_err();
    match err {
        TestError::Diagnostics(diagnostics) => {
            assert_error_contains(&diagnostics, "Invalid Datadog credentials")
        }
        other => panic!("expected diagnostics, got {}", other),
    }
    assert!(!tester.provider().is_configured().await);
}
