#![cfg(feature = "http_api")]

use axum::{
    body::{self, Body},
    http::{Request, StatusCode, header},
};
use pert_estimator::{EstimationSession, ProjectSummary, http_api};
use serde_json::{Value, json};
use tower::util::ServiceExt;

fn new_router() -> axum::Router {
    let state = http_api::AppState::new(EstimationSession::new());
    http_api::router(state)
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn read_json(response: axum::response::Response) -> Value {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn task_lifecycle_via_http_api() {
    let app = new_router();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/tasks",
            json!({"name": "Design", "optimistic": "1", "most_likely": "2", "pessimistic": "3"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = read_json(response).await;
    assert_eq!(created["id"], 1);
    assert_eq!(created["estimate"]["status"], "defined");
    assert_eq!(created["estimate"]["expected"], 2.0);

    let response = app
        .clone()
        .oneshot(json_request("PUT", "/tasks/1", json!({"most_likely": "x"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let updated = read_json(response).await;
    assert_eq!(updated["name"], "Design");
    assert_eq!(updated["most_likely"], "x");
    assert_eq!(updated["estimate"]["status"], "undefined");

    let response = app
        .clone()
        .oneshot(empty_request("DELETE", "/tasks/1"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .clone()
        .oneshot(empty_request("GET", "/tasks/1"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let error = read_json(response).await;
    assert_eq!(error["error"], "not_found");
}

#[tokio::test]
async fn summary_reports_totals() {
    let app = new_router();
    for (o, m, p) in [("1", "2", "3"), ("2", "4", "6")] {
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/tasks",
                json!({"name": "t", "optimistic": o, "most_likely": m, "pessimistic": p}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = app
        .clone()
        .oneshot(empty_request("GET", "/summary"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let summary: ProjectSummary = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(summary.total_tasks, 2);
    assert!((summary.total_expected - 6.0).abs() < 1e-12);
    assert_eq!(summary.intervals.len(), 2);
}

#[tokio::test]
async fn import_filter_and_apply_candidates() {
    let app = new_router();
    let csv = "ID,Work Item Type,Title,Assigned To,State,Tags\n\
               1,Bug,Crash on save,Ann <a@x>,Active,core\n\
               2,Task,Write docs,,New,docs\n\
               3,Task,,Bob,New,\n";

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/import")
                .header("content-type", "text/csv")
                .body(Body::from(csv))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let report = read_json(response).await;
    assert_eq!(report["imported"], 2);
    assert_eq!(report["dropped"], 1);

    let response = app
        .clone()
        .oneshot(empty_request("GET", "/candidates?search=docs"))
        .await
        .unwrap();
    let listed = read_json(response).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);
    assert_eq!(listed[0]["index"], 1);
    assert_eq!(listed[0]["assigned_to"], "Unassigned");

    let response = app
        .clone()
        .oneshot(empty_request("GET", "/candidates/facets"))
        .await
        .unwrap();
    let facets = read_json(response).await;
    assert_eq!(facets["work_item_types"], json!(["Bug", "Task"]));
    assert_eq!(facets["states"], json!(["Active", "New"]));

    let response = app
        .clone()
        .oneshot(json_request("POST", "/candidates/apply", json!({"indices": [0, 1]})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = read_json(response).await;
    assert_eq!(created[0]["name"], "Crash on save");
    assert_eq!(created[0]["original_id"], "1");
    assert_eq!(created[1]["estimate"]["status"], "undefined");

    let response = app
        .clone()
        .oneshot(json_request("POST", "/candidates/apply", json!({"indices": [9]})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn export_requires_a_named_task() {
    let app = new_router();
    let response = app
        .clone()
        .oneshot(json_request("POST", "/tasks", json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .clone()
        .oneshot(empty_request("GET", "/export"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = app
        .clone()
        .oneshot(json_request("PUT", "/tasks/1", json!({"name": "Named"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(empty_request("GET", "/export"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let disposition = response
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.contains("pert_estimation_"));
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.starts_with("Task ID,Task Name,"));
    assert!(text.contains("1,Named,,,,-,-"));
}
