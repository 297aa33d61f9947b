//! HTTP surface tests against the router with an in-memory database

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use qdrill_api::{build_router, AppState};
use qdrill_common::db::init_in_memory;
use qdrill_common::ValidationRules;
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tower::ServiceExt;

async fn test_app(rules: ValidationRules) -> Router {
    test_app_with_pool(rules).await.0
}

async fn test_app_with_pool(rules: ValidationRules) -> (Router, SqlitePool) {
    let pool = init_in_memory().await.unwrap();
    (build_router(AppState::new(pool.clone(), rules)), pool)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn five_star() -> Value {
    json!({
        "name": "Five star",
        "brief_description": "warmup",
        "skill_level": ["Beginner"],
        "suggested_length": {"min": 5, "max": 10},
        "skills_focused_on": ["passing"],
        "positions_focused_on": ["Chaser"],
    })
}

fn parallel_item(name: &str, drill_id: i64, duration: u32, timeline: &str, timelines: Value) -> Value {
    json!({
        "type": "drill",
        "name": name,
        "drill_id": drill_id,
        "duration": duration,
        "parallel_group_id": "g1",
        "parallel_timeline": timeline,
        "group_timelines": timelines,
    })
}

/// Store drills 1 and 2 for plans to reference
async fn seed_drills(app: &Router) {
    let mut second = five_star();
    second["name"] = json!("Beater pairs");
    for drill in [five_star(), second] {
        let (status, _) = send(app, post_json("/api/drills", &drill)).await;
        assert_eq!(status, StatusCode::CREATED);
    }
}

fn tuesday_plan() -> Value {
    json!({
        "name": "Tuesday practice",
        "start_time": "18:00",
        "sections": [{
            "name": "Drills",
            "order": 0,
            "items": [
                parallel_item("Beater drill", 1, 15, "BEATERS", json!(["CHASERS", "BEATERS"])),
                parallel_item("Chaser drill", 2, 8, "CHASERS", json!(["CHASERS", "BEATERS"])),
                {"type": "break", "duration": 10}
            ]
        }]
    })
}

#[tokio::test]
async fn test_health() {
    let app = test_app(ValidationRules::default()).await;

    let (status, body) = send(&app, get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "qdrill-api");
}

#[tokio::test]
async fn test_create_drill_echoes_fields_with_id() {
    let app = test_app(ValidationRules::default()).await;

    let (status, body) = send(&app, post_json("/api/drills", &five_star())).await;

    assert_eq!(status, StatusCode::CREATED);
    assert!(body["id"].as_i64().is_some());
    assert_eq!(body["name"], "Five star");
    assert_eq!(body["brief_description"], "warmup");
    assert_eq!(body["skill_level"], json!(["Beginner"]));
    assert_eq!(body["suggested_length"], json!({"min": 5, "max": 10}));
    assert_eq!(body["skills_focused_on"], json!(["passing"]));
    assert_eq!(body["positions_focused_on"], json!(["Chaser"]));
}

#[tokio::test]
async fn test_scalar_list_field_is_stored_as_list() {
    let app = test_app(ValidationRules::default()).await;
    let mut payload = five_star();
    payload["skills_focused_on"] = json!("passing");

    let (_, created) = send(&app, post_json("/api/drills", &payload)).await;
    let id = created["id"].as_i64().unwrap();
    let (status, body) = send(&app, get(&format!("/api/drills/{}", id))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["skills_focused_on"], json!(["passing"]));
    assert_eq!(body, created);
}

#[tokio::test]
async fn test_list_drills_in_creation_order() {
    let app = test_app(ValidationRules::default()).await;
    let mut second = five_star();
    second["name"] = json!("Keep away");

    send(&app, post_json("/api/drills", &five_star())).await;
    send(&app, post_json("/api/drills", &second)).await;
    let (status, body) = send(&app, get("/api/drills")).await;

    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|drill| drill["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Five star", "Keep away"]);
}

#[tokio::test]
async fn test_missing_drill_is_404() {
    let app = test_app(ValidationRules::default()).await;

    let (status, body) = send(&app, get("/api/drills/99999")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_missing_name_is_400_naming_the_field() {
    let app = test_app(ValidationRules::default()).await;
    let mut payload = five_star();
    payload.as_object_mut().unwrap().remove("name");

    let (status, body) = send(&app, post_json("/api/drills", &payload)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(
        body["error"]["details"]["name"],
        json!(["Missing data for required field."])
    );

    // Nothing was stored
    let (_, listed) = send(&app, get("/api/drills")).await;
    assert_eq!(listed, json!([]));
}

#[tokio::test]
async fn test_malformed_json_is_400() {
    let app = test_app(ValidationRules::default()).await;
    let request = Request::builder()
        .method("POST")
        .uri("/api/drills")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"name\": "))
        .unwrap();

    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_skill_vocabulary_enforced_when_configured() {
    let app = test_app(ValidationRules {
        enforce_skill_levels: true,
    })
    .await;
    let mut payload = five_star();
    payload["skill_level"] = json!(["Wizard"]);

    let (status, body) = send(&app, post_json("/api/drills", &payload)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]["details"]["skill_level"].is_array());
}

#[tokio::test]
async fn test_plan_total_counts_parallel_group_once() {
    let app = test_app(ValidationRules::default()).await;
    seed_drills(&app).await;

    let (status, body) = send(&app, post_json("/api/practice-plans", &tuesday_plan())).await;

    assert_eq!(status, StatusCode::CREATED);
    assert!(body["id"].as_i64().is_some());
    assert_eq!(body["total_duration"], 25);
    assert_eq!(body["schedule"][0]["duration"], 25);
    assert_eq!(body["schedule"][0]["start_time"], "18:00:00");
    assert_eq!(body["schedule"][0]["end_time"], "18:25:00");
    assert_eq!(body["sections"][0]["items"][2]["name"], "Break");
}

#[tokio::test]
async fn test_get_plan_round_trips() {
    let app = test_app(ValidationRules::default()).await;
    seed_drills(&app).await;

    let (_, created) = send(&app, post_json("/api/practice-plans", &tuesday_plan())).await;
    let id = created["id"].as_i64().unwrap();
    let (status, body) = send(&app, get(&format!("/api/practice-plans/{}", id))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, created);

    let (status, listed) = send(&app, get("/api/practice-plans")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed, json!([created]));
}

#[tokio::test]
async fn test_inconsistent_group_timelines_rejected() {
    let app = test_app(ValidationRules::default()).await;
    let plan = json!({
        "name": "Broken",
        "sections": [{
            "name": "Drills",
            "items": [
                parallel_item("A", 1, 15, "CHASERS", json!(["CHASERS", "BEATERS"])),
                parallel_item("B", 2, 30, "CHASERS", json!(["CHASERS", "SEEKERS"]))
            ]
        }]
    });

    let (status, body) = send(&app, post_json("/api/practice-plans", &plan)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]["details"]["sections[0].parallel_groups.g1"].is_array());
}

#[tokio::test]
async fn test_missing_plan_is_404() {
    let app = test_app(ValidationRules::default()).await;

    let (status, _) = send(&app, get("/api/practice-plans/12345")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_non_numeric_id_is_json_400() {
    let app = test_app(ValidationRules::default()).await;

    for uri in ["/api/drills/abc", "/api/practice-plans/abc"] {
        let (status, body) = send(&app, get(uri)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
        assert_eq!(body["error"]["code"], "BAD_REQUEST", "{}", uri);
    }
}

#[tokio::test]
async fn test_plan_naming_unknown_drill_is_400() {
    let app = test_app(ValidationRules::default()).await;
    let plan = json!({
        "name": "Ghost practice",
        "sections": [{
            "name": "Drills",
            "items": [{"type": "drill", "name": "Ghost", "drill_id": 99999, "duration": 10}]
        }]
    });

    let (status, body) = send(&app, post_json("/api/practice-plans", &plan)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert!(body["error"]["details"]["sections[0].items[0].drill_id"].is_array());

    let (_, listed) = send(&app, get("/api/practice-plans")).await;
    assert_eq!(listed, json!([]));
}

#[tokio::test]
async fn test_duplicate_plan_copies_groups_and_timing() {
    let app = test_app(ValidationRules::default()).await;
    seed_drills(&app).await;
    let (_, created) = send(&app, post_json("/api/practice-plans", &tuesday_plan())).await;
    let id = created["id"].as_i64().unwrap();

    let uri = format!("/api/practice-plans/{}/duplicate", id);
    let (status, copy) = send(&app, post_json(&uri, &json!({}))).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_ne!(copy["id"], created["id"]);
    assert_eq!(copy["name"], "Tuesday practice (Copy)");
    assert_eq!(copy["total_duration"], 25);
    assert_eq!(copy["schedule"], created["schedule"]);
    assert_eq!(copy["sections"], created["sections"]);
    assert_eq!(copy["sections"][0]["items"][0]["parallel_group_id"], "g1");

    let (_, listed) = send(&app, get("/api/practice-plans")).await;
    assert_eq!(listed.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_duplicate_missing_plan_is_404() {
    let app = test_app(ValidationRules::default()).await;

    let (status, body) = send(&app, post_json("/api/practice-plans/12345/duplicate", &json!({}))).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_storage_failure_is_500_and_stores_nothing() {
    let (app, pool) = test_app_with_pool(ValidationRules::default()).await;
    sqlx::query("DROP TABLE practice_plan_item_timelines")
        .execute(&pool)
        .await
        .unwrap();
    let plan = json!({
        "name": "Split practice",
        "sections": [{
            "name": "Positions",
            "items": [
                {"type": "activity", "name": "Beaters", "duration": 10,
                 "parallel_group_id": "g1", "parallel_timeline": "BEATERS",
                 "group_timelines": ["BEATERS", "CHASERS"]},
                {"type": "activity", "name": "Chasers", "duration": 10,
                 "parallel_group_id": "g1", "parallel_timeline": "CHASERS",
                 "group_timelines": ["BEATERS", "CHASERS"]}
            ]
        }]
    });

    let (status, body) = send(&app, post_json("/api/practice-plans", &plan)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"]["code"], "DATABASE_ERROR");
    let plans: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM practice_plans")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(plans, 0);
}
