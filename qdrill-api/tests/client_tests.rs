//! Submission client against a live server on an ephemeral port

use qdrill_api::client::{ApiClient, ClientError};
use qdrill_api::{build_router, AppState};
use qdrill_common::db::init_database;
use qdrill_common::ValidationRules;
use serde_json::json;
use tempfile::TempDir;

/// Start the service on 127.0.0.1:0 and return its base URL
async fn spawn_server(rules: ValidationRules) -> (String, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let pool = init_database(&temp_dir.path().join("qdrill.db")).await.unwrap();
    let app = build_router(AppState::new(pool, rules));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), temp_dir)
}

#[tokio::test]
async fn test_submit_drill() {
    let (base_url, _temp_dir) = spawn_server(ValidationRules::default()).await;
    let client = ApiClient::new(base_url);

    let drill = client
        .create_drill(&json!({
            "name": "Five star",
            "brief_description": "warmup",
            "skill_level": "Beginner",
            "suggested_length": "10 minutes",
            "skills_focused_on": "passing",
            "positions_focused_on": ["Chaser", "Keeper"],
        }))
        .await
        .unwrap();

    assert!(drill.id >= 1);
    assert_eq!(drill.details.skills_focused_on, vec!["passing"]);
    assert_eq!(drill.details.positions_focused_on, vec!["Chaser", "Keeper"]);
}

#[tokio::test]
async fn test_submit_and_fetch_plan() {
    let (base_url, _temp_dir) = spawn_server(ValidationRules::default()).await;
    let client = ApiClient::new(base_url);

    let created = client
        .create_practice_plan(&json!({
            "name": "Thursday",
            "start_time": "19:30",
            "practice_goals": ["Beat pressure"],
            "sections": [
                {"name": "Warmup", "items": [{"type": "activity", "name": "Jog", "duration": 10}]},
                {"name": "Scrimmage", "items": [{"type": "activity", "name": "Game", "duration": 20}]}
            ]
        }))
        .await
        .unwrap();

    assert_eq!(created.total_duration, 30);
    assert_eq!(created.schedule.len(), 2);

    let fetched = client.get_practice_plan(created.plan.id).await.unwrap();
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn test_server_side_validation_surfaces_field_errors() {
    // Server enforces the vocabulary, client does not
    let (base_url, _temp_dir) = spawn_server(ValidationRules {
        enforce_skill_levels: true,
    })
    .await;
    let client = ApiClient::new(base_url);

    let err = client
        .create_drill(&json!({
            "name": "Odd",
            "brief_description": "unknown level",
            "skill_level": "Wizard",
            "suggested_length": "5 minutes",
            "skills_focused_on": "passing",
            "positions_focused_on": "Chaser",
        }))
        .await
        .unwrap_err();

    match err {
        ClientError::Validation(errors) => assert!(errors.contains("skill_level")),
        other => panic!("expected validation error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_missing_plan_is_not_found() {
    let (base_url, _temp_dir) = spawn_server(ValidationRules::default()).await;
    let client = ApiClient::new(base_url);

    let err = client.get_practice_plan(404).await.unwrap_err();
    assert!(matches!(err, ClientError::NotFound(_)));
}
