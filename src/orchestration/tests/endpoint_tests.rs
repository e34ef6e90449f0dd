//! Tests for the inbound webhook endpoint contract.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use rstest::rstest;
use serde_json::{Value, json};

use super::harness::{EpicSeed, MemDispatcher, TestBed, bed};
use crate::orchestration::{adapters::http::cursor_webhook, domain::TaskStatus};

async fn post_webhook(
    dispatcher: Arc<MemDispatcher>,
    task_id: String,
    payload: Value,
) -> (StatusCode, Value) {
    let (status, Json(body)) =
        cursor_webhook(State(dispatcher), Path(task_id), Json(payload)).await;
    (status, body)
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn handled_callback_answers_ok_with_task_and_status(bed: TestBed) {
    let (_epic, tasks) = bed.seed_epic(EpicSeed::default()).await;
    let task_id = tasks.first().expect("one task").id();

    let (status, body) = post_webhook(
        Arc::new(bed.dispatcher()),
        task_id.to_string(),
        json!({"status": "RUNNING"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.get("success"), Some(&json!(true)));
    assert_eq!(body.get("task_id"), Some(&json!(task_id.to_string())));
    assert_eq!(body.get("status"), Some(&json!("RUNNING")));
    assert_eq!(bed.reload_task(task_id).await.status(), TaskStatus::Running);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unrecognized_status_is_still_a_success_response(bed: TestBed) {
    let (_epic, tasks) = bed.seed_epic(EpicSeed::default()).await;
    let task_id = tasks.first().expect("one task").id();

    let (status, body) = post_webhook(
        Arc::new(bed.dispatcher()),
        task_id.to_string(),
        json!({"status": "CREATED"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.get("status"), Some(&json!("CREATED")));
    assert_eq!(bed.reload_task(task_id).await.status(), TaskStatus::Pending);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unknown_task_answers_not_found(bed: TestBed) {
    let (status, body) = post_webhook(
        Arc::new(bed.dispatcher()),
        uuid::Uuid::new_v4().to_string(),
        json!({"status": "RUNNING"}),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body.get("error"), Some(&json!("Task not found")));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unparsable_task_id_answers_not_found(bed: TestBed) {
    let (status, body) = post_webhook(
        Arc::new(bed.dispatcher()),
        "not-a-uuid".to_owned(),
        json!({"status": "RUNNING"}),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body.get("error"), Some(&json!("Task not found")));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn payload_without_status_answers_bad_request(bed: TestBed) {
    let (_epic, tasks) = bed.seed_epic(EpicSeed::default()).await;
    let task_id = tasks.first().expect("one task").id();

    let (status, body) = post_webhook(
        Arc::new(bed.dispatcher()),
        task_id.to_string(),
        json!({"pr_url": "https://x/1"}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body.get("error"), Some(&json!("Invalid payload")));
}
