//! Inbound webhook endpoint for agent status callbacks.
//!
//! Mounts `POST /webhooks/cursor/{task_id}` and converts dispatcher outcomes
//! into the HTTP contract: `200` for any handled callback (including
//! unrecognized status tokens), `404` when the task does not resolve, `400`
//! for payloads without a status token or failed handler transitions, and
//! `500` for anything unexpected. A raw error never propagates to the
//! caller.

use crate::orchestration::{
    domain::TaskId,
    ports::{ChangeNotifier, EpicRepository, JobQueue},
    services::{WebhookDispatchError, WebhookDispatcher},
};
use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::post,
};
use mockable::Clock;
use serde_json::{Value, json};
use std::sync::Arc;
use uuid::Uuid;

/// Builds a router exposing the Cursor webhook endpoint.
pub fn webhook_router<R, N, Q, K>(dispatcher: Arc<WebhookDispatcher<R, N, Q, K>>) -> Router
where
    R: EpicRepository + 'static,
    N: ChangeNotifier + 'static,
    Q: JobQueue + 'static,
    K: Clock + Send + Sync + 'static,
{
    Router::new()
        .route("/webhooks/cursor/{task_id}", post(cursor_webhook::<R, N, Q, K>))
        .with_state(dispatcher)
}

/// Handles one status callback from the agent platform.
pub async fn cursor_webhook<R, N, Q, K>(
    State(dispatcher): State<Arc<WebhookDispatcher<R, N, Q, K>>>,
    Path(task_id): Path<String>,
    Json(payload): Json<Value>,
) -> (StatusCode, Json<Value>)
where
    R: EpicRepository + 'static,
    N: ChangeNotifier + 'static,
    Q: JobQueue + 'static,
    K: Clock + Send + Sync + 'static,
{
    // An unparsable id cannot resolve to a task, so it gets the same
    // response as an unknown one.
    let Ok(parsed) = task_id.parse::<Uuid>() else {
        tracing::error!(task_id = %task_id, "webhook for unresolvable task id");
        return task_not_found();
    };
    let task_id = TaskId::from_uuid(parsed);

    tracing::info!(task_id = %task_id, payload = %payload, "Cursor callback received");

    match dispatcher.handle(task_id, &payload).await {
        Ok(outcome) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "task_id": task_id.to_string(),
                "status": outcome.status,
            })),
        ),
        Err(WebhookDispatchError::TaskNotFound(_)) => task_not_found(),
        Err(WebhookDispatchError::MissingStatus) => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Invalid payload" })),
        ),
        Err(err @ WebhookDispatchError::Transition(_)) => {
            tracing::error!(task_id = %task_id, error = %err, "webhook handler failed");
            (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": err.to_string() })),
            )
        }
        Err(err) => {
            tracing::error!(task_id = %task_id, error = %err, "unexpected webhook failure");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Internal server error" })),
            )
        }
    }
}

/// Response for a webhook addressed to a task that does not resolve.
fn task_not_found() -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "Task not found" })),
    )
}
