//! Tests for the agent dispatch pipeline.

use std::sync::{Arc, Mutex};

use rstest::rstest;

use super::harness::{EpicSeed, TestBed, bed};
use crate::orchestration::{
    domain::TaskStatus,
    ports::{AgentLaunchError, AgentLaunchRequest, LaunchReceipt, agent::MockAgentLauncher},
    services::DispatchError,
};

/// Mock launcher that records every request and answers with the given
/// receipt.
fn recording_launcher(
    receipt: LaunchReceipt,
) -> (MockAgentLauncher, Arc<Mutex<Vec<AgentLaunchRequest>>>) {
    let requests = Arc::new(Mutex::new(Vec::new()));
    let captured = Arc::clone(&requests);
    let mut launcher = MockAgentLauncher::new();
    launcher.expect_launch().returning(move |_, request| {
        captured
            .lock()
            .expect("capture lock")
            .push(request.clone());
        Ok(receipt.clone())
    });
    (launcher, requests)
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn successful_dispatch_records_agent_and_branch(bed: TestBed) {
    let (_epic, tasks) = bed.seed_epic(EpicSeed::default()).await;
    let task_id = tasks.first().expect("one task").id();
    let (launcher, requests) = recording_launcher(LaunchReceipt {
        agent_id: Some("agent-123".to_owned()),
    });

    let receipt = bed
        .dispatch_pipeline(launcher)
        .dispatch(task_id)
        .await
        .expect("dispatch succeeds");

    assert_eq!(receipt.agent_id, "agent-123");
    let reloaded = bed.reload_task(task_id).await;
    assert_eq!(reloaded.status(), TaskStatus::Running);
    assert_eq!(reloaded.agent_id(), Some("agent-123"));
    assert_eq!(reloaded.branch_name(), Some(&receipt.branch_name));

    let prefix = format!("cursor-agent/task-{task_id}-");
    let branch = receipt.branch_name.as_str();
    assert!(branch.starts_with(&prefix));
    let suffix = branch.trim_start_matches(&prefix);
    assert_eq!(suffix.len(), 8);
    assert!(
        suffix
            .chars()
            .all(|ch| ch.is_ascii_hexdigit() && !ch.is_ascii_uppercase())
    );

    let log = reloaded.debug_log().as_str().to_owned();
    assert!(log.contains("Starting task execution..."));
    assert!(log.contains(&format!("Launching Cursor agent for branch: {branch}")));
    assert!(log.contains("Cursor agent launched successfully. Agent ID: agent-123"));

    let captured = requests.lock().expect("capture lock");
    let request = captured.first().expect("one launch call");
    assert_eq!(
        request.callback_url,
        format!("http://localhost:3000/webhooks/cursor/{task_id}")
    );
    assert_eq!(request.repository_url, "https://github.com/acme/widget");
    assert_eq!(request.base_branch, "main");
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn repeated_dispatches_generate_distinct_branches(bed: TestBed) {
    let (_epic, tasks) = bed.seed_epic(EpicSeed::default()).await;
    let task_id = tasks.first().expect("one task").id();
    let (launcher, _requests) = recording_launcher(LaunchReceipt {
        agent_id: Some("agent-123".to_owned()),
    });
    let pipeline = bed.dispatch_pipeline(launcher);

    let first = pipeline.dispatch(task_id).await.expect("first dispatch");
    let second = pipeline.dispatch(task_id).await.expect("second dispatch");

    assert_ne!(first.branch_name, second.branch_name);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn missing_agent_credential_fails_before_any_side_effect(bed: TestBed) {
    let (_epic, tasks) = bed
        .seed_epic(EpicSeed {
            agent_credential: false,
            ..EpicSeed::default()
        })
        .await;
    let task_id = tasks.first().expect("one task").id();
    let mut launcher = MockAgentLauncher::new();
    launcher.expect_launch().never();

    let result = bed.dispatch_pipeline(launcher).dispatch(task_id).await;

    assert!(matches!(
        result,
        Err(DispatchError::MissingAgentCredential(_))
    ));
    let reloaded = bed.reload_task(task_id).await;
    assert_eq!(reloaded.status(), TaskStatus::Pending);
    assert!(reloaded.debug_log().is_empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn launch_failure_marks_the_task_failed_and_re_raises(bed: TestBed) {
    let (_epic, tasks) = bed.seed_epic(EpicSeed::default()).await;
    let task_id = tasks.first().expect("one task").id();
    let mut launcher = MockAgentLauncher::new();
    launcher.expect_launch().returning(|_, _| {
        Err(AgentLaunchError::Api {
            status: 401,
            message: "bad key".to_owned(),
        })
    });

    let result = bed.dispatch_pipeline(launcher).dispatch(task_id).await;

    assert!(matches!(result, Err(DispatchError::Launch(_))));
    let reloaded = bed.reload_task(task_id).await;
    assert_eq!(reloaded.status(), TaskStatus::Failed);
    assert!(
        reloaded
            .debug_log()
            .as_str()
            .contains("Failed to launch Cursor agent:")
    );
}

#[rstest]
#[case(None)]
#[case(Some("   ".to_owned()))]
#[tokio::test(flavor = "multi_thread")]
async fn blank_agent_id_is_a_launch_failure(#[case] agent_id: Option<String>, bed: TestBed) {
    let (_epic, tasks) = bed.seed_epic(EpicSeed::default()).await;
    let task_id = tasks.first().expect("one task").id();
    let (launcher, _requests) = recording_launcher(LaunchReceipt { agent_id });

    let result = bed.dispatch_pipeline(launcher).dispatch(task_id).await;

    assert!(matches!(result, Err(DispatchError::MissingAgentId)));
    let reloaded = bed.reload_task(task_id).await;
    assert_eq!(reloaded.status(), TaskStatus::Failed);
    assert_eq!(reloaded.agent_id(), None);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unknown_task_fails_without_launching(bed: TestBed) {
    let mut launcher = MockAgentLauncher::new();
    launcher.expect_launch().never();

    let result = bed
        .dispatch_pipeline(launcher)
        .dispatch(crate::orchestration::domain::TaskId::new())
        .await;

    assert!(matches!(result, Err(DispatchError::TaskNotFound(_))));
}
