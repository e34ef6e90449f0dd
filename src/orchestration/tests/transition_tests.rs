//! Tests for the status transition engine.

use rstest::rstest;

use super::harness::{EpicSeed, TestBed, bed};
use crate::orchestration::{
    adapters::memory::RecordedChange,
    domain::TaskStatus,
    services::{TransitionError, TransitionRequest},
};

#[rstest]
#[case("pending")]
#[case("running")]
#[case("pr_open")]
#[case("merging")]
#[case("completed")]
#[case("failed")]
#[tokio::test(flavor = "multi_thread")]
async fn every_known_status_is_reachable_directly(#[case] target: &str, bed: TestBed) {
    let (_epic, tasks) = bed.seed_epic(EpicSeed::default()).await;
    let task_id = tasks.first().expect("one task").id();

    // From the freshly seeded pending status.
    let updated = bed
        .engine()
        .transition(task_id, TransitionRequest::to(target))
        .await
        .expect("transition succeeds");
    assert_eq!(updated.status().as_str(), target);
    assert_eq!(bed.reload_task(task_id).await.status().as_str(), target);

    // And again from a terminal status: the engine validates membership,
    // not edges.
    bed.force_status(task_id, TaskStatus::Completed).await;
    let from_terminal = bed
        .engine()
        .transition(task_id, TransitionRequest::to(target))
        .await
        .expect("transition from terminal status succeeds");
    assert_eq!(from_terminal.status().as_str(), target);
}

#[rstest]
#[case("done")]
#[case("cancelled")]
#[case("PENDINGX")]
#[case("")]
#[tokio::test(flavor = "multi_thread")]
async fn unknown_status_is_rejected_without_mutation(#[case] target: &str, bed: TestBed) {
    let (_epic, tasks) = bed.seed_epic(EpicSeed::default()).await;
    let task_id = tasks.first().expect("one task").id();

    let result = bed
        .engine()
        .transition(
            task_id,
            TransitionRequest::to(target).with_log_message("should not appear"),
        )
        .await;

    assert!(matches!(result, Err(TransitionError::UnknownStatus(_))));
    let reloaded = bed.reload_task(task_id).await;
    assert_eq!(reloaded.status(), TaskStatus::Pending);
    assert!(reloaded.debug_log().is_empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn sequential_log_messages_accumulate_in_call_order(bed: TestBed) {
    let (_epic, tasks) = bed.seed_epic(EpicSeed::default()).await;
    let task_id = tasks.first().expect("one task").id();
    let engine = bed.engine();

    for (status, message) in [
        ("running", "first entry"),
        ("pr_open", "second entry"),
        ("merging", "third entry"),
    ] {
        engine
            .transition(
                task_id,
                TransitionRequest::to(status).with_log_message(message),
            )
            .await
            .expect("transition succeeds");
    }

    let reloaded = bed.reload_task(task_id).await;
    let lines: Vec<&str> = reloaded.debug_log().lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines.first().expect("line").ends_with("first entry"));
    assert!(lines.get(1).expect("line").ends_with("second entry"));
    assert!(lines.get(2).expect("line").ends_with("third entry"));
    // Each line carries the `[YYYY-MM-DD HH:MM:SS] ` prefix.
    for line in lines {
        assert_eq!(line.chars().next(), Some('['));
        assert_eq!(line.chars().nth(20), Some(']'));
    }
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn blank_pr_url_never_clears_a_recorded_value(bed: TestBed) {
    let (_epic, tasks) = bed.seed_epic(EpicSeed::default()).await;
    let task_id = tasks.first().expect("one task").id();
    let engine = bed.engine();

    engine
        .transition(
            task_id,
            TransitionRequest::to("pr_open").with_pr_url("https://github.com/acme/widget/pull/7"),
        )
        .await
        .expect("transition succeeds");
    engine
        .transition(task_id, TransitionRequest::to("merging").with_pr_url("  "))
        .await
        .expect("transition succeeds");

    let reloaded = bed.reload_task(task_id).await;
    assert_eq!(
        reloaded.pr_url(),
        Some("https://github.com/acme/widget/pull/7")
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn transition_without_log_message_leaves_log_untouched(bed: TestBed) {
    let (_epic, tasks) = bed.seed_epic(EpicSeed::default()).await;
    let task_id = tasks.first().expect("one task").id();

    bed.engine()
        .transition(task_id, TransitionRequest::to("running"))
        .await
        .expect("transition succeeds");

    assert!(bed.reload_task(task_id).await.debug_log().is_empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn notifier_failure_does_not_fail_or_roll_back_the_transition(bed: TestBed) {
    let (_epic, tasks) = bed.seed_epic(EpicSeed::default()).await;
    let task_id = tasks.first().expect("one task").id();
    bed.notifier.set_failing(true);

    let updated = bed
        .engine()
        .transition(
            task_id,
            TransitionRequest::to("running").with_log_message("still applies"),
        )
        .await
        .expect("transition succeeds despite notifier failure");

    assert_eq!(updated.status(), TaskStatus::Running);
    let reloaded = bed.reload_task(task_id).await;
    assert_eq!(reloaded.status(), TaskStatus::Running);
    assert!(reloaded.debug_log().as_str().contains("still applies"));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn successful_transition_notifies_epic_observers(bed: TestBed) {
    let (_epic, tasks) = bed.seed_epic(EpicSeed::default()).await;
    let task_id = tasks.first().expect("one task").id();

    bed.engine()
        .transition(task_id, TransitionRequest::to("running"))
        .await
        .expect("transition succeeds");

    assert_eq!(
        bed.notifier.changes(),
        vec![RecordedChange::TaskUpdated {
            task_id,
            status: TaskStatus::Running,
        }]
    );
}
