//! Tests for the merge completion pipeline.

use rstest::rstest;

use super::harness::{EpicSeed, TestBed, bed};
use crate::orchestration::{
    domain::{Task, TaskStatus},
    ports::{MergeSha, SourceControlError, source_control::MockSourceControlService},
    services::MergeError,
};

/// Seeds a task ready to merge: branch recorded and status `pr_open`.
async fn seed_mergeable_task(bed: &TestBed, seed: EpicSeed) -> Task {
    let (_epic, tasks) = bed.seed_epic(seed).await;
    let task_id = tasks.first().expect("one task").id();
    bed.force_branch(task_id, "cursor-agent/task-x-deadbeef").await;
    bed.force_status(task_id, TaskStatus::PrOpen).await
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn successful_merge_deletes_branch_and_records_the_sha(bed: TestBed) {
    let task = seed_mergeable_task(&bed, EpicSeed::default()).await;
    let mut source_control = MockSourceControlService::new();
    source_control
        .expect_merge_pull_request()
        .times(1)
        .returning(|_| Ok(MergeSha::new("abc123".to_owned())));
    source_control
        .expect_delete_branch()
        .times(1)
        .returning(|_| Ok(true));

    let receipt = bed
        .merge_pipeline(source_control)
        .complete(task.id())
        .await
        .expect("merge succeeds");

    assert_eq!(receipt.merge_sha.as_str(), "abc123");
    let reloaded = bed.reload_task(task.id()).await;
    assert_eq!(reloaded.status(), TaskStatus::Merging);
    assert!(
        reloaded
            .debug_log()
            .as_str()
            .contains("PR merged successfully. SHA: abc123")
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn merge_failure_leaves_the_task_in_pr_open_for_retry(bed: TestBed) {
    let task = seed_mergeable_task(&bed, EpicSeed::default()).await;
    let mut source_control = MockSourceControlService::new();
    source_control
        .expect_merge_pull_request()
        .returning(|context| {
            Err(SourceControlError::PullRequestNotFound {
                branch: context.branch_name.to_string(),
            })
        });
    source_control.expect_delete_branch().never();

    let result = bed.merge_pipeline(source_control).complete(task.id()).await;

    assert!(matches!(result, Err(MergeError::Merge(_))));
    assert_eq!(bed.reload_task(task.id()).await.status(), TaskStatus::PrOpen);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn branch_delete_failure_is_swallowed_after_a_successful_merge(bed: TestBed) {
    let task = seed_mergeable_task(&bed, EpicSeed::default()).await;
    let mut source_control = MockSourceControlService::new();
    source_control
        .expect_merge_pull_request()
        .returning(|_| Ok(MergeSha::new("abc123".to_owned())));
    source_control.expect_delete_branch().returning(|_| {
        Err(SourceControlError::Api {
            status: 422,
            message: "ref is protected".to_owned(),
        })
    });

    let receipt = bed
        .merge_pipeline(source_control)
        .complete(task.id())
        .await
        .expect("merge still succeeds");

    assert_eq!(receipt.task.status(), TaskStatus::Merging);
}

#[rstest]
#[case(TaskStatus::Pending)]
#[case(TaskStatus::Running)]
#[case(TaskStatus::Merging)]
#[case(TaskStatus::Completed)]
#[case(TaskStatus::Failed)]
#[tokio::test(flavor = "multi_thread")]
async fn merge_requires_pr_open_status(#[case] current: TaskStatus, bed: TestBed) {
    let (_epic, tasks) = bed.seed_epic(EpicSeed::default()).await;
    let task_id = tasks.first().expect("one task").id();
    bed.force_branch(task_id, "cursor-agent/task-x-deadbeef").await;
    bed.force_status(task_id, current).await;
    let mut source_control = MockSourceControlService::new();
    source_control.expect_merge_pull_request().never();
    source_control.expect_delete_branch().never();

    let result = bed.merge_pipeline(source_control).complete(task_id).await;

    assert!(matches!(result, Err(MergeError::InvalidStatus { .. })));
    assert_eq!(bed.reload_task(task_id).await.status(), current);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn merge_requires_a_recorded_branch(bed: TestBed) {
    let (_epic, tasks) = bed.seed_epic(EpicSeed::default()).await;
    let task_id = tasks.first().expect("one task").id();
    bed.force_status(task_id, TaskStatus::PrOpen).await;
    let mut source_control = MockSourceControlService::new();
    source_control.expect_merge_pull_request().never();
    source_control.expect_delete_branch().never();

    let result = bed.merge_pipeline(source_control).complete(task_id).await;

    assert!(matches!(result, Err(MergeError::MissingBranch(_))));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn merge_requires_a_repository_merge_credential(bed: TestBed) {
    let task = seed_mergeable_task(
        &bed,
        EpicSeed {
            merge_credential: false,
            ..EpicSeed::default()
        },
    )
    .await;
    let mut source_control = MockSourceControlService::new();
    source_control.expect_merge_pull_request().never();
    source_control.expect_delete_branch().never();

    let result = bed.merge_pipeline(source_control).complete(task.id()).await;

    assert!(matches!(result, Err(MergeError::MissingMergeCredential(_))));
    assert_eq!(bed.reload_task(task.id()).await.status(), TaskStatus::PrOpen);
}
