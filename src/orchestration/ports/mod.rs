//! Port contracts for epic and task orchestration.
//!
//! Ports define infrastructure-agnostic interfaces used by the orchestration
//! services.

pub mod agent;
pub mod notifier;
pub mod queue;
pub mod repository;
pub mod source_control;

pub use agent::{AgentLaunchError, AgentLaunchRequest, AgentLauncher, LaunchReceipt};
pub use notifier::{ChangeNotifier, NotifyError, notify_epic_best_effort, notify_task_best_effort};
pub use queue::{JobQueue, QueueError, QueuedJob};
pub use repository::{EpicRepository, EpicRepositoryError, EpicRepositoryResult};
pub use source_control::{
    BranchMergeContext, MergeSha, SourceControlError, SourceControlService,
};
