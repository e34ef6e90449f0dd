//! Application services for epic and task orchestration.

mod creation;
mod dispatch;
mod jobs;
mod merge;
mod start;
mod transition;
mod webhook;

pub use creation::{CreationError, CreationResult, EpicCreationService, ManualSpecRequest};
pub use dispatch::{AgentDispatchPipeline, DispatchError, DispatchReceipt, DispatchResult};
pub use jobs::{JobError, JobRunner};
pub use merge::{MergeCompletionPipeline, MergeError, MergeReceipt, MergeResult};
pub use start::{EpicStartWorkflow, StartError, StartResult};
pub use transition::{
    StatusTransitionEngine, TransitionError, TransitionRequest, TransitionResult,
};
pub use webhook::{
    NormalizedWebhook, WebhookDispatchError, WebhookDispatcher, WebhookHandled, WebhookOutcome,
    extract_error_message, extract_pr_url, extract_status,
};
