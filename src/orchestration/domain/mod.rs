//! Domain model for epic and task orchestration.
//!
//! The domain models epics with their ordered task batches, the six-state
//! task lifecycle, agent launch bookkeeping, and the append-only task debug
//! log, while keeping all infrastructure concerns outside of the domain
//! boundary.

mod branch;
mod credential;
mod debug_log;
mod epic;
mod error;
mod ids;
mod repository;
mod status;
mod task;

pub use branch::BranchName;
pub use credential::{Credential, CredentialService};
pub use debug_log::DebugLog;
pub use epic::{Epic, NewEpic, PersistedEpicData};
pub use error::{
    DomainError, ParseCredentialServiceError, ParseEpicStatusError, ParseTaskStatusError,
};
pub use ids::{CredentialId, EpicId, Position, RepositoryFullName, RepositoryId, TaskId, UserId};
pub use repository::Repository;
pub use status::{EpicStatus, TaskStatus};
pub use task::{PersistedTaskData, Task};
