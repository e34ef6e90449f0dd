//! In-memory adapters for orchestration tests and local development.

mod notifier;
mod queue;
mod repository;

pub use notifier::{RecordedChange, RecordingNotifier};
pub use queue::InMemoryJobQueue;
pub use repository::InMemoryEpicRepository;
