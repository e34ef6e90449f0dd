//! Adapter implementations of the orchestration ports.

pub mod cursor;
pub mod github;
pub mod http;
pub mod memory;
pub mod postgres;

pub use cursor::CursorAgentLauncher;
pub use github::GithubSourceControl;
pub use http::{cursor_webhook, webhook_router};
pub use memory::{InMemoryEpicRepository, InMemoryJobQueue, RecordedChange, RecordingNotifier};
pub use postgres::{EpicPgPool, PostgresEpicRepository};
