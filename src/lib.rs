//! Brunel: coding-agent work orchestration backend.
//!
//! This crate coordinates long-running units of work ("tasks") grouped into
//! epics, dispatching each task to an external autonomous coding agent,
//! tracking its progress through asynchronous webhook callbacks, and merging
//! the agent's changes once the work is finished.
//!
//! # Architecture
//!
//! Brunel follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (database, APIs, etc.)
//!
//! # Modules
//!
//! - [`orchestration`]: Epic/task lifecycle, agent dispatch, webhook
//!   ingestion, and merge completion

pub mod orchestration;
