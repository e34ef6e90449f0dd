//! `PostgreSQL` adapters for orchestration persistence.

mod models;
mod repository;
mod schema;

pub use repository::{EpicPgPool, PostgresEpicRepository};
