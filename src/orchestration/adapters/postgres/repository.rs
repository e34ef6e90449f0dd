//! `PostgreSQL` repository implementation for orchestration storage.

use super::{
    models::{EpicRow, NewEpicRow, NewTaskRow, TaskRow},
    schema::{epics, tasks},
};
use crate::orchestration::{
    domain::{
        BranchName, Credential, DebugLog, Epic, EpicId, EpicStatus, PersistedEpicData,
        PersistedTaskData, Position, Repository, Task, TaskId, TaskStatus, UserId,
    },
    ports::{EpicRepository, EpicRepositoryError, EpicRepositoryResult},
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL` connection pool type used by orchestration adapters.
pub type EpicPgPool = Pool<ConnectionManager<PgConnection>>;

/// `PostgreSQL`-backed epic and task repository.
#[derive(Debug, Clone)]
pub struct PostgresEpicRepository {
    pool: EpicPgPool,
}

impl PostgresEpicRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: EpicPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> EpicRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> EpicRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(EpicRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(EpicRepositoryError::persistence)?
    }
}

#[async_trait]
impl EpicRepository for PostgresEpicRepository {
    async fn store_epic(&self, epic: &Epic, batch: &[Task]) -> EpicRepositoryResult<()> {
        let epic_id = epic.id();
        let epic_row = epic_to_row(epic)?;
        let task_rows = batch
            .iter()
            .map(task_to_row)
            .collect::<EpicRepositoryResult<Vec<NewTaskRow>>>()?;
        check_batch_positions(epic_id, batch)?;

        self.run_blocking(move |connection| {
            connection
                .transaction(|conn| -> Result<(), DieselError> {
                    diesel::insert_into(epics::table)
                        .values(&epic_row)
                        .execute(conn)?;
                    diesel::insert_into(tasks::table)
                        .values(&task_rows)
                        .execute(conn)?;
                    Ok(())
                })
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, ref info)
                        if is_epic_unique_violation(info.as_ref()) =>
                    {
                        EpicRepositoryError::DuplicateEpic(epic_id)
                    }
                    _ => EpicRepositoryError::persistence(err),
                })
        })
        .await
    }

    async fn update_epic(&self, epic: &Epic) -> EpicRepositoryResult<()> {
        let epic_id = epic.id();
        let changeset = epic_to_row(epic)?;

        self.run_blocking(move |connection| {
            let updated = diesel::update(epics::table.find(epic_id.into_inner()))
                .set(&changeset)
                .execute(connection)
                .map_err(EpicRepositoryError::persistence)?;
            if updated == 0 {
                return Err(EpicRepositoryError::EpicNotFound(epic_id));
            }
            Ok(())
        })
        .await
    }

    async fn find_epic(&self, id: EpicId) -> EpicRepositoryResult<Option<Epic>> {
        self.run_blocking(move |connection| {
            let row = epics::table
                .filter(epics::id.eq(id.into_inner()))
                .select(EpicRow::as_select())
                .first::<EpicRow>(connection)
                .optional()
                .map_err(EpicRepositoryError::persistence)?;
            row.map(row_to_epic).transpose()
        })
        .await
    }

    async fn find_task(&self, id: TaskId) -> EpicRepositoryResult<Option<Task>> {
        self.run_blocking(move |connection| {
            let row = tasks::table
                .filter(tasks::id.eq(id.into_inner()))
                .select(TaskRow::as_select())
                .first::<TaskRow>(connection)
                .optional()
                .map_err(EpicRepositoryError::persistence)?;
            row.map(row_to_task).transpose()
        })
        .await
    }

    async fn update_task(&self, task: &Task) -> EpicRepositoryResult<()> {
        let task_id = task.id();
        let changeset = task_to_row(task)?;

        self.run_blocking(move |connection| {
            // One UPDATE statement carries status, pr_url, and debug_log
            // together, so readers never observe a half-applied transition.
            let updated = diesel::update(tasks::table.find(task_id.into_inner()))
                .set(&changeset)
                .execute(connection)
                .map_err(EpicRepositoryError::persistence)?;
            if updated == 0 {
                return Err(EpicRepositoryError::TaskNotFound(task_id));
            }
            Ok(())
        })
        .await
    }

    async fn tasks_for_epic(&self, epic_id: EpicId) -> EpicRepositoryResult<Vec<Task>> {
        self.run_blocking(move |connection| {
            let rows = tasks::table
                .filter(tasks::epic_id.eq(epic_id.into_inner()))
                .order(tasks::position.asc())
                .select(TaskRow::as_select())
                .load::<TaskRow>(connection)
                .map_err(EpicRepositoryError::persistence)?;
            rows.into_iter().map(row_to_task).collect()
        })
        .await
    }
}

fn is_epic_unique_violation(info: &dyn DatabaseErrorInformation) -> bool {
    info.constraint_name() == Some("epics_pkey")
}

/// Rejects a batch carrying duplicate positions before touching the database.
///
/// The unique index still enforces integrity against concurrent writers;
/// this pre-check only improves semantic error reporting.
fn check_batch_positions(epic_id: EpicId, batch: &[Task]) -> EpicRepositoryResult<()> {
    let mut seen = Vec::with_capacity(batch.len());
    for task in batch {
        if seen.contains(&task.position()) {
            return Err(EpicRepositoryError::DuplicatePosition {
                epic_id,
                position: task.position(),
            });
        }
        seen.push(task.position());
    }
    Ok(())
}

fn epic_to_row(epic: &Epic) -> EpicRepositoryResult<NewEpicRow> {
    let repository =
        serde_json::to_value(epic.repository()).map_err(EpicRepositoryError::persistence)?;
    let llm_credential = epic
        .llm_credential()
        .map(serde_json::to_value)
        .transpose()
        .map_err(EpicRepositoryError::persistence)?;
    let agent_credential = epic
        .agent_credential()
        .map(serde_json::to_value)
        .transpose()
        .map_err(EpicRepositoryError::persistence)?;

    Ok(NewEpicRow {
        id: epic.id().into_inner(),
        user_id: epic.user_id().into_inner(),
        repository,
        title: epic.title().to_owned(),
        prompt: epic.prompt().to_owned(),
        base_branch: epic.base_branch().to_owned(),
        status: epic.status().as_str().to_owned(),
        llm_credential,
        agent_credential,
        created_at: epic.created_at(),
        updated_at: epic.updated_at(),
    })
}

fn row_to_epic(row: EpicRow) -> EpicRepositoryResult<Epic> {
    let repository = serde_json::from_value::<Repository>(row.repository)
        .map_err(EpicRepositoryError::persistence)?;
    let llm_credential = row
        .llm_credential
        .map(serde_json::from_value::<Credential>)
        .transpose()
        .map_err(EpicRepositoryError::persistence)?;
    let agent_credential = row
        .agent_credential
        .map(serde_json::from_value::<Credential>)
        .transpose()
        .map_err(EpicRepositoryError::persistence)?;
    let status =
        EpicStatus::try_from(row.status.as_str()).map_err(EpicRepositoryError::persistence)?;

    Ok(Epic::from_persisted(PersistedEpicData {
        id: EpicId::from_uuid(row.id),
        user_id: UserId::from_uuid(row.user_id),
        repository,
        title: row.title,
        prompt: row.prompt,
        base_branch: row.base_branch,
        status,
        llm_credential,
        agent_credential,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }))
}

fn task_to_row(task: &Task) -> EpicRepositoryResult<NewTaskRow> {
    let position =
        i32::try_from(task.position().value()).map_err(EpicRepositoryError::persistence)?;

    Ok(NewTaskRow {
        id: task.id().into_inner(),
        epic_id: task.epic_id().into_inner(),
        description: task.description().to_owned(),
        position,
        status: task.status().as_str().to_owned(),
        agent_id: task.agent_id().map(str::to_owned),
        branch_name: task.branch_name().map(|branch| branch.as_str().to_owned()),
        pr_url: task.pr_url().map(str::to_owned),
        debug_log: task.debug_log().as_str().to_owned(),
        created_at: task.created_at(),
        updated_at: task.updated_at(),
    })
}

fn row_to_task(row: TaskRow) -> EpicRepositoryResult<Task> {
    let position_value =
        u32::try_from(row.position).map_err(EpicRepositoryError::persistence)?;
    let position = Position::new(position_value).map_err(EpicRepositoryError::persistence)?;
    let status =
        TaskStatus::try_from(row.status.as_str()).map_err(EpicRepositoryError::persistence)?;
    let branch_name = row
        .branch_name
        .map(BranchName::new)
        .transpose()
        .map_err(EpicRepositoryError::persistence)?;

    Ok(Task::from_persisted(PersistedTaskData {
        id: TaskId::from_uuid(row.id),
        epic_id: EpicId::from_uuid(row.epic_id),
        description: row.description,
        position,
        status,
        agent_id: row.agent_id,
        branch_name,
        pr_url: row.pr_url,
        debug_log: DebugLog::from_persisted(row.debug_log),
        created_at: row.created_at,
        updated_at: row.updated_at,
    }))
}
