//! Shared fixtures for orchestration service tests.

use std::sync::Arc;

use mockable::DefaultClock;
use rstest::fixture;

use crate::orchestration::{
    adapters::memory::{InMemoryEpicRepository, InMemoryJobQueue, RecordingNotifier},
    config::OrchestratorConfig,
    domain::{
        BranchName, Credential, CredentialService, Epic, NewEpic, Position, Repository,
        RepositoryFullName, Task, TaskId, TaskStatus, UserId,
    },
    ports::{EpicRepository, agent::MockAgentLauncher, source_control::MockSourceControlService},
    services::{
        AgentDispatchPipeline, EpicCreationService, EpicStartWorkflow, MergeCompletionPipeline,
        StatusTransitionEngine, WebhookDispatcher,
    },
};

/// Engine type used throughout the in-memory tests.
pub type MemEngine =
    StatusTransitionEngine<InMemoryEpicRepository, RecordingNotifier, DefaultClock>;

/// Dispatcher type used throughout the in-memory tests.
pub type MemDispatcher =
    WebhookDispatcher<InMemoryEpicRepository, RecordingNotifier, InMemoryJobQueue, DefaultClock>;

/// Shared in-memory adapters plus service constructors.
pub struct TestBed {
    pub repository: Arc<InMemoryEpicRepository>,
    pub notifier: Arc<RecordingNotifier>,
    pub queue: Arc<InMemoryJobQueue>,
    pub clock: Arc<DefaultClock>,
}

/// Options for seeding an epic with a batch of pending tasks.
pub struct EpicSeed {
    pub user_id: UserId,
    pub positions: Vec<u32>,
    pub agent_credential: bool,
    pub merge_credential: bool,
}

impl Default for EpicSeed {
    fn default() -> Self {
        Self {
            user_id: UserId::new(),
            positions: vec![0],
            agent_credential: true,
            merge_credential: true,
        }
    }
}

/// Fresh adapters for one test.
#[fixture]
pub fn bed() -> TestBed {
    TestBed::new()
}

impl TestBed {
    pub fn new() -> Self {
        Self {
            repository: Arc::new(InMemoryEpicRepository::new()),
            notifier: Arc::new(RecordingNotifier::new()),
            queue: Arc::new(InMemoryJobQueue::new()),
            clock: Arc::new(DefaultClock),
        }
    }

    pub fn engine(&self) -> MemEngine {
        StatusTransitionEngine::new(
            Arc::clone(&self.repository),
            Arc::clone(&self.notifier),
            Arc::clone(&self.clock),
        )
    }

    pub fn dispatcher(&self) -> MemDispatcher {
        WebhookDispatcher::new(
            Arc::clone(&self.repository),
            self.engine(),
            Arc::clone(&self.queue),
        )
    }

    pub fn start_workflow(
        &self,
    ) -> EpicStartWorkflow<InMemoryEpicRepository, RecordingNotifier, InMemoryJobQueue, DefaultClock>
    {
        EpicStartWorkflow::new(
            Arc::clone(&self.repository),
            Arc::clone(&self.notifier),
            Arc::clone(&self.queue),
            Arc::clone(&self.clock),
        )
    }

    pub fn creation_service(&self) -> EpicCreationService<InMemoryEpicRepository, DefaultClock> {
        EpicCreationService::new(Arc::clone(&self.repository), Arc::clone(&self.clock))
    }

    pub fn dispatch_pipeline(
        &self,
        launcher: MockAgentLauncher,
    ) -> AgentDispatchPipeline<
        InMemoryEpicRepository,
        RecordingNotifier,
        MockAgentLauncher,
        DefaultClock,
    > {
        AgentDispatchPipeline::new(
            Arc::clone(&self.repository),
            self.engine(),
            Arc::new(launcher),
            Arc::clone(&self.clock),
            OrchestratorConfig::default(),
        )
    }

    pub fn merge_pipeline(
        &self,
        source_control: MockSourceControlService,
    ) -> MergeCompletionPipeline<
        InMemoryEpicRepository,
        RecordingNotifier,
        MockSourceControlService,
        DefaultClock,
    > {
        MergeCompletionPipeline::new(
            Arc::clone(&self.repository),
            self.engine(),
            Arc::new(source_control),
        )
    }

    /// Stores an epic with one pending task per requested position.
    pub async fn seed_epic(&self, seed: EpicSeed) -> (Epic, Vec<Task>) {
        let merge_credential = seed
            .merge_credential
            .then(|| credential(seed.user_id, CredentialService::Github));
        let agent_credential = seed
            .agent_credential
            .then(|| credential(seed.user_id, CredentialService::CursorAgent));
        let repository = Repository::new(
            seed.user_id,
            RepositoryFullName::new("acme/widget").expect("valid repo name"),
            "https://github.com/acme/widget",
            merge_credential,
        )
        .expect("valid repository");

        let epic = Epic::new(
            NewEpic {
                user_id: seed.user_id,
                repository,
                title: "Widget epic".to_owned(),
                prompt: "Build the widget".to_owned(),
                base_branch: "main".to_owned(),
                llm_credential: None,
                agent_credential,
            },
            self.clock.as_ref(),
        )
        .expect("valid epic");

        let tasks: Vec<Task> = seed
            .positions
            .iter()
            .map(|&position| {
                Task::new(
                    epic.id(),
                    format!("Task at position {position}"),
                    Position::new(position).expect("valid position"),
                    self.clock.as_ref(),
                )
                .expect("valid task")
            })
            .collect();

        self.repository
            .store_epic(&epic, &tasks)
            .await
            .expect("seed epic stores");
        (epic, tasks)
    }

    /// Forces a task into a status without going through the engine.
    pub async fn force_status(&self, task_id: TaskId, status: TaskStatus) -> Task {
        let mut task = self
            .repository
            .find_task(task_id)
            .await
            .expect("lookup succeeds")
            .expect("task exists");
        task.apply_transition(status, None, None, self.clock.as_ref());
        self.repository
            .update_task(&task)
            .await
            .expect("update succeeds");
        task
    }

    /// Records a work branch on a task as the dispatch pipeline would.
    pub async fn force_branch(&self, task_id: TaskId, branch: &str) -> Task {
        let mut task = self
            .repository
            .find_task(task_id)
            .await
            .expect("lookup succeeds")
            .expect("task exists");
        task.record_agent_launch(
            "agent-seeded",
            BranchName::new(branch).expect("valid branch"),
            self.clock.as_ref(),
        );
        self.repository
            .update_task(&task)
            .await
            .expect("update succeeds");
        task
    }

    /// Reloads a task from the repository.
    pub async fn reload_task(&self, task_id: TaskId) -> Task {
        self.repository
            .find_task(task_id)
            .await
            .expect("lookup succeeds")
            .expect("task exists")
    }
}

/// Builds a credential owned by the given user.
pub fn credential(user_id: UserId, service: CredentialService) -> Credential {
    Credential::new(user_id, service, "test credential", "test-api-key")
        .expect("valid credential")
}
