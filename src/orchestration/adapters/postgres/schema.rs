//! Diesel schema for orchestration persistence.

diesel::table! {
    /// Epic records with embedded repository and credential payloads.
    epics (id) {
        /// Epic identifier.
        id -> Uuid,
        /// Owning user identifier.
        user_id -> Uuid,
        /// Target repository payload (name, URL, merge credential).
        repository -> Jsonb,
        /// Human-readable title.
        #[max_length = 255]
        title -> Varchar,
        /// Free-text prompt.
        prompt -> Text,
        /// Branch agents start their work from.
        #[max_length = 255]
        base_branch -> Varchar,
        /// Epic lifecycle status.
        #[max_length = 50]
        status -> Varchar,
        /// Optional LLM-generation credential payload.
        llm_credential -> Nullable<Jsonb>,
        /// Optional agent-launch credential payload.
        agent_credential -> Nullable<Jsonb>,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Task records ordered by position within their epic.
    tasks (id) {
        /// Task identifier.
        id -> Uuid,
        /// Owning epic identifier.
        epic_id -> Uuid,
        /// Task description forwarded to the agent.
        description -> Text,
        /// Zero-based ordering key, unique per epic.
        position -> Int4,
        /// Task lifecycle status.
        #[max_length = 50]
        status -> Varchar,
        /// External agent identifier once launched.
        #[max_length = 255]
        agent_id -> Nullable<Varchar>,
        /// Work-branch name once launched.
        #[max_length = 255]
        branch_name -> Nullable<Varchar>,
        /// Pull-request URL once reported.
        pr_url -> Nullable<Text>,
        /// Append-only debug log text.
        debug_log -> Text,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::joinable!(tasks -> epics (epic_id));
diesel::allow_tables_to_appear_in_same_query!(epics, tasks);
