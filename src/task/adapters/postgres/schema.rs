//! Diesel schema for task persistence.

diesel::table! {
    /// Task records.
    tasks (id) {
        /// Internal task identifier.
        id -> Uuid,
        /// Task title.
        #[max_length = 255]
        title -> Varchar,
        /// Optional description.
        description -> Nullable<Text>,
        /// Creating user.
        creator_id -> Uuid,
        /// Current assignee.
        assignee_id -> Nullable<Uuid>,
        /// Lifecycle status.
        #[max_length = 32]
        status -> Varchar,
        /// Priority.
        #[max_length = 16]
        priority -> Varchar,
        /// Deadline instant.
        deadline -> Nullable<Timestamptz>,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
        /// Completion timestamp.
        completed_at -> Nullable<Timestamptz>,
        /// Optimistic concurrency counter.
        revision -> Int8,
    }
}

diesel::table! {
    /// Append-only task audit log.
    task_history (id) {
        /// Surrogate key preserving insertion order.
        id -> Int8,
        /// Task the entry belongs to.
        task_id -> Uuid,
        /// Acting user; null for system actions.
        actor_id -> Nullable<Uuid>,
        /// Action name.
        #[max_length = 64]
        action -> Varchar,
        /// Value before the change.
        old_value -> Nullable<Text>,
        /// Value after the change.
        new_value -> Nullable<Text>,
        /// When the change happened.
        created_at -> Timestamptz,
    }
}

diesel::joinable!(task_history -> tasks (task_id));
diesel::allow_tables_to_appear_in_same_query!(tasks, task_history);
