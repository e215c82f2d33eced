//! Diesel schema for task persistence.

diesel::table! {
    /// Task records.
    tasks (id) {
        /// Task identifier.
        id -> Uuid,
        /// Owning identity.
        #[max_length = 255]
        owner_id -> Varchar,
        /// Task text.
        text -> Text,
        /// Optional free-form description.
        description -> Nullable<Text>,
        /// Task category.
        #[max_length = 50]
        category -> Varchar,
        /// Optional due date.
        due_date -> Nullable<Date>,
        /// Lane the task sits in.
        #[max_length = 50]
        lane -> Varchar,
        /// Zero-based position within the lane.
        position -> Int4,
        /// Write counter for optimistic concurrency.
        version -> Int8,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Append-only activity entries, ordered by `id`.
    task_activity (id) {
        /// Monotonic entry identifier.
        id -> Int8,
        /// Task the entry belongs to.
        task_id -> Uuid,
        /// Instant the entry was recorded.
        recorded_at -> Timestamptz,
        /// Action description.
        action -> Text,
    }
}

diesel::joinable!(task_activity -> tasks (task_id));
diesel::allow_tables_to_appear_in_same_query!(tasks, task_activity);
