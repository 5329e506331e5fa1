//! Diesel schema for notification persistence.

diesel::table! {
    /// Notification outbox.
    notifications (id) {
        /// Notification identifier.
        id -> Uuid,
        /// Recipient user.
        recipient_id -> Uuid,
        /// Related task.
        task_id -> Uuid,
        /// Category name.
        #[max_length = 32]
        kind -> Varchar,
        /// Reminder lead time in hours.
        lead_hours -> Nullable<Int4>,
        /// Rendered message body.
        message -> Text,
        /// Earliest delivery time.
        scheduled_at -> Timestamptz,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Delivery timestamp.
        sent_at -> Nullable<Timestamptz>,
    }
}
