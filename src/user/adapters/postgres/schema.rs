//! Diesel schema for user persistence.

diesel::table! {
    /// Registered users.
    users (id) {
        /// Internal user identifier.
        id -> Uuid,
        /// Chat transport identifier.
        external_id -> Int8,
        /// Name shown in listings.
        #[max_length = 255]
        display_name -> Varchar,
        /// Role name.
        #[max_length = 16]
        role -> Varchar,
        /// Whether the user is listed.
        active -> Bool,
        /// Registration timestamp.
        registered_at -> Timestamptz,
        /// Latest interaction timestamp.
        last_activity -> Timestamptz,
    }
}
