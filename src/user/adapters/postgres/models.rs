//! Diesel row models for user persistence.

use super::schema::users;
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Query result row and insert model for user records.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UserRow {
    /// Internal user identifier.
    pub id: uuid::Uuid,
    /// Chat transport identifier.
    pub external_id: i64,
    /// Display name.
    pub display_name: String,
    /// Role name.
    pub role: String,
    /// Listing flag.
    pub active: bool,
    /// Registration timestamp.
    pub registered_at: DateTime<Utc>,
    /// Latest interaction timestamp.
    pub last_activity: DateTime<Utc>,
}
