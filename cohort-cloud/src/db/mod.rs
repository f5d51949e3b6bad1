//! Database access layer

pub mod notification_prefs;
pub mod submissions;
pub mod subscriptions;
pub mod users;
pub mod webhook_events;

/// Postgres unique-violation SQLSTATE
const UNIQUE_VIOLATION: &str = "23505";

/// Whether `err` is a unique-constraint violation
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .and_then(|e| e.code())
        .is_some_and(|code| code == UNIQUE_VIOLATION)
}
