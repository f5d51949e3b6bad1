//! Data models
//!
//! Shared between cohort-cloud and API clients.
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! Timestamps are Unix millis (`i64`), cohort days are `NaiveDate` (+05:30).

pub mod account;
pub mod status;
pub mod submission;

// Re-exports
pub use account::*;
pub use status::*;
pub use submission::*;
