//! Shared types for the cohort service
//!
//! Error system, the deadline and subscription evaluators, progress math
//! and API models used by cohort-cloud and its clients.

pub mod billing;
pub mod clock;
pub mod deadline;
pub mod error;
pub mod models;
pub mod notification;
pub mod progress;
pub mod util;

// Re-exports
pub use axum::Json;
pub use serde::{Deserialize, Serialize};

pub use billing::{
    SubscriptionRow, SubscriptionSnapshot, SubscriptionStatus, current_subscription, is_active,
};
pub use clock::{Clock, FixedClock, SystemClock};
pub use deadline::{AtRiskEvaluation, evaluate};
