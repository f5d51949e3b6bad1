//! cohort-cloud: daily-submission cohort service
//!
//! - Member accounts with JWT authentication
//! - Daily submissions against a 21:00 (+05:30) cutoff, at-risk status
//! - Streaks and cohort leaderboard
//! - Stripe subscriptions gating submission access
//! - Grader feedback via a shared bearer token

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod state;
pub mod stripe;
pub mod util;
