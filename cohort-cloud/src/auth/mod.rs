//! Authentication: user JWTs, grader token, rate limiting

pub mod grader_auth;
pub mod rate_limit;
pub mod user_auth;

pub use user_auth::UserIdentity;
