//! Submission Model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Maximum accepted submission body, in characters
pub const MAX_SUBMISSION_CHARS: usize = 20_000;

/// Daily work submission entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Submission {
    pub id: i64,
    pub user_id: String,
    pub cohort_id: String,
    /// Cohort day the submission counts for
    pub cohort_date: NaiveDate,
    pub content: String,
    /// Grade 0..=100, set by the grader
    pub score: Option<i16>,
    pub feedback: Option<String>,
    pub graded_at: Option<i64>,
    pub created_at: i64,
}

/// Create submission payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionCreate {
    pub content: String,
}

/// Grader feedback payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackCreate {
    pub score: i16,
    pub feedback: String,
}

/// List query (`?limit=`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubmissionListQuery {
    pub limit: Option<i64>,
}

impl SubmissionListQuery {
    pub const DEFAULT_LIMIT: i64 = 30;
    pub const MAX_LIMIT: i64 = 100;

    /// Requested limit clamped to `1..=MAX_LIMIT`
    pub fn effective_limit(&self) -> i64 {
        self.limit
            .unwrap_or(Self::DEFAULT_LIMIT)
            .clamp(1, Self::MAX_LIMIT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_limit() {
        assert_eq!(SubmissionListQuery::default().effective_limit(), 30);
        assert_eq!(SubmissionListQuery { limit: Some(0) }.effective_limit(), 1);
        assert_eq!(SubmissionListQuery { limit: Some(500) }.effective_limit(), 100);
        assert_eq!(SubmissionListQuery { limit: Some(12) }.effective_limit(), 12);
    }
}
