use chrono::NaiveDate;
use shared::models::Submission;
use shared::progress::CohortSubmissionRow;
use sqlx::PgPool;

pub struct CreateSubmission<'a> {
    pub id: i64,
    pub user_id: &'a str,
    pub cohort_id: &'a str,
    pub cohort_date: NaiveDate,
    pub content: &'a str,
    pub now: i64,
}

/// Insert a submission. Returns `None` if the user already has one for
/// that cohort day.
pub async fn create(
    pool: &PgPool,
    sub: &CreateSubmission<'_>,
) -> Result<Option<Submission>, sqlx::Error> {
    sqlx::query_as(
        "INSERT INTO submissions (id, user_id, cohort_id, cohort_date, content, created_at)
         VALUES ($1, $2, $3, $4, $5, $6)
         ON CONFLICT (user_id, cohort_date) DO NOTHING
         RETURNING *",
    )
    .bind(sub.id)
    .bind(sub.user_id)
    .bind(sub.cohort_id)
    .bind(sub.cohort_date)
    .bind(sub.content)
    .bind(sub.now)
    .fetch_optional(pool)
    .await
}

pub async fn exists_for_day(
    pool: &PgPool,
    user_id: &str,
    cohort_date: NaiveDate,
) -> Result<bool, sqlx::Error> {
    let row: (bool,) = sqlx::query_as(
        "SELECT EXISTS (SELECT 1 FROM submissions WHERE user_id = $1 AND cohort_date = $2)",
    )
    .bind(user_id)
    .bind(cohort_date)
    .fetch_one(pool)
    .await?;
    Ok(row.0)
}

pub async fn list_for_user(
    pool: &PgPool,
    user_id: &str,
    limit: i64,
) -> Result<Vec<Submission>, sqlx::Error> {
    sqlx::query_as(
        "SELECT * FROM submissions WHERE user_id = $1
         ORDER BY cohort_date DESC LIMIT $2",
    )
    .bind(user_id)
    .bind(limit)
    .fetch_all(pool)
    .await
}

pub async fn find_for_user(
    pool: &PgPool,
    id: i64,
    user_id: &str,
) -> Result<Option<Submission>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM submissions WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

/// Attach grader feedback. Returns the updated row, `None` if not found.
pub async fn set_feedback(
    pool: &PgPool,
    id: i64,
    score: i16,
    feedback: &str,
    now: i64,
) -> Result<Option<Submission>, sqlx::Error> {
    sqlx::query_as(
        "UPDATE submissions SET score = $1, feedback = $2, graded_at = $3
         WHERE id = $4
         RETURNING *",
    )
    .bind(score)
    .bind(feedback)
    .bind(now)
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Every member of a cohort joined with their submission days
pub async fn cohort_rows(
    pool: &PgPool,
    cohort_id: &str,
) -> Result<Vec<CohortSubmissionRow>, sqlx::Error> {
    sqlx::query_as(
        "SELECT u.id AS user_id, u.display_name, s.cohort_date
         FROM users u
         LEFT JOIN submissions s ON s.user_id = u.id
         WHERE u.cohort_id = $1",
    )
    .bind(cohort_id)
    .fetch_all(pool)
    .await
}
