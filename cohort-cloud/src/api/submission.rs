//! Daily submissions and grader feedback

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use shared::deadline::{cohort_date, is_window_open, next_window_opens_at};
use shared::error::{AppError, ErrorCode};
use shared::models::{
    FeedbackCreate, MAX_SUBMISSION_CHARS, Submission, SubmissionCreate, SubmissionListQuery,
};

use crate::auth::UserIdentity;
use crate::db;
use crate::state::AppState;

use super::ApiResult;
use super::billing::load_snapshot;

const MAX_FEEDBACK_CHARS: usize = 10_000;

/// POST /api/submissions
pub async fn create(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Json(req): Json<SubmissionCreate>,
) -> ApiResult<Submission> {
    let content = req.content.trim();
    if content.is_empty() {
        return Err(ErrorCode::SubmissionEmpty.into());
    }
    if content.chars().count() > MAX_SUBMISSION_CHARS {
        return Err(AppError::new(ErrorCode::SubmissionTooLarge)
            .with_detail("max_chars", MAX_SUBMISSION_CHARS)
            .into());
    }

    let now = state.now();

    let snapshot = load_snapshot(&state, &identity.user_id, now).await?;
    if !shared::is_active(snapshot.as_ref(), now) {
        return Err(ErrorCode::SubscriptionRequired.into());
    }

    if !is_window_open(now) {
        let mut err = AppError::new(ErrorCode::SubmissionWindowClosed);
        if let Some(opens_at) = next_window_opens_at(now) {
            err = err.with_detail("opens_at", opens_at.to_rfc3339());
        }
        return Err(err.into());
    }

    let sub = db::submissions::CreateSubmission {
        id: shared::util::snowflake_id(now),
        user_id: &identity.user_id,
        cohort_id: &identity.cohort_id,
        cohort_date: cohort_date(now),
        content,
        now: now.timestamp_millis(),
    };
    let created = db::submissions::create(&state.pool, &sub)
        .await?
        .ok_or(ErrorCode::AlreadySubmittedToday)?;

    tracing::info!(
        user_id = %identity.user_id,
        submission_id = created.id,
        cohort_date = %created.cohort_date,
        "Submission received"
    );

    Ok(Json(created))
}

/// GET /api/submissions
pub async fn list(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Query(query): Query<SubmissionListQuery>,
) -> ApiResult<Vec<Submission>> {
    let rows =
        db::submissions::list_for_user(&state.pool, &identity.user_id, query.effective_limit())
            .await?;
    Ok(Json(rows))
}

/// GET /api/submissions/{id}
pub async fn get(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Path(id): Path<i64>,
) -> ApiResult<Submission> {
    let sub = db::submissions::find_for_user(&state.pool, id, &identity.user_id)
        .await?
        .ok_or(ErrorCode::SubmissionNotFound)?;
    Ok(Json(sub))
}

/// POST /api/grader/submissions/{id}/feedback
///
/// Re-grading overwrites the previous score and feedback.
pub async fn add_feedback(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<FeedbackCreate>,
) -> ApiResult<Submission> {
    if !(0..=100).contains(&req.score) {
        return Err(AppError::new(ErrorCode::InvalidScore)
            .with_detail("score", req.score)
            .into());
    }
    let feedback = req.feedback.trim();
    if feedback.chars().count() > MAX_FEEDBACK_CHARS {
        return Err(AppError::new(ErrorCode::ValueOutOfRange)
            .with_detail("field", "feedback")
            .with_detail("max", MAX_FEEDBACK_CHARS)
            .into());
    }

    let now = state.now().timestamp_millis();
    let sub = db::submissions::set_feedback(&state.pool, id, req.score, feedback, now)
        .await?
        .ok_or(ErrorCode::SubmissionNotFound)?;

    tracing::info!(submission_id = id, score = req.score, "Submission graded");

    Ok(Json(sub))
}
