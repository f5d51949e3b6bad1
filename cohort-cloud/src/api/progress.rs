//! Streaks and cohort leaderboard

use axum::{Extension, Json, extract::State};
use shared::deadline::cohort_date;
use shared::error::ErrorCode;
use shared::progress::{LeaderboardEntry, ProgressSummary, build_leaderboard};

use crate::auth::UserIdentity;
use crate::db;
use crate::error::ServiceResult;
use crate::state::AppState;

use super::ApiResult;

async fn cohort_leaderboard(
    state: &AppState,
    cohort_id: &str,
) -> ServiceResult<Vec<LeaderboardEntry>> {
    let rows = db::submissions::cohort_rows(&state.pool, cohort_id).await?;
    Ok(build_leaderboard(&rows, cohort_date(state.now())))
}

/// GET /api/progress
pub async fn get_progress(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
) -> ApiResult<ProgressSummary> {
    let board = cohort_leaderboard(&state, &identity.cohort_id).await?;
    let summary =
        ProgressSummary::for_user(&board, &identity.user_id).ok_or(ErrorCode::UserNotFound)?;
    Ok(Json(summary))
}

/// GET /api/cohort/leaderboard
pub async fn get_leaderboard(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
) -> ApiResult<Vec<LeaderboardEntry>> {
    let board = cohort_leaderboard(&state, &identity.cohort_id).await?;
    Ok(Json(board))
}
