//! Caller's profile and daily status

use axum::{Extension, Json, extract::State};
use shared::deadline::{cohort_date, evaluate};
use shared::error::ErrorCode;
use shared::models::{DailyStatus, UserProfile};
use shared::notification::reminder_due;

use crate::auth::UserIdentity;
use crate::db;
use crate::state::AppState;

use super::ApiResult;
use super::billing::load_snapshot;

/// GET /api/me
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
) -> ApiResult<UserProfile> {
    let user = db::users::find_by_id(&state.pool, &identity.user_id)
        .await?
        .ok_or(ErrorCode::UserNotFound)?;

    Ok(Json(UserProfile {
        id: user.id,
        email: user.email,
        display_name: user.display_name,
        cohort_id: user.cohort_id,
        created_at: user.created_at,
    }))
}

/// GET /api/me/status
///
/// Re-evaluated on every call; clients poll this for countdowns.
pub async fn get_status(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
) -> ApiResult<DailyStatus> {
    let now = state.now();
    let today = cohort_date(now);

    let has_submitted_today =
        db::submissions::exists_for_day(&state.pool, &identity.user_id, today).await?;
    let evaluation = evaluate(now, has_submitted_today);

    let snapshot = load_snapshot(&state, &identity.user_id, now).await?;
    let subscription_active = shared::is_active(snapshot.as_ref(), now);

    let prefs = db::notification_prefs::find(&state.pool, &identity.user_id)
        .await?
        .unwrap_or_default();

    Ok(Json(DailyStatus {
        cohort_date: today,
        has_submitted_today,
        minutes_remaining: evaluation.minutes_remaining,
        is_at_risk: evaluation.is_at_risk,
        subscription_active,
        reminder_due: reminder_due(&prefs, &evaluation, now),
    }))
}
