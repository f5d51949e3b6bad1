//! Notification preferences

use axum::{Extension, Json, extract::State};
use shared::notification::NotificationPreferences;

use crate::auth::UserIdentity;
use crate::db;
use crate::state::AppState;

use super::ApiResult;

/// GET /api/notifications/preferences
pub async fn get_preferences(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
) -> ApiResult<NotificationPreferences> {
    let prefs = db::notification_prefs::find(&state.pool, &identity.user_id)
        .await?
        .unwrap_or_default();
    Ok(Json(prefs))
}

/// PUT /api/notifications/preferences
pub async fn update_preferences(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Json(prefs): Json<NotificationPreferences>,
) -> ApiResult<NotificationPreferences> {
    prefs.validate()?;

    let now = state.now().timestamp_millis();
    db::notification_prefs::upsert(&state.pool, &identity.user_id, &prefs, now).await?;

    tracing::debug!(user_id = %identity.user_id, "Notification preferences updated");
    Ok(Json(prefs))
}
