use shared::notification::NotificationPreferences;
use sqlx::PgPool;

/// Stored preferences, `None` when the user never changed the defaults
pub async fn find(
    pool: &PgPool,
    user_id: &str,
) -> Result<Option<NotificationPreferences>, sqlx::Error> {
    sqlx::query_as(
        "SELECT email_enabled, push_enabled, reminder_enabled, quiet_hours_start, quiet_hours_end
         FROM notification_preferences WHERE user_id = $1",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await
}

pub async fn upsert(
    pool: &PgPool,
    user_id: &str,
    prefs: &NotificationPreferences,
    now: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO notification_preferences
            (user_id, email_enabled, push_enabled, reminder_enabled,
             quiet_hours_start, quiet_hours_end, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7)
         ON CONFLICT (user_id) DO UPDATE SET
            email_enabled = $2, push_enabled = $3, reminder_enabled = $4,
            quiet_hours_start = $5, quiet_hours_end = $6, updated_at = $7",
    )
    .bind(user_id)
    .bind(prefs.email_enabled)
    .bind(prefs.push_enabled)
    .bind(prefs.reminder_enabled)
    .bind(prefs.quiet_hours_start.as_deref())
    .bind(prefs.quiet_hours_end.as_deref())
    .bind(now)
    .execute(pool)
    .await?;
    Ok(())
}
