use shared::billing::SubscriptionRow;
use sqlx::PgPool;

const INSERT_SUBSCRIPTION: &str = "INSERT INTO subscriptions
    (id, user_id, status, current_period_end, cancel_at_period_end, created_at, updated_at)
 VALUES ($1, $2, $3, $4, $5, $6, $6)";

/// Checkout sessions only seed the row; subscription events own its state
const ON_CONFLICT_KEEP: &str = " ON CONFLICT (id) DO NOTHING";

const ON_CONFLICT_REFRESH: &str = " ON CONFLICT (id) DO UPDATE SET
    status = $3,
    current_period_end = COALESCE($4, subscriptions.current_period_end),
    cancel_at_period_end = $5,
    updated_at = $6";

pub struct UpsertSubscription<'a> {
    pub id: &'a str,
    pub user_id: &'a str,
    pub status: &'a str,
    pub current_period_end: Option<i64>,
    pub cancel_at_period_end: bool,
    pub now: i64,
}

fn bind_subscription<'q>(
    sql: &'q str,
    sub: &'q UpsertSubscription<'q>,
) -> sqlx::query::Query<'q, sqlx::Postgres, sqlx::postgres::PgArguments> {
    sqlx::query(sql)
        .bind(sub.id)
        .bind(sub.user_id)
        .bind(sub.status)
        .bind(sub.current_period_end)
        .bind(sub.cancel_at_period_end)
        .bind(sub.now)
}

/// Insert or refresh a subscription from a `customer.subscription.*` event.
///
/// A `None` period end keeps the stored one.
pub async fn upsert(pool: &PgPool, sub: &UpsertSubscription<'_>) -> Result<(), sqlx::Error> {
    let sql = format!("{INSERT_SUBSCRIPTION}{ON_CONFLICT_REFRESH}");
    bind_subscription(&sql, sub).execute(pool).await?;
    Ok(())
}

/// Insert a subscription unless Stripe already told us about it.
///
/// Returns `false` when the row existed and was left untouched.
pub async fn insert_if_absent(
    pool: &PgPool,
    sub: &UpsertSubscription<'_>,
) -> Result<bool, sqlx::Error> {
    let sql = format!("{INSERT_SUBSCRIPTION}{ON_CONFLICT_KEEP}");
    let result = bind_subscription(&sql, sub).execute(pool).await?;
    Ok(result.rows_affected() > 0)
}

pub async fn update_status(
    pool: &PgPool,
    subscription_id: &str,
    status: &str,
    now: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE subscriptions SET status = $1, updated_at = $2 WHERE id = $3")
        .bind(status)
        .bind(now)
        .bind(subscription_id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn update_period_end(
    pool: &PgPool,
    subscription_id: &str,
    current_period_end: i64,
    now: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE subscriptions SET current_period_end = $1, updated_at = $2 WHERE id = $3",
    )
    .bind(current_period_end)
    .bind(now)
    .bind(subscription_id)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn find_user_by_sub_id(
    pool: &PgPool,
    stripe_sub_id: &str,
) -> Result<Option<String>, sqlx::Error> {
    let row: Option<(String,)> =
        sqlx::query_as("SELECT user_id FROM subscriptions WHERE id = $1")
            .bind(stripe_sub_id)
            .fetch_optional(pool)
            .await?;
    Ok(row.map(|r| r.0))
}

/// Every subscription row of a user, newest first
pub async fn list_for_user(
    pool: &PgPool,
    user_id: &str,
) -> Result<Vec<SubscriptionRow>, sqlx::Error> {
    sqlx::query_as(
        "SELECT id, user_id, status, current_period_end, cancel_at_period_end, updated_at
            FROM subscriptions
            WHERE user_id = $1
            ORDER BY updated_at DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}
