use sqlx::PgPool;

#[derive(sqlx::FromRow)]
pub struct User {
    pub id: String,
    pub email: String,
    pub hashed_password: String,
    pub display_name: String,
    pub cohort_id: String,
    pub stripe_customer_id: Option<String>,
    pub created_at: i64,
}

pub struct CreateUser<'a> {
    pub id: &'a str,
    pub email: &'a str,
    pub hashed_password: &'a str,
    pub display_name: &'a str,
    pub cohort_id: &'a str,
    pub now: i64,
}

pub async fn create(pool: &PgPool, user: &CreateUser<'_>) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO users (id, email, hashed_password, display_name, cohort_id, created_at)
         VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(user.id)
    .bind(user.email)
    .bind(user.hashed_password)
    .bind(user.display_name)
    .bind(user.cohort_id)
    .bind(user.now)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn find_by_id(pool: &PgPool, user_id: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await
}

pub async fn find_by_stripe_customer(
    pool: &PgPool,
    customer_id: &str,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM users WHERE stripe_customer_id = $1")
        .bind(customer_id)
        .fetch_optional(pool)
        .await
}

pub async fn set_stripe_customer(
    pool: &PgPool,
    user_id: &str,
    stripe_customer_id: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE users SET stripe_customer_id = $1 WHERE id = $2")
        .bind(stripe_customer_id)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(())
}
