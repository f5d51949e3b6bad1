//! Application state

use std::sync::Arc;

use chrono::{DateTime, Utc};
use shared::clock::{Clock, SystemClock};
use sqlx::PgPool;

use crate::auth::rate_limit::RateLimiter;
use crate::config::Config;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Stripe credentials and price
#[derive(Debug, Clone)]
pub struct StripeConfig {
    pub secret_key: String,
    pub webhook_secret: String,
    pub price_id: String,
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// PostgreSQL connection pool
    pub pool: PgPool,
    /// JWT secret for user authentication
    pub jwt_secret: String,
    /// Stripe configuration
    pub stripe: StripeConfig,
    /// Bearer token of the grading worker
    pub grader_token: String,
    /// Web app base URL (Stripe redirects)
    pub app_base_url: String,
    /// Cohort assigned on registration when none is given
    pub default_cohort_id: String,
    /// Rate limiter for login/registration routes
    pub rate_limiter: RateLimiter,
    /// Time source for every deadline/billing decision
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    /// Connect to PostgreSQL, run migrations and build the state
    pub async fn new(config: &Config) -> Result<Self, BoxError> {
        let pool = PgPool::connect(&config.database_url).await?;

        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("Database migrations applied");

        Ok(Self::with_pool(pool, config, Arc::new(SystemClock)))
    }

    /// Build the state around an existing pool and clock
    pub fn with_pool(pool: PgPool, config: &Config, clock: Arc<dyn Clock>) -> Self {
        Self {
            pool,
            jwt_secret: config.jwt_secret.clone(),
            stripe: StripeConfig {
                secret_key: config.stripe_secret_key.clone(),
                webhook_secret: config.stripe_webhook_secret.clone(),
                price_id: config.stripe_price_id.clone(),
            },
            grader_token: config.grader_token.clone(),
            app_base_url: config.app_base_url.clone(),
            default_cohort_id: config.default_cohort_id.clone(),
            rate_limiter: RateLimiter::new(),
            clock,
        }
    }

    /// Current instant from the injected clock
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }
}
