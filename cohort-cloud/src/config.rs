//! Server configuration

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL connection URL
    pub database_url: String,
    /// HTTP port
    pub http_port: u16,
    /// Environment: development | staging | production
    pub environment: String,
    /// JWT secret for user authentication
    pub jwt_secret: String,
    /// Stripe secret key
    pub stripe_secret_key: String,
    /// Stripe webhook signing secret
    pub stripe_webhook_secret: String,
    /// Stripe Price ID for the cohort membership (monthly)
    pub stripe_price_id: String,
    /// Bearer token the grading worker presents
    pub grader_token: String,
    /// Web app base URL (checkout/portal redirects)
    pub app_base_url: String,
    /// Cohort assigned when registration does not name one
    pub default_cohort_id: String,
}

impl Config {
    /// Require a secret env var: never empty, and only defaulted in development.
    fn require_secret(name: &str, environment: &str) -> Result<String, BoxError> {
        Self::secret_from(name, std::env::var(name).ok(), environment)
    }

    fn secret_from(
        name: &str,
        value: Option<String>,
        environment: &str,
    ) -> Result<String, BoxError> {
        let val = match value {
            Some(v) => v,
            None => {
                if environment != "development" {
                    return Err(format!("{name} must be set in {environment} environment").into());
                }
                format!("dev-{name}-not-for-production")
            }
        };
        if val.is_empty() {
            return Err(format!("{name} must not be empty").into());
        }
        Ok(val)
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, BoxError> {
        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());

        Ok(Self {
            database_url: std::env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set")?,
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            environment: environment.clone(),
            jwt_secret: Self::require_secret("JWT_SECRET", &environment)?,
            stripe_secret_key: Self::require_secret("STRIPE_SECRET_KEY", &environment)?,
            stripe_webhook_secret: Self::require_secret("STRIPE_WEBHOOK_SECRET", &environment)?,
            stripe_price_id: std::env::var("STRIPE_PRICE_ID")
                .unwrap_or_else(|_| "price_cohort_monthly".into()),
            grader_token: Self::require_secret("GRADER_TOKEN", &environment)?,
            app_base_url: std::env::var("APP_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:3000".into()),
            default_cohort_id: std::env::var("DEFAULT_COHORT_ID")
                .unwrap_or_else(|_| "default".into()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dev_secret_placeholder() {
        let val = Config::secret_from("JWT_SECRET", None, "development").unwrap();
        assert_eq!(val, "dev-JWT_SECRET-not-for-production");
    }

    #[test]
    fn test_missing_secret_rejected_in_production() {
        let err = Config::secret_from("JWT_SECRET", None, "production").unwrap_err();
        assert!(err.to_string().contains("must be set"));
    }

    #[test]
    fn test_empty_secret_rejected_in_every_environment() {
        for env in ["development", "staging", "production"] {
            let err = Config::secret_from("GRADER_TOKEN", Some(String::new()), env).unwrap_err();
            assert!(err.to_string().contains("must not be empty"));
        }
    }

    #[test]
    fn test_explicit_secret_kept() {
        let val = Config::secret_from("STRIPE_SECRET_KEY", Some("sk_live".into()), "production")
            .unwrap();
        assert_eq!(val, "sk_live");
    }
}
