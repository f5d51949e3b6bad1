//! API routes for cohort-cloud

pub mod auth;
pub mod billing;
pub mod health;
pub mod me;
pub mod notification;
pub mod progress;
pub mod stripe_webhook;
pub mod submission;

use axum::routing::{get, post};
use axum::{Json, Router, middleware};
use tower_http::trace::TraceLayer;

use crate::auth::grader_auth::grader_auth_middleware;
use crate::auth::rate_limit::{login_rate_limit, register_rate_limit};
use crate::auth::user_auth::user_auth_middleware;
use crate::error::ServiceError;
use crate::state::AppState;

/// Handler result: `?` accepts sqlx errors, `AppError` and bare `ErrorCode`
pub type ApiResult<T> = Result<Json<T>, ServiceError>;

/// Create the combined router
pub fn create_router(state: AppState) -> Router {
    // Public auth (rate limited per IP)
    let register = Router::new()
        .route("/api/auth/register", post(auth::register))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            register_rate_limit,
        ));
    let login = Router::new()
        .route("/api/auth/login", post(auth::login))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            login_rate_limit,
        ));

    // Stripe webhook (signature-verified, raw body)
    let webhook = Router::new().route("/stripe/webhook", post(stripe_webhook::handle_webhook));

    // Member API (JWT)
    let user = Router::new()
        .route("/api/me", get(me::get_profile))
        .route("/api/me/status", get(me::get_status))
        .route(
            "/api/submissions",
            post(submission::create).get(submission::list),
        )
        .route("/api/submissions/{id}", get(submission::get))
        .route("/api/progress", get(progress::get_progress))
        .route("/api/cohort/leaderboard", get(progress::get_leaderboard))
        .route(
            "/api/notifications/preferences",
            get(notification::get_preferences).put(notification::update_preferences),
        )
        .route("/api/billing/subscription", get(billing::get_subscription))
        .route("/api/billing/checkout", post(billing::create_checkout))
        .route("/api/billing/portal", post(billing::billing_portal))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            user_auth_middleware,
        ));

    // Grading worker (static bearer token)
    let grader = Router::new()
        .route(
            "/api/grader/submissions/{id}/feedback",
            post(submission::add_feedback),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            grader_auth_middleware,
        ));

    Router::new()
        .route("/health", get(health::health_check))
        .merge(register)
        .merge(login)
        .merge(webhook)
        .merge(user)
        .merge(grader)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
