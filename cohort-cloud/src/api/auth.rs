//! Registration and login

use axum::{Json, extract::State};
use shared::error::{AppError, ErrorCode};
use shared::models::{AuthResponse, LoginRequest, RegisterRequest};

use crate::auth::user_auth::create_token;
use crate::db;
use crate::state::AppState;
use crate::util::{hash_password, is_plausible_email, normalize_email, verify_password};

use super::ApiResult;

const MIN_PASSWORD_LEN: usize = 8;
const MAX_DISPLAY_NAME_CHARS: usize = 64;

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<AuthResponse> {
    let email = normalize_email(&req.email);
    if !is_plausible_email(&email) {
        return Err(ErrorCode::InvalidEmail.into());
    }
    if req.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ErrorCode::PasswordTooShort.into());
    }

    let display_name = req.display_name.trim();
    if display_name.is_empty() {
        return Err(AppError::new(ErrorCode::RequiredField)
            .with_detail("field", "display_name")
            .into());
    }
    if display_name.chars().count() > MAX_DISPLAY_NAME_CHARS {
        return Err(AppError::new(ErrorCode::ValueOutOfRange)
            .with_detail("field", "display_name")
            .with_detail("max", MAX_DISPLAY_NAME_CHARS)
            .into());
    }

    let cohort_id = req
        .cohort_id
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .unwrap_or(&state.default_cohort_id)
        .to_string();

    if db::users::find_by_email(&state.pool, &email).await?.is_some() {
        return Err(ErrorCode::EmailAlreadyRegistered.into());
    }

    let hashed = hash_password(&req.password).map_err(|e| {
        tracing::error!("Password hashing failed: {e}");
        AppError::new(ErrorCode::InternalError)
    })?;

    let user_id = uuid::Uuid::new_v4().to_string();
    let now = state.now().timestamp_millis();
    let user = db::users::CreateUser {
        id: &user_id,
        email: &email,
        hashed_password: &hashed,
        display_name,
        cohort_id: &cohort_id,
        now,
    };
    if let Err(e) = db::users::create(&state.pool, &user).await {
        // Lost a race against a concurrent registration
        if db::is_unique_violation(&e) {
            return Err(ErrorCode::EmailAlreadyRegistered.into());
        }
        return Err(e.into());
    }

    let token = create_token(&user_id, &email, &cohort_id, &state.jwt_secret).map_err(|e| {
        tracing::error!("JWT creation failed: {e}");
        AppError::new(ErrorCode::InternalError)
    })?;

    tracing::info!(user_id = %user_id, cohort_id = %cohort_id, "User registered");

    Ok(Json(AuthResponse { token, user_id }))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<AuthResponse> {
    let email = normalize_email(&req.email);
    let user = db::users::find_by_email(&state.pool, &email)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::InvalidCredentials))?;

    if !verify_password(&req.password, &user.hashed_password) {
        return Err(ErrorCode::InvalidCredentials.into());
    }

    let token =
        create_token(&user.id, &user.email, &user.cohort_id, &state.jwt_secret).map_err(|e| {
            tracing::error!("JWT creation failed: {e}");
            AppError::new(ErrorCode::InternalError)
        })?;

    Ok(Json(AuthResponse {
        token,
        user_id: user.id,
    }))
}
