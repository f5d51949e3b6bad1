//! Grading worker authentication (static bearer token)

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use shared::error::AppError;

use super::user_auth::bearer_token;
use crate::state::AppState;

type HmacSha256 = Hmac<Sha256>;

const TOKEN_COMPARE_KEY: &[u8] = b"grader-token-compare";

/// Constant-time token comparison (HMAC both sides, verify_slice)
///
/// An empty token on either side never matches.
fn tokens_match(presented: &str, expected: &str) -> bool {
    if presented.is_empty() || expected.is_empty() {
        return false;
    }
    let Ok(mut expected_mac) = HmacSha256::new_from_slice(TOKEN_COMPARE_KEY) else {
        return false;
    };
    expected_mac.update(expected.as_bytes());
    let expected_tag = expected_mac.finalize().into_bytes();

    let Ok(mut presented_mac) = HmacSha256::new_from_slice(TOKEN_COMPARE_KEY) else {
        return false;
    };
    presented_mac.update(presented.as_bytes());
    presented_mac.verify_slice(&expected_tag).is_ok()
}

/// Middleware admitting only the grading worker
pub async fn grader_auth_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, Response> {
    let token = bearer_token(&request).map_err(IntoResponse::into_response)?;

    if !tokens_match(token, &state.grader_token) {
        tracing::warn!("Rejected grader request with invalid token");
        return Err(AppError::permission_denied("Grader token required").into_response());
    }

    Ok(next.run(request).await)
}
