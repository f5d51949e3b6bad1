//! Billing endpoints: subscription view, Stripe checkout, billing portal

use axum::{Extension, Json, extract::State};
use chrono::{DateTime, Utc};
use shared::billing::{SubscriptionSnapshot, current_subscription, is_active};
use shared::error::{AppError, ErrorCode};
use shared::models::SubscriptionView;

use crate::auth::UserIdentity;
use crate::db;
use crate::error::ServiceResult;
use crate::state::AppState;

use super::ApiResult;

/// Entitlement snapshot of the subscription that represents the user at `now`.
///
/// Unknown statuses and missing period ends read as "no subscription".
pub(crate) async fn load_snapshot(
    state: &AppState,
    user_id: &str,
    now: DateTime<Utc>,
) -> ServiceResult<Option<SubscriptionSnapshot>> {
    let rows = db::subscriptions::list_for_user(&state.pool, user_id).await?;
    Ok(current_subscription(&rows, now).and_then(|r| {
        let snapshot = r.snapshot();
        if snapshot.is_none() {
            tracing::warn!(
                subscription_id = %r.id,
                status = %r.status,
                "Subscription row not usable for entitlement"
            );
        }
        snapshot
    }))
}

/// GET /api/billing/subscription
pub async fn get_subscription(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
) -> ApiResult<SubscriptionView> {
    let now = state.now();
    let rows = db::subscriptions::list_for_user(&state.pool, &identity.user_id).await?;

    let view = match current_subscription(&rows, now) {
        Some(r) => SubscriptionView {
            active: is_active(r.snapshot().as_ref(), now),
            status: Some(r.status.clone()),
            current_period_end: r.current_period_end,
            cancel_at_period_end: r.cancel_at_period_end,
        },
        None => SubscriptionView {
            status: None,
            current_period_end: None,
            cancel_at_period_end: false,
            active: false,
        },
    };

    Ok(Json(view))
}

/// POST /api/billing/checkout
pub async fn create_checkout(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
) -> ApiResult<serde_json::Value> {
    let user = db::users::find_by_id(&state.pool, &identity.user_id)
        .await?
        .ok_or(ErrorCode::UserNotFound)?;

    let now = state.now();
    let snapshot = load_snapshot(&state, &user.id, now).await?;
    if is_active(snapshot.as_ref(), now) {
        return Err(ErrorCode::SubscriptionAlreadyActive.into());
    }

    // Create or reuse Stripe customer
    let customer_id = if let Some(cid) = user.stripe_customer_id.clone() {
        cid
    } else {
        let cid = crate::stripe::create_customer(&state.stripe.secret_key, &user.email, &user.id)
            .await
            .map_err(|e| {
                tracing::error!(%e, "Failed to create Stripe customer");
                AppError::new(ErrorCode::PaymentSetupFailed)
            })?;
        db::users::set_stripe_customer(&state.pool, &user.id, &cid).await?;
        cid
    };

    let success_url = format!("{}/billing/success", state.app_base_url);
    let cancel_url = format!("{}/billing", state.app_base_url);
    let checkout_url = crate::stripe::create_checkout_session(
        &state.stripe.secret_key,
        &customer_id,
        &state.stripe.price_id,
        &user.id,
        &success_url,
        &cancel_url,
    )
    .await
    .map_err(|e| {
        tracing::error!(%e, "Failed to create Stripe checkout");
        AppError::new(ErrorCode::PaymentSetupFailed)
    })?;

    tracing::info!(user_id = %user.id, "Checkout session created");

    Ok(Json(serde_json::json!({
        "checkout_url": checkout_url,
    })))
}

/// POST /api/billing/portal
pub async fn billing_portal(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
) -> ApiResult<serde_json::Value> {
    let user = db::users::find_by_id(&state.pool, &identity.user_id)
        .await?
        .ok_or(ErrorCode::UserNotFound)?;

    let customer_id = user
        .stripe_customer_id
        .as_deref()
        .ok_or(ErrorCode::BillingAccountMissing)?;

    let return_url = format!("{}/billing", state.app_base_url);
    let url = crate::stripe::create_billing_portal_session(
        &state.stripe.secret_key,
        customer_id,
        &return_url,
    )
    .await
    .map_err(|e| {
        tracing::error!("Billing portal error: {e}");
        AppError::new(ErrorCode::PaymentSetupFailed)
    })?;

    Ok(Json(serde_json::json!({ "url": url })))
}
