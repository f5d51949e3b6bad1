//! Stripe webhook handler
//!
//! POST /stripe/webhook: raw body for signature verification. Stripe is the
//! source of truth; these handlers only mirror subscription state locally.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use serde_json::Value;
use shared::billing::SubscriptionStatus;

use crate::state::AppState;
use crate::{db, stripe};

/// Handle incoming Stripe webhook events
pub async fn handle_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    let Some(sig_header) = headers
        .get("stripe-signature")
        .and_then(|v| v.to_str().ok())
    else {
        tracing::warn!("Missing Stripe-Signature header");
        return StatusCode::BAD_REQUEST;
    };

    let now = state.now();
    if let Err(e) = stripe::verify_webhook_signature(
        &body,
        sig_header,
        &state.stripe.webhook_secret,
        now.timestamp(),
    ) {
        tracing::warn!(error = e, "Webhook signature verification failed");
        return StatusCode::BAD_REQUEST;
    }

    let event: Value = match serde_json::from_slice(&body) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(%e, "Failed to parse webhook JSON");
            return StatusCode::BAD_REQUEST;
        }
    };

    let event_type = event["type"].as_str().unwrap_or("");
    let Some(event_id) = event["id"].as_str() else {
        tracing::warn!("Webhook event missing id");
        return StatusCode::BAD_REQUEST;
    };
    tracing::info!(event_id, event_type, "Received Stripe webhook");

    let now_ms = now.timestamp_millis();
    match db::webhook_events::record(&state.pool, event_id, event_type, now_ms).await {
        Ok(false) => {
            tracing::info!(event_id, "Duplicate webhook event, skipping");
            return StatusCode::OK;
        }
        Ok(true) => {}
        Err(e) => {
            tracing::error!(%e, "DB error recording webhook event");
            return StatusCode::INTERNAL_SERVER_ERROR;
        }
    }

    let Some(obj) = event.get("data").and_then(|d| d.get("object")) else {
        return StatusCode::OK;
    };

    let result = match event_type {
        "checkout.session.completed" => handle_checkout_completed(&state, obj, now_ms).await,
        "customer.subscription.created" | "customer.subscription.updated" => {
            handle_subscription_changed(&state, obj, None, now_ms).await
        }
        "customer.subscription.deleted" => {
            handle_subscription_changed(&state, obj, Some(SubscriptionStatus::Canceled), now_ms)
                .await
        }
        "invoice.paid" => handle_invoice_paid(&state, obj, now_ms).await,
        "invoice.payment_failed" => handle_payment_failed(&state, obj, now_ms).await,
        _ => {
            tracing::debug!(event_type, "Unhandled webhook event type");
            Ok(())
        }
    };

    match result {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::error!(%e, event_id, event_type, "Failed to apply webhook event");
            // Let Stripe's retry through the idempotency check
            if let Err(e) = db::webhook_events::forget(&state.pool, event_id).await {
                tracing::error!(%e, event_id, "Failed to release webhook event");
            }
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// Owner of a Stripe object: `metadata.user_id` first, then the customer
async fn resolve_user(state: &AppState, obj: &Value) -> Result<Option<String>, sqlx::Error> {
    if let Some(user_id) = obj
        .get("metadata")
        .and_then(|m| m["user_id"].as_str())
        .filter(|s| !s.is_empty())
    {
        return Ok(Some(user_id.to_string()));
    }
    match obj["customer"].as_str() {
        Some(customer_id) => Ok(db::users::find_by_stripe_customer(&state.pool, customer_id)
            .await?
            .map(|u| u.id)),
        None => Ok(None),
    }
}

/// checkout.session.completed → link customer, seed the subscription row
async fn handle_checkout_completed(
    state: &AppState,
    obj: &Value,
    now: i64,
) -> Result<(), sqlx::Error> {
    let Some(subscription_id) = obj["subscription"].as_str() else {
        tracing::warn!("checkout.session.completed missing subscription");
        return Ok(());
    };

    let Some(user_id) = resolve_user(state, obj).await? else {
        tracing::warn!(subscription_id, "No user for checkout session");
        return Ok(());
    };

    if let Some(customer_id) = obj["customer"].as_str()
        && let Some(user) = db::users::find_by_id(&state.pool, &user_id).await?
        && user.stripe_customer_id.is_none()
    {
        db::users::set_stripe_customer(&state.pool, &user_id, customer_id).await?;
    }

    let status = if obj["payment_status"].as_str() == Some("paid") {
        SubscriptionStatus::Active
    } else {
        SubscriptionStatus::Incomplete
    };

    let sub = db::subscriptions::UpsertSubscription {
        id: subscription_id,
        user_id: &user_id,
        status: status.as_db(),
        // Set by subscription / invoice events
        current_period_end: None,
        cancel_at_period_end: false,
        now,
    };
    // customer.subscription.* may already have arrived with the real state
    if !db::subscriptions::insert_if_absent(&state.pool, &sub).await? {
        tracing::debug!(subscription_id, "Subscription already mirrored, checkout ignored");
    }

    tracing::info!(user_id = %user_id, subscription_id, "Checkout completed");
    Ok(())
}

/// customer.subscription.* → mirror status, period end and cancellation flag
async fn handle_subscription_changed(
    state: &AppState,
    obj: &Value,
    forced_status: Option<SubscriptionStatus>,
    now: i64,
) -> Result<(), sqlx::Error> {
    let Some(sub_id) = obj["id"].as_str() else {
        return Ok(());
    };

    let status = match forced_status {
        Some(s) => s.as_db(),
        None => obj["status"].as_str().unwrap_or("incomplete"),
    };
    if SubscriptionStatus::from_db(status).is_none() {
        tracing::warn!(subscription_id = sub_id, status, "Unknown subscription status");
    }

    let user_id = match db::subscriptions::find_user_by_sub_id(&state.pool, sub_id).await? {
        Some(id) => Some(id),
        None => resolve_user(state, obj).await?,
    };
    let Some(user_id) = user_id else {
        tracing::warn!(subscription_id = sub_id, "No user for subscription");
        return Ok(());
    };

    let sub = db::subscriptions::UpsertSubscription {
        id: sub_id,
        user_id: &user_id,
        status,
        current_period_end: subscription_period_end(obj).map(|s| s * 1000),
        cancel_at_period_end: obj["cancel_at_period_end"].as_bool().unwrap_or(false),
        now,
    };
    db::subscriptions::upsert(&state.pool, &sub).await?;

    tracing::info!(
        user_id = %user_id,
        subscription_id = sub_id,
        status,
        "Subscription updated"
    );
    Ok(())
}

/// invoice.paid → extend current_period_end
async fn handle_invoice_paid(state: &AppState, obj: &Value, now: i64) -> Result<(), sqlx::Error> {
    let Some(sub_id) = invoice_subscription_id(obj) else {
        return Ok(());
    };

    if let Some(period_end) = invoice_period_end(obj) {
        // Stripe uses seconds
        db::subscriptions::update_period_end(&state.pool, sub_id, period_end * 1000, now).await?;
    }

    tracing::info!(subscription_id = sub_id, "Invoice paid, period updated");
    Ok(())
}

/// invoice.payment_failed → past_due
async fn handle_payment_failed(
    state: &AppState,
    obj: &Value,
    now: i64,
) -> Result<(), sqlx::Error> {
    let Some(sub_id) = invoice_subscription_id(obj) else {
        return Ok(());
    };

    db::subscriptions::update_status(
        &state.pool,
        sub_id,
        SubscriptionStatus::PastDue.as_db(),
        now,
    )
    .await?;

    tracing::info!(subscription_id = sub_id, "Invoice payment failed, subscription past_due");
    Ok(())
}

/// Period end (seconds) of a subscription object.
///
/// Newer API versions moved it from the subscription onto its items.
fn subscription_period_end(obj: &Value) -> Option<i64> {
    obj["current_period_end"].as_i64().or_else(|| {
        obj.get("items")
            .and_then(|i| i.get("data"))
            .and_then(|d| d.as_array())
            .and_then(|a| a.first())
            .and_then(|item| item["current_period_end"].as_i64())
    })
}

/// Subscription id of an invoice, old and new payload shapes
fn invoice_subscription_id(obj: &Value) -> Option<&str> {
    obj["subscription"].as_str().or_else(|| {
        obj.get("parent")
            .and_then(|p| p.get("subscription_details"))
            .and_then(|d| d["subscription"].as_str())
    })
}

/// Period end (seconds) of an invoice's first line
fn invoice_period_end(obj: &Value) -> Option<i64> {
    obj.get("lines")
        .and_then(|l| l.get("data"))
        .and_then(|d| d.as_array())
        .and_then(|a| a.first())
        .and_then(|line| line.get("period"))
        .and_then(|p| p["end"].as_i64())
}
