//! Stripe integration via REST API (no SDK dependency)

use hmac::{Hmac, Mac};
use sha2::Sha256;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

const STRIPE_API: &str = "https://api.stripe.com/v1";

/// Maximum age (seconds) of a signed webhook before it is treated as a replay
pub const WEBHOOK_TOLERANCE_SECS: i64 = 300;

/// Create a Stripe Customer
pub async fn create_customer(
    secret_key: &str,
    email: &str,
    user_id: &str,
) -> Result<String, BoxError> {
    let client = reqwest::Client::new();
    let resp: serde_json::Value = client
        .post(format!("{STRIPE_API}/customers"))
        .basic_auth(secret_key, None::<&str>)
        .form(&[("email", email), ("metadata[user_id]", user_id)])
        .send()
        .await?
        .json()
        .await?;

    resp["id"]
        .as_str()
        .map(String::from)
        .ok_or_else(|| format!("Stripe create_customer failed: {resp}").into())
}

/// Create a Stripe Checkout Session (subscription mode)
///
/// The user id travels both on the session and on the subscription it
/// creates, so later subscription events can be attributed without a
/// customer lookup.
pub async fn create_checkout_session(
    secret_key: &str,
    customer_id: &str,
    price_id: &str,
    user_id: &str,
    success_url: &str,
    cancel_url: &str,
) -> Result<String, BoxError> {
    let client = reqwest::Client::new();
    let resp: serde_json::Value = client
        .post(format!("{STRIPE_API}/checkout/sessions"))
        .basic_auth(secret_key, None::<&str>)
        .form(&[
            ("customer", customer_id),
            ("mode", "subscription"),
            ("line_items[0][price]", price_id),
            ("line_items[0][quantity]", "1"),
            ("success_url", success_url),
            ("cancel_url", cancel_url),
            ("metadata[user_id]", user_id),
            ("subscription_data[metadata][user_id]", user_id),
        ])
        .send()
        .await?
        .json()
        .await?;

    resp["url"]
        .as_str()
        .map(String::from)
        .ok_or_else(|| format!("Stripe create_checkout failed: {resp}").into())
}

/// Create a Stripe Billing Portal session
pub async fn create_billing_portal_session(
    secret_key: &str,
    customer_id: &str,
    return_url: &str,
) -> Result<String, BoxError> {
    let client = reqwest::Client::new();
    let resp: serde_json::Value = client
        .post(format!("{STRIPE_API}/billing_portal/sessions"))
        .basic_auth(secret_key, None::<&str>)
        .form(&[("customer", customer_id), ("return_url", return_url)])
        .send()
        .await?
        .json()
        .await?;

    resp["url"]
        .as_str()
        .map(String::from)
        .ok_or_else(|| format!("Stripe billing portal failed: {resp}").into())
}

/// Verify a `Stripe-Signature` header (HMAC-SHA256 over `"{t}.{payload}"`).
///
/// Any `v1=` entry may match; Stripe sends several while a secret rolls.
pub fn verify_webhook_signature(
    payload: &[u8],
    sig_header: &str,
    secret: &str,
    now_secs: i64,
) -> Result<(), &'static str> {
    let mut timestamp = "";
    let mut signatures = Vec::new();
    for part in sig_header.split(',') {
        let part = part.trim();
        if let Some(t) = part.strip_prefix("t=") {
            timestamp = t;
        } else if let Some(v) = part.strip_prefix("v1=") {
            signatures.push(v);
        }
    }

    if timestamp.is_empty() || signatures.is_empty() {
        return Err("Invalid Stripe-Signature header");
    }

    let ts: i64 = timestamp.parse().map_err(|_| "Invalid timestamp")?;
    if (now_secs - ts).abs() > WEBHOOK_TOLERANCE_SECS {
        return Err("Webhook timestamp outside tolerance");
    }

    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).map_err(|_| "HMAC key error")?;
    mac.update(timestamp.as_bytes());
    mac.update(b".");
    mac.update(payload);

    let matched = signatures.iter().any(|sig| {
        hex::decode(sig).is_ok_and(|bytes| mac.clone().verify_slice(&bytes).is_ok())
    });
    if !matched {
        return Err("Webhook signature mismatch");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "whsec_test";
    const NOW: i64 = 1_741_600_000;

    fn sign(payload: &[u8], ts: i64, secret: &str) -> String {
        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(format!("{ts}.").as_bytes());
        mac.update(payload);
        hex::encode(mac.finalize().into_bytes())
    }

    #[test]
    fn test_valid_signature() {
        let payload = br#"{"id":"evt_1","type":"invoice.paid"}"#;
        let header = format!("t={NOW},v1={}", sign(payload, NOW, SECRET));
        assert!(verify_webhook_signature(payload, &header, SECRET, NOW).is_ok());
    }

    #[test]
    fn test_any_v1_entry_may_match() {
        let payload = b"{}";
        let header = format!(
            "t={NOW},v1={},v1={}",
            sign(payload, NOW, "whsec_old"),
            sign(payload, NOW, SECRET)
        );
        assert!(verify_webhook_signature(payload, &header, SECRET, NOW).is_ok());
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let header = format!("t={NOW},v1={}", sign(b"{\"a\":1}", NOW, SECRET));
        assert_eq!(
            verify_webhook_signature(b"{\"a\":2}", &header, SECRET, NOW),
            Err("Webhook signature mismatch")
        );
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let payload = b"{}";
        let header = format!("t={NOW},v1={}", sign(payload, NOW, "whsec_other"));
        assert!(verify_webhook_signature(payload, &header, SECRET, NOW).is_err());
    }

    #[test]
    fn test_stale_timestamp_rejected() {
        let payload = b"{}";
        let ts = NOW - WEBHOOK_TOLERANCE_SECS - 1;
        let header = format!("t={ts},v1={}", sign(payload, ts, SECRET));
        assert_eq!(
            verify_webhook_signature(payload, &header, SECRET, NOW),
            Err("Webhook timestamp outside tolerance")
        );

        // Right at the edge is still accepted
        let ts = NOW - WEBHOOK_TOLERANCE_SECS;
        let header = format!("t={ts},v1={}", sign(payload, ts, SECRET));
        assert!(verify_webhook_signature(payload, &header, SECRET, NOW).is_ok());
    }

    #[test]
    fn test_malformed_header_rejected() {
        for header in ["", "t=123", "v1=abcd", "t=abc,v1=00", "t=1741600000,v1=zz"] {
            assert!(
                verify_webhook_signature(b"{}", header, SECRET, NOW).is_err(),
                "{header}"
            );
        }
    }
}
