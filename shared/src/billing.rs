//! Subscription status and access entitlement
//!
//! Stripe is the source of truth for subscription state; webhooks mirror it
//! into the `subscriptions` table. A [`SubscriptionSnapshot`] is rebuilt from
//! that row on every request and never mutated.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Subscription status as reported by Stripe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    /// Paid and current
    Active,
    /// In a free trial
    Trialing,
    /// Renewal charge failed, Stripe is retrying
    PastDue,
    /// Terminated
    Canceled,
    /// First payment not completed yet
    Incomplete,
    /// First payment never completed
    IncompleteExpired,
    /// Retries exhausted
    Unpaid,
    /// Paused by the customer
    Paused,
}

impl SubscriptionStatus {
    /// Parse from database / Stripe string value (lowercase)
    pub fn from_db(s: &str) -> Option<Self> {
        match s {
            "active" => Some(Self::Active),
            "trialing" => Some(Self::Trialing),
            "past_due" => Some(Self::PastDue),
            "canceled" => Some(Self::Canceled),
            "incomplete" => Some(Self::Incomplete),
            "incomplete_expired" => Some(Self::IncompleteExpired),
            "unpaid" => Some(Self::Unpaid),
            "paused" => Some(Self::Paused),
            _ => None,
        }
    }

    /// Database string representation (lowercase)
    pub fn as_db(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Trialing => "trialing",
            Self::PastDue => "past_due",
            Self::Canceled => "canceled",
            Self::Incomplete => "incomplete",
            Self::IncompleteExpired => "incomplete_expired",
            Self::Unpaid => "unpaid",
            Self::Paused => "paused",
        }
    }

    /// Statuses that grant access while the period is current
    pub fn is_entitling(&self) -> bool {
        matches!(self, Self::Active | Self::Trialing)
    }
}

/// Read-only view of a user's billing state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionSnapshot {
    pub status: SubscriptionStatus,
    pub current_period_end: DateTime<Utc>,
}

impl SubscriptionSnapshot {
    /// Build from a stored row.
    ///
    /// Returns `None` for an unknown status string or a missing / out of
    /// range period end, which callers treat as "no subscription".
    pub fn from_db(status: &str, current_period_end_ms: Option<i64>) -> Option<Self> {
        let status = SubscriptionStatus::from_db(status)?;
        let current_period_end = DateTime::from_timestamp_millis(current_period_end_ms?)?;
        Some(Self {
            status,
            current_period_end,
        })
    }
}

/// Stored subscription mirror row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct SubscriptionRow {
    /// Stripe subscription id
    pub id: String,
    pub user_id: String,
    pub status: String,
    /// Unix millis
    pub current_period_end: Option<i64>,
    pub cancel_at_period_end: bool,
    /// When the last webhook touched the row, Unix millis
    pub updated_at: i64,
}

impl SubscriptionRow {
    pub fn snapshot(&self) -> Option<SubscriptionSnapshot> {
        SubscriptionSnapshot::from_db(&self.status, self.current_period_end)
    }
}

/// The row that represents a user's billing state at `now`.
///
/// Webhooks for an old subscription can arrive after a newer one exists, so
/// recency of `updated_at` alone is not enough. Preference order: entitling
/// at `now`, entitling status, latest period end, latest update.
pub fn current_subscription(
    rows: &[SubscriptionRow],
    now: DateTime<Utc>,
) -> Option<&SubscriptionRow> {
    rows.iter().max_by_key(|row| {
        let snapshot = row.snapshot();
        (
            is_active(snapshot.as_ref(), now),
            snapshot.is_some_and(|s| s.status.is_entitling()),
            row.current_period_end,
            row.updated_at,
        )
    })
}

/// Whether `snapshot` entitles the user to access at `now`.
///
/// An elapsed period end always yields `false`, whatever the stored status
/// says: a missed `customer.subscription.deleted` webhook must not leave
/// access open.
pub fn is_active(snapshot: Option<&SubscriptionSnapshot>, now: DateTime<Utc>) -> bool {
    match snapshot {
        Some(s) => s.status.is_entitling() && s.current_period_end > now,
        None => false,
    }
}
