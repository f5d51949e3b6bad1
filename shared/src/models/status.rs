//! Daily status and billing views returned by the API

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// `GET /api/me/status`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyStatus {
    pub cohort_date: NaiveDate,
    pub has_submitted_today: bool,
    pub minutes_remaining: Option<i64>,
    pub is_at_risk: bool,
    pub subscription_active: bool,
    pub reminder_due: bool,
}

/// `GET /api/billing/subscription`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionView {
    /// Raw stored status, `None` when the user never subscribed
    pub status: Option<String>,
    pub current_period_end: Option<i64>,
    pub cancel_at_period_end: bool,
    pub active: bool,
}
