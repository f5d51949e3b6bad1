//! Notification preferences and quiet hours

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::deadline::{AtRiskEvaluation, cohort_local};
use crate::error::{AppError, ErrorCode};

const QUIET_HOURS_FORMAT: &str = "%H:%M";

/// Per-user notification settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct NotificationPreferences {
    #[serde(default = "default_true")]
    pub email_enabled: bool,
    #[serde(default = "default_true")]
    pub push_enabled: bool,
    /// Deadline reminders while at risk
    #[serde(default = "default_true")]
    pub reminder_enabled: bool,
    /// "HH:MM" in cohort local time
    #[serde(default)]
    pub quiet_hours_start: Option<String>,
    /// "HH:MM" in cohort local time, exclusive
    #[serde(default)]
    pub quiet_hours_end: Option<String>,
}

fn default_true() -> bool {
    true
}

impl Default for NotificationPreferences {
    fn default() -> Self {
        Self {
            email_enabled: true,
            push_enabled: true,
            reminder_enabled: true,
            quiet_hours_start: None,
            quiet_hours_end: None,
        }
    }
}

fn parse_hhmm(field: &'static str, value: &str) -> Result<NaiveTime, AppError> {
    // chrono accepts single-digit hours for %H, insist on the canonical form
    if value.len() != 5 {
        return Err(invalid_quiet_hours(field, "expected HH:MM"));
    }
    NaiveTime::parse_from_str(value, QUIET_HOURS_FORMAT)
        .map_err(|_| invalid_quiet_hours(field, "expected HH:MM"))
}

fn invalid_quiet_hours(field: &'static str, reason: &str) -> AppError {
    AppError::new(ErrorCode::InvalidQuietHours)
        .with_detail("field", field)
        .with_detail("reason", reason)
}

impl NotificationPreferences {
    /// Check quiet hours: both or neither set, well-formed, non-empty window
    pub fn validate(&self) -> Result<(), AppError> {
        self.quiet_window().map(|_| ())
    }

    /// Parsed quiet window, `None` when quiet hours are disabled
    pub fn quiet_window(&self) -> Result<Option<(NaiveTime, NaiveTime)>, AppError> {
        match (&self.quiet_hours_start, &self.quiet_hours_end) {
            (None, None) => Ok(None),
            (Some(_), None) => Err(invalid_quiet_hours(
                "quiet_hours_end",
                "start and end must be set together",
            )),
            (None, Some(_)) => Err(invalid_quiet_hours(
                "quiet_hours_start",
                "start and end must be set together",
            )),
            (Some(start), Some(end)) => {
                let start = parse_hhmm("quiet_hours_start", start)?;
                let end = parse_hhmm("quiet_hours_end", end)?;
                if start == end {
                    return Err(invalid_quiet_hours(
                        "quiet_hours_end",
                        "start and end must differ",
                    ));
                }
                Ok(Some((start, end)))
            }
        }
    }

    /// Whether `local` falls inside quiet hours.
    ///
    /// The window is `[start, end)` and wraps past midnight when
    /// `start > end`. Malformed stored values count as "not quiet".
    pub fn is_quiet_at(&self, local: NaiveTime) -> bool {
        match self.quiet_window() {
            Ok(Some((start, end))) if start < end => local >= start && local < end,
            Ok(Some((start, end))) => local >= start || local < end,
            _ => false,
        }
    }

    /// Any delivery channel turned on
    pub fn has_channel(&self) -> bool {
        self.email_enabled || self.push_enabled
    }
}

/// Whether a deadline reminder should go out at `now`
pub fn reminder_due(
    prefs: &NotificationPreferences,
    evaluation: &AtRiskEvaluation,
    now: DateTime<Utc>,
) -> bool {
    if !prefs.reminder_enabled || !prefs.has_channel() || !evaluation.is_at_risk {
        return false;
    }
    cohort_local(now).is_some_and(|local| !prefs.is_quiet_at(local.time()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn quiet(start: &str, end: &str) -> NotificationPreferences {
        NotificationPreferences {
            quiet_hours_start: Some(start.to_string()),
            quiet_hours_end: Some(end.to_string()),
            ..Default::default()
        }
    }

    fn at_risk() -> AtRiskEvaluation {
        AtRiskEvaluation {
            minutes_remaining: Some(20),
            is_at_risk: true,
        }
    }

    #[test]
    fn test_defaults_are_valid() {
        let prefs = NotificationPreferences::default();
        assert!(prefs.validate().is_ok());
        assert!(prefs.reminder_enabled);
        assert!(!prefs.is_quiet_at(t(3, 0)));
    }

    #[test]
    fn test_validate_requires_both_ends() {
        let prefs = NotificationPreferences {
            quiet_hours_start: Some("22:00".to_string()),
            ..Default::default()
        };
        let err = prefs.validate().unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidQuietHours);
        assert_eq!(
            err.details.unwrap().get("field").unwrap(),
            "quiet_hours_end"
        );
    }

    #[test]
    fn test_validate_rejects_bad_format() {
        for bad in ["7:00", "24:00", "12:60", "noon", "12:00:00", ""] {
            let err = quiet(bad, "08:00").validate().unwrap_err();
            assert_eq!(err.code, ErrorCode::InvalidQuietHours, "{bad}");
        }
    }

    #[test]
    fn test_validate_rejects_empty_window() {
        assert!(quiet("22:00", "22:00").validate().is_err());
    }

    #[test]
    fn test_same_day_window() {
        let prefs = quiet("13:00", "15:30");
        assert!(prefs.validate().is_ok());
        assert!(!prefs.is_quiet_at(t(12, 59)));
        assert!(prefs.is_quiet_at(t(13, 0)));
        assert!(prefs.is_quiet_at(t(15, 29)));
        assert!(!prefs.is_quiet_at(t(15, 30)));
    }

    #[test]
    fn test_window_wrapping_midnight() {
        let prefs = quiet("22:00", "07:00");
        assert!(prefs.is_quiet_at(t(23, 15)));
        assert!(prefs.is_quiet_at(t(0, 0)));
        assert!(prefs.is_quiet_at(t(6, 59)));
        assert!(!prefs.is_quiet_at(t(7, 0)));
        assert!(!prefs.is_quiet_at(t(21, 59)));
    }

    #[test]
    fn test_reminder_due_outside_quiet_hours() {
        // 20:30 local (+05:30) == 15:00 UTC
        let now = Utc.with_ymd_and_hms(2025, 3, 10, 15, 0, 0).unwrap();
        assert!(reminder_due(&NotificationPreferences::default(), &at_risk(), now));
        assert!(!reminder_due(&quiet("20:00", "21:00"), &at_risk(), now));
    }

    #[test]
    fn test_reminder_not_due_when_disabled_or_safe() {
        let now = Utc.with_ymd_and_hms(2025, 3, 10, 15, 0, 0).unwrap();

        let disabled = NotificationPreferences {
            reminder_enabled: false,
            ..Default::default()
        };
        assert!(!reminder_due(&disabled, &at_risk(), now));

        let no_channel = NotificationPreferences {
            email_enabled: false,
            push_enabled: false,
            ..Default::default()
        };
        assert!(!reminder_due(&no_channel, &at_risk(), now));

        let safe = AtRiskEvaluation {
            minutes_remaining: Some(20),
            is_at_risk: false,
        };
        assert!(!reminder_due(&NotificationPreferences::default(), &safe, now));
    }

    #[test]
    fn test_reminder_at_range_edge() {
        let now = DateTime::<Utc>::MAX_UTC;
        assert!(!reminder_due(&NotificationPreferences::default(), &at_risk(), now));
    }

    #[test]
    fn test_deserialize_partial_body_uses_defaults() {
        let prefs: NotificationPreferences =
            serde_json::from_str(r#"{"push_enabled":false}"#).unwrap();
        assert!(prefs.email_enabled);
        assert!(!prefs.push_enabled);
        assert!(prefs.quiet_hours_start.is_none());
    }
}
