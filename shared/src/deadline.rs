//! Daily cutoff and at-risk evaluation
//!
//! Every cohort day closes at 21:00 in a fixed +05:30 offset. During the
//! last hour before the cutoff a user who has not submitted yet is
//! "at risk". All arithmetic uses an explicit [`FixedOffset`], never the
//! host's local timezone, so every deployment agrees on the cutoff.
//!
//! The evaluation is a snapshot: callers (status endpoint, UI timers)
//! re-run it on their own schedule.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Offset, Utc};
use serde::{Deserialize, Serialize};

/// Cohort timezone offset east of UTC (+05:30)
pub const COHORT_OFFSET_SECS: i32 = 5 * 3600 + 30 * 60;

/// Local hour at which a cohort day closes
pub const CUTOFF_HOUR: u32 = 21;

/// Lookback window before the cutoff in which users are warned
pub const WARNING_WINDOW_MINUTES: i64 = 60;

/// Result of a single at-risk evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AtRiskEvaluation {
    /// Whole minutes until today's cutoff, only inside the warning window
    pub minutes_remaining: Option<i64>,
    /// Not submitted today and inside the warning window
    pub is_at_risk: bool,
}

impl AtRiskEvaluation {
    const SAFE: Self = Self {
        minutes_remaining: None,
        is_at_risk: false,
    };
}

/// The fixed cohort offset
pub fn cohort_offset() -> FixedOffset {
    FixedOffset::east_opt(COHORT_OFFSET_SECS).unwrap_or_else(|| Utc.fix())
}

/// Wall-clock time of `now` in the cohort timezone.
///
/// `None` only for the last hours of `DateTime<Utc>`'s range, where the
/// local date no longer fits in a `NaiveDate`.
pub fn cohort_local(now: DateTime<Utc>) -> Option<NaiveDateTime> {
    now.naive_utc().checked_add_offset(cohort_offset())
}

/// Calendar date of `now` in the cohort timezone, `None` past `NaiveDate::MAX`
pub fn checked_cohort_date(now: DateTime<Utc>) -> Option<NaiveDate> {
    cohort_local(now).map(|local| local.date())
}

/// Calendar date of `now` in the cohort timezone.
///
/// Saturates at `NaiveDate::MAX` for instants whose local date is out of range.
pub fn cohort_date(now: DateTime<Utc>) -> NaiveDate {
    checked_cohort_date(now).unwrap_or(NaiveDate::MAX)
}

/// Instant at which local `time` occurs on cohort day `date`
fn local_instant(date: NaiveDate, time: NaiveTime) -> Option<DateTime<FixedOffset>> {
    let offset = cohort_offset();
    let utc = date.and_time(time).checked_sub_offset(offset)?;
    Some(DateTime::from_naive_utc_and_offset(utc, offset))
}

/// Cutoff instant (21:00 +05:30) of the given cohort day
pub fn cutoff_for(date: NaiveDate) -> Option<DateTime<FixedOffset>> {
    local_instant(date, NaiveTime::from_hms_opt(CUTOFF_HOUR, 0, 0)?)
}

/// Whether today's submission window is still open at `now`
pub fn is_window_open(now: DateTime<Utc>) -> bool {
    checked_cohort_date(now)
        .and_then(cutoff_for)
        .is_some_and(|cutoff| now < cutoff)
}

/// Start of the next cohort day (local midnight), in UTC.
///
/// `None` when that day is beyond chrono's date range.
pub fn next_window_opens_at(now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let next_day = checked_cohort_date(now)?.succ_opt()?;
    local_instant(next_day, NaiveTime::MIN).map(|t| t.with_timezone(&Utc))
}

/// Evaluate at-risk status at `now`.
///
/// `minutes_remaining` is present only when `now` is strictly before the
/// cutoff and at most [`WARNING_WINDOW_MINUTES`] minutes away from it
/// (60 itself included, 0 excluded). Never fails: instants whose cohort
/// day cannot be represented evaluate as not at risk.
pub fn evaluate(now: DateTime<Utc>, has_submitted_today: bool) -> AtRiskEvaluation {
    let Some(cutoff) = checked_cohort_date(now).and_then(cutoff_for) else {
        return AtRiskEvaluation::SAFE;
    };
    // num_minutes truncates toward zero
    let diff = cutoff.signed_duration_since(now).num_minutes();

    let minutes_remaining = if diff <= 0 || diff > WARNING_WINDOW_MINUTES {
        None
    } else {
        Some(diff)
    };

    AtRiskEvaluation {
        minutes_remaining,
        is_at_risk: !has_submitted_today && minutes_remaining.is_some(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, TimeZone, Timelike};

    /// 2025-03-10 21:00 +05:30 == 15:30 UTC
    fn cutoff_utc() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, 15, 30, 0).unwrap()
    }

    #[test]
    fn test_cutoff_for_is_21_local() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let cutoff = cutoff_for(date).unwrap();
        assert_eq!(cutoff.to_rfc3339(), "2025-03-10T21:00:00+05:30");
        assert_eq!(cutoff.with_timezone(&Utc), cutoff_utc());
    }

    #[test]
    fn test_cohort_date_crosses_utc_midnight() {
        // 19:00 UTC is already 00:30 the next day in +05:30
        let now = Utc.with_ymd_and_hms(2025, 3, 10, 19, 0, 0).unwrap();
        assert_eq!(cohort_date(now), NaiveDate::from_ymd_opt(2025, 3, 11).unwrap());

        let now = Utc.with_ymd_and_hms(2025, 3, 10, 18, 29, 59).unwrap();
        assert_eq!(cohort_date(now), NaiveDate::from_ymd_opt(2025, 3, 10).unwrap());
    }

    #[test]
    fn test_thirty_minutes_before_cutoff() {
        let now = cutoff_utc() - TimeDelta::minutes(30);
        let eval = evaluate(now, false);
        assert_eq!(eval.minutes_remaining, Some(30));
        assert!(eval.is_at_risk);
    }

    #[test]
    fn test_sixty_minutes_is_inclusive() {
        let now = cutoff_utc() - TimeDelta::minutes(60);
        assert_eq!(evaluate(now, false).minutes_remaining, Some(60));
    }

    #[test]
    fn test_sixty_one_minutes_is_exclusive() {
        let now = cutoff_utc() - TimeDelta::minutes(61);
        let eval = evaluate(now, false);
        assert_eq!(eval.minutes_remaining, None);
        assert!(!eval.is_at_risk);
    }

    #[test]
    fn test_partial_minute_truncates() {
        // 60m59s before cutoff truncates to 60 and stays inside the window
        let now = cutoff_utc() - TimeDelta::seconds(60 * 60 + 59);
        assert_eq!(evaluate(now, false).minutes_remaining, Some(60));

        // 30s before cutoff truncates to 0 and is excluded
        let now = cutoff_utc() - TimeDelta::seconds(30);
        assert_eq!(evaluate(now, false).minutes_remaining, None);
    }

    #[test]
    fn test_exactly_at_cutoff_excluded() {
        let eval = evaluate(cutoff_utc(), false);
        assert_eq!(eval.minutes_remaining, None);
        assert!(!eval.is_at_risk);
    }

    #[test]
    fn test_after_cutoff_excluded() {
        for minutes in [1, 45, 120, 179] {
            let now = cutoff_utc() + TimeDelta::minutes(minutes);
            assert_eq!(evaluate(now, false).minutes_remaining, None, "+{minutes}m");
        }
    }

    #[test]
    fn test_well_before_cutoff_excluded() {
        for minutes in [61, 90, 6 * 60, 20 * 60] {
            let now = cutoff_utc() - TimeDelta::minutes(minutes);
            assert_eq!(evaluate(now, false).minutes_remaining, None, "-{minutes}m");
        }
    }

    #[test]
    fn test_submitted_user_never_at_risk() {
        let now = cutoff_utc() - TimeDelta::minutes(10);
        let eval = evaluate(now, true);
        assert_eq!(eval.minutes_remaining, Some(10));
        assert!(!eval.is_at_risk);
    }

    #[test]
    fn test_evaluate_is_idempotent() {
        let now = cutoff_utc() - TimeDelta::minutes(42);
        assert_eq!(evaluate(now, false), evaluate(now, false));
        assert_eq!(evaluate(now, true), evaluate(now, true));
    }

    #[test]
    fn test_window_open_until_cutoff() {
        assert!(is_window_open(cutoff_utc() - TimeDelta::seconds(1)));
        assert!(!is_window_open(cutoff_utc()));
        assert!(!is_window_open(cutoff_utc() + TimeDelta::hours(2)));
        // 00:00 local the next day reopens the window
        let next_midnight = Utc.with_ymd_and_hms(2025, 3, 10, 18, 30, 0).unwrap();
        assert!(is_window_open(next_midnight));
    }

    #[test]
    fn test_next_window_opens_at_local_midnight() {
        let now = cutoff_utc() + TimeDelta::minutes(5);
        let opens = next_window_opens_at(now).unwrap();
        assert_eq!(opens, Utc.with_ymd_and_hms(2025, 3, 10, 18, 30, 0).unwrap());
        assert_eq!(
            opens.with_timezone(&cohort_offset()).to_rfc3339(),
            "2025-03-11T00:00:00+05:30"
        );
    }

    #[test]
    fn test_range_edges_never_panic() {
        for now in [DateTime::<Utc>::MAX_UTC, DateTime::<Utc>::MIN_UTC] {
            for submitted in [false, true] {
                let eval = evaluate(now, submitted);
                assert_eq!(eval.minutes_remaining, None);
                assert!(!eval.is_at_risk);
            }
        }
        assert!(!is_window_open(DateTime::<Utc>::MAX_UTC));
        // 05:30 local on the first representable day
        assert!(is_window_open(DateTime::<Utc>::MIN_UTC));
    }

    #[test]
    fn test_max_instant_has_no_cohort_day() {
        let now = DateTime::<Utc>::MAX_UTC;
        assert_eq!(checked_cohort_date(now), None);
        assert_eq!(cohort_date(now), NaiveDate::MAX);
        assert_eq!(next_window_opens_at(now), None);
    }

    #[test]
    fn test_min_instant_window_opens_next_day() {
        let now = DateTime::<Utc>::MIN_UTC;
        let opens = next_window_opens_at(now).unwrap();
        assert!(opens > now);
        assert_eq!(cutoff_for(NaiveDate::MIN).map(|c| c.hour()), Some(21));
    }
}
