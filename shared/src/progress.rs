//! Streaks and cohort leaderboard
//!
//! Pure functions over submission dates (cohort days, +05:30). The server
//! loads one row per (member, submission day) and ranks in memory.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// One cohort member joined with one of their submission days.
///
/// Members without any submission appear once with `cohort_date = None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct CohortSubmissionRow {
    pub user_id: String,
    pub display_name: String,
    pub cohort_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    /// 1-based competition rank, ties share a rank
    pub rank: u32,
    pub user_id: String,
    pub display_name: String,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub total_submissions: u32,
}

/// Caller's own standing in the cohort
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressSummary {
    pub total_submissions: u32,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub rank: u32,
    pub cohort_size: u32,
}

/// Consecutive submission days ending today.
///
/// Today's missing submission does not break the streak yet: counting then
/// starts from yesterday.
pub fn current_streak(dates: &[NaiveDate], today: NaiveDate) -> u32 {
    let days: BTreeSet<NaiveDate> = dates.iter().copied().collect();

    let start = if days.contains(&today) {
        Some(today)
    } else {
        today.pred_opt().filter(|d| days.contains(d))
    };

    let mut count = 0;
    let mut cursor = start;
    while let Some(day) = cursor {
        if !days.contains(&day) {
            break;
        }
        count += 1;
        cursor = day.pred_opt();
    }
    count
}

/// Longest run of consecutive submission days ever
pub fn longest_streak(dates: &[NaiveDate]) -> u32 {
    let days: BTreeSet<NaiveDate> = dates.iter().copied().collect();

    let mut longest = 0;
    let mut run = 0;
    let mut prev: Option<NaiveDate> = None;
    for day in days {
        run = match prev.and_then(|p| p.succ_opt()) {
            Some(expected) if expected == day => run + 1,
            _ => 1,
        };
        longest = longest.max(run);
        prev = Some(day);
    }
    longest
}

/// Rank every cohort member.
///
/// Order: current streak desc, total desc, display name asc. Members tied
/// on streak and total share a rank.
pub fn build_leaderboard(rows: &[CohortSubmissionRow], today: NaiveDate) -> Vec<LeaderboardEntry> {
    let mut members: BTreeMap<&str, (&str, Vec<NaiveDate>)> = BTreeMap::new();
    for row in rows {
        let entry = members
            .entry(row.user_id.as_str())
            .or_insert_with(|| (row.display_name.as_str(), Vec::new()));
        if let Some(date) = row.cohort_date {
            entry.1.push(date);
        }
    }

    let mut entries: Vec<LeaderboardEntry> = members
        .into_iter()
        .map(|(user_id, (display_name, dates))| {
            let unique: BTreeSet<NaiveDate> = dates.iter().copied().collect();
            LeaderboardEntry {
                rank: 0,
                user_id: user_id.to_string(),
                display_name: display_name.to_string(),
                current_streak: current_streak(&dates, today),
                longest_streak: longest_streak(&dates),
                total_submissions: unique.len() as u32,
            }
        })
        .collect();

    entries.sort_by(|a, b| {
        b.current_streak
            .cmp(&a.current_streak)
            .then(b.total_submissions.cmp(&a.total_submissions))
            .then_with(|| a.display_name.cmp(&b.display_name))
    });

    let mut prev: Option<(u32, u32, u32)> = None;
    for (idx, entry) in entries.iter_mut().enumerate() {
        let key = (entry.current_streak, entry.total_submissions);
        entry.rank = match prev {
            Some((streak, total, rank)) if (streak, total) == key => rank,
            _ => idx as u32 + 1,
        };
        prev = Some((key.0, key.1, entry.rank));
    }

    entries
}

impl ProgressSummary {
    /// Extract `user_id`'s standing from a full leaderboard
    pub fn for_user(leaderboard: &[LeaderboardEntry], user_id: &str) -> Option<Self> {
        leaderboard
            .iter()
            .find(|e| e.user_id == user_id)
            .map(|e| Self {
                total_submissions: e.total_submissions,
                current_streak: e.current_streak,
                longest_streak: e.longest_streak,
                rank: e.rank,
                cohort_size: leaderboard.len() as u32,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, day).unwrap()
    }

    fn row(user: &str, name: &str, day: Option<u32>) -> CohortSubmissionRow {
        CohortSubmissionRow {
            user_id: user.to_string(),
            display_name: name.to_string(),
            cohort_date: day.map(d),
        }
    }

    #[test]
    fn test_current_streak_including_today() {
        assert_eq!(current_streak(&[d(8), d(9), d(10)], d(10)), 3);
    }

    #[test]
    fn test_current_streak_today_pending() {
        // Nothing yet today, streak still counts through yesterday
        assert_eq!(current_streak(&[d(7), d(8), d(9)], d(10)), 3);
    }

    #[test]
    fn test_current_streak_broken() {
        assert_eq!(current_streak(&[d(5), d(6), d(8)], d(10)), 0);
        assert_eq!(current_streak(&[], d(10)), 0);
    }

    #[test]
    fn test_current_streak_gap() {
        assert_eq!(current_streak(&[d(5), d(6), d(8), d(9), d(10)], d(10)), 3);
    }

    #[test]
    fn test_current_streak_ignores_duplicates_and_order() {
        assert_eq!(current_streak(&[d(10), d(9), d(9), d(8)], d(10)), 3);
    }

    #[test]
    fn test_longest_streak() {
        assert_eq!(longest_streak(&[]), 0);
        assert_eq!(longest_streak(&[d(1)]), 1);
        assert_eq!(longest_streak(&[d(1), d(2), d(4), d(5), d(6), d(9)]), 3);
    }

    #[test]
    fn test_longest_streak_across_month_boundary() {
        let feb_end = NaiveDate::from_ymd_opt(2025, 2, 28).unwrap();
        assert_eq!(longest_streak(&[feb_end, d(1), d(2)]), 3);
    }

    #[test]
    fn test_leaderboard_ordering_and_ties() {
        let rows = vec![
            row("u1", "Asha", Some(9)),
            row("u1", "Asha", Some(10)),
            row("u2", "Ben", Some(9)),
            row("u2", "Ben", Some(10)),
            row("u3", "Chen", Some(10)),
            row("u4", "Dev", None),
        ];
        let board = build_leaderboard(&rows, d(10));

        let order: Vec<&str> = board.iter().map(|e| e.user_id.as_str()).collect();
        assert_eq!(order, ["u1", "u2", "u3", "u4"]);

        let ranks: Vec<u32> = board.iter().map(|e| e.rank).collect();
        assert_eq!(ranks, [1, 1, 3, 4]);

        assert_eq!(board[3].total_submissions, 0);
        assert_eq!(board[3].current_streak, 0);
    }

    #[test]
    fn test_leaderboard_total_breaks_streak_tie() {
        let rows = vec![
            row("u1", "Asha", Some(10)),
            row("u2", "Ben", Some(1)),
            row("u2", "Ben", Some(10)),
        ];
        let board = build_leaderboard(&rows, d(10));
        assert_eq!(board[0].user_id, "u2");
        assert_eq!(board[0].rank, 1);
        assert_eq!(board[1].rank, 2);
    }

    #[test]
    fn test_progress_summary_for_user() {
        let rows = vec![
            row("u1", "Asha", Some(9)),
            row("u1", "Asha", Some(10)),
            row("u2", "Ben", Some(10)),
        ];
        let board = build_leaderboard(&rows, d(10));

        let summary = ProgressSummary::for_user(&board, "u2").unwrap();
        assert_eq!(summary.total_submissions, 1);
        assert_eq!(summary.current_streak, 1);
        assert_eq!(summary.rank, 2);
        assert_eq!(summary.cohort_size, 2);

        assert!(ProgressSummary::for_user(&board, "missing").is_none());
    }
}
