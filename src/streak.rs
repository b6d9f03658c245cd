//! Consecutive-day completion streaks.

use std::collections::BTreeSet;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;

use crate::error::{Error, Result};
use crate::models::Task;
use crate::week::{parse_iso_date, WeekPolicy};

/// Streak lengths that earn a celebration, ascending.
pub const MILESTONES: [u32; 7] = [7, 14, 30, 60, 100, 200, 365];

/// Streak summary derived from the set of completion dates.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct StreakState {
    pub current_streak: u32,
    pub longest_streak: u32,
    pub last_completion_date: Option<NaiveDate>,
    pub streak_start_date: Option<NaiveDate>,
}

impl StreakState {
    pub fn is_milestone(&self) -> bool {
        is_milestone(self.current_streak)
    }
}

pub fn is_milestone(streak: u32) -> bool {
    MILESTONES.contains(&streak)
}

/// Smallest milestone strictly above `streak`.
pub fn next_milestone(streak: u32) -> Option<u32> {
    MILESTONES.iter().copied().find(|m| *m > streak)
}

/// Computes the streak from `YYYY-MM-DD` completion dates.
///
/// Duplicates count once. The current streak is alive only when the most
/// recent completion is `today` or the day before.
pub fn calculate_streak<I, S>(dates: I, today: NaiveDate) -> Result<StreakState>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let parsed = dates
        .into_iter()
        .map(|s| {
            let s = s.as_ref();
            parse_iso_date(s).ok_or_else(|| Error::MalformedDate(s.to_string()))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(streak_from_dates(parsed, today))
}

/// Same as [`calculate_streak`] for dates that are already parsed.
pub fn streak_from_dates<I>(dates: I, today: NaiveDate) -> StreakState
where
    I: IntoIterator<Item = NaiveDate>,
{
    let unique: BTreeSet<NaiveDate> = dates.into_iter().collect();
    let sorted: Vec<NaiveDate> = unique.into_iter().rev().collect();
    let Some(&latest) = sorted.first() else {
        return StreakState::default();
    };

    let yesterday = today - Duration::days(1);
    let mut current = 0;
    let mut start = None;
    if latest == today || latest == yesterday {
        current = 1;
        start = Some(latest);
        for pair in sorted.windows(2) {
            if (pair[0] - pair[1]).num_days() != 1 {
                break;
            }
            current += 1;
            start = Some(pair[1]);
        }
    }

    let mut run = 1;
    let mut longest_run = 1;
    for pair in sorted.windows(2) {
        if (pair[0] - pair[1]).num_days() == 1 {
            run += 1;
            longest_run = longest_run.max(run);
        } else {
            run = 1;
        }
    }

    StreakState {
        current_streak: current,
        longest_streak: longest_run.max(current),
        last_completion_date: Some(latest),
        streak_start_date: start,
    }
}

/// Calendar day on which a completion timestamp falls under `policy`.
pub fn completion_date(completed_at: DateTime<Utc>, policy: &WeekPolicy) -> NaiveDate {
    policy.today(completed_at)
}

/// Streak over every completed task, evaluated at `now`.
pub fn streak_from_tasks(tasks: &[Task], now: DateTime<Utc>, policy: &WeekPolicy) -> StreakState {
    let dates = tasks
        .iter()
        .filter(|t| t.is_completed())
        .filter_map(|t| t.completed_at)
        .map(|ts| completion_date(ts, policy));
    streak_from_dates(dates, policy.today(now))
}

/// Whether at least one task was completed on today's date.
pub fn has_completed_today(tasks: &[Task], now: DateTime<Utc>, policy: &WeekPolicy) -> bool {
    let today = policy.today(now);
    tasks
        .iter()
        .filter(|t| t.is_completed())
        .filter_map(|t| t.completed_at)
        .any(|ts| completion_date(ts, policy) == today)
}
