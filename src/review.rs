//! Weekly review: summaries, commitments, review gates and the daily digest.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::bucket::bucket;
use crate::error::{Error, Result};
use crate::models::{Task, TaskId, TaskStatus, UserSettings, Week};
use crate::streak::streak_from_tasks;
use crate::week::{DayOfWeek, WeekKey, WeekPolicy};

/// Number of completed tasks listed in a weekly summary.
const SUMMARY_COMPLETED_LIMIT: usize = 10;

/// Rounded percentage, 0 when `total` is 0.
pub fn percent(part: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    ((part as f64 / total as f64) * 100.0).round() as u32
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CommitmentProgress {
    pub completed: usize,
    pub total: usize,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WeeklySummary {
    pub week_id: WeekKey,
    pub total_tasks: usize,
    pub completed_tasks: usize,
    pub completion_rate: u32,
    pub commitment_tasks: usize,
    pub completed_commitments: usize,
    pub commitment_rate: u32,
    pub week_theme: Option<String>,
    pub completed_tasks_list: Vec<Task>,
    pub pending_commitments: Vec<Task>,
}

pub fn weekly_summary(tasks: &[Task], weeks: &[Week], week: WeekKey) -> WeeklySummary {
    let week_tasks: Vec<&Task> = tasks.iter().filter(|t| t.week_id == Some(week)).collect();
    let completed: Vec<&Task> = week_tasks.iter().copied().filter(|t| t.is_completed()).collect();
    let commitments: Vec<&Task> = week_tasks
        .iter()
        .copied()
        .filter(|t| t.is_commitment_for(week))
        .collect();
    let completed_commitments = commitments.iter().filter(|t| t.is_completed()).count();

    WeeklySummary {
        week_id: week,
        total_tasks: week_tasks.len(),
        completed_tasks: completed.len(),
        completion_rate: percent(completed.len(), week_tasks.len()),
        commitment_tasks: commitments.len(),
        completed_commitments,
        commitment_rate: percent(completed_commitments, commitments.len()),
        week_theme: weeks
            .iter()
            .find(|w| w.week_id == week)
            .and_then(|w| w.week_theme.clone()),
        completed_tasks_list: completed
            .iter()
            .take(SUMMARY_COMPLETED_LIMIT)
            .map(|t| (*t).clone())
            .collect(),
        pending_commitments: commitments
            .iter()
            .filter(|t| !t.is_completed())
            .map(|t| (*t).clone())
            .collect(),
    }
}

/// Completed versus total commitments scheduled in `week`.
pub fn commitment_progress(tasks: &[Task], week: WeekKey) -> CommitmentProgress {
    let commitments = tasks
        .iter()
        .filter(|t| t.week_id == Some(week) && t.is_commitment_for(week));
    let (completed, total) = commitments.fold((0, 0), |(done, total), t| {
        (done + usize::from(t.is_completed()), total + 1)
    });
    CommitmentProgress { completed, total }
}

/// Flags `task_ids` as the commitments of `week` and records them, with the
/// optional theme, on the week's record (creating it if needed).
///
/// Every id is checked before anything changes. Tasks committed to `week`
/// earlier but missing from `task_ids` lose their commitment flag.
pub fn set_week_commitments(
    tasks: &mut [Task],
    weeks: &mut Vec<Week>,
    week: WeekKey,
    task_ids: &[TaskId],
    theme: Option<String>,
    now: DateTime<Utc>,
) -> Result<usize> {
    if let Some(missing) = task_ids.iter().find(|id| !tasks.iter().any(|t| t.id == **id)) {
        return Err(Error::TaskNotFound(*missing));
    }
    for task in tasks.iter_mut() {
        if task_ids.contains(&task.id) {
            task.is_commitment = true;
            task.commitment_week_id = Some(week);
        } else if task.commitment_week_id == Some(week) {
            task.is_commitment = false;
            task.commitment_week_id = None;
        }
    }

    let record = match weeks.iter().position(|w| w.week_id == week) {
        Some(i) => &mut weeks[i],
        None => {
            weeks.push(Week::new(week, now));
            let last = weeks.len() - 1;
            &mut weeks[last]
        }
    };
    record.commitment_task_ids = task_ids.to_vec();
    record.week_theme = theme;
    Ok(task_ids.len())
}

/// Weekly review is offered on the weekend, once per week.
pub fn should_show_weekly_review(now: DateTime<Utc>, policy: &WeekPolicy, settings: &UserSettings) -> bool {
    let day = policy.day_of_week(now);
    if day != DayOfWeek::Saturday && day != DayOfWeek::Sunday {
        return false;
    }
    settings.last_week_review_week_id != Some(policy.current_week_key(now))
}

/// Backlog review is offered once at the start of every new week.
pub fn should_show_backlog_review(now: DateTime<Utc>, policy: &WeekPolicy, settings: &UserSettings) -> bool {
    settings.last_backlog_review_week_id != Some(policy.current_week_key(now))
}

/// Records a finished weekly review and stores the reflection on the week's
/// record when that record exists.
pub fn mark_week_reviewed(
    settings: &mut UserSettings,
    weeks: &mut [Week],
    week: WeekKey,
    reflection_note: Option<String>,
    now: DateTime<Utc>,
) {
    settings.last_week_review_week_id = Some(week);
    settings.touch(now);
    if let Some(note) = reflection_note {
        if let Some(record) = weeks.iter_mut().find(|w| w.week_id == week) {
            record.reflection_note = Some(note);
            record.review_completed_at = Some(now);
        }
    }
}

pub fn mark_backlog_reviewed(settings: &mut UserSettings, now: DateTime<Utc>, policy: &WeekPolicy) {
    settings.last_backlog_review_week_id = Some(policy.current_week_key(now));
    settings.touch(now);
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StreakSummary {
    pub current_streak: u32,
}

/// Data an outbound notifier needs for the morning message.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct DailyDigest {
    pub day: DayOfWeek,
    pub tasks: Vec<Task>,
    pub streak: StreakSummary,
    pub commitments: CommitmentProgress,
}

/// Today's bucket of the current week, priority ordered, with the streak
/// and commitment counters.
pub fn daily_digest(tasks: &[Task], now: DateTime<Utc>, policy: &WeekPolicy) -> DailyDigest {
    let week = policy.current_week_key(now);
    let day = policy.day_of_week(now);
    let board = bucket(
        tasks
            .iter()
            .filter(|t| t.week_id == Some(week) && t.status == TaskStatus::Day(day))
            .cloned(),
    );
    DailyDigest {
        day,
        tasks: board.day(day).to_vec(),
        streak: StreakSummary {
            current_streak: streak_from_tasks(tasks, now, policy).current_streak,
        },
        commitments: commitment_progress(tasks, week),
    }
}
