//! Archived weeks and per-week completion statistics.

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::{Task, Week};
use crate::review::percent;
use crate::week::WeekKey;

pub const ARCHIVE_LIMIT: usize = 20;
pub const STATS_LIMIT: usize = 8;

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ArchivedWeek {
    #[serde(flatten)]
    pub week: Week,
    pub completed_tasks: Vec<Task>,
    pub completed_count: usize,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WeekStats {
    pub week_id: WeekKey,
    pub start_date: NaiveDate,
    pub completed_count: usize,
    pub total_count: usize,
    pub completion_rate: u32,
}

fn completed_in(tasks: &[Task], week: WeekKey) -> Vec<Task> {
    tasks
        .iter()
        .filter(|t| t.week_id == Some(week) && t.is_completed())
        .cloned()
        .collect()
}

/// Archived weeks, newest first.
fn newest_archived(weeks: &[Week], limit: usize) -> Vec<&Week> {
    let mut archived: Vec<&Week> = weeks.iter().filter(|w| w.is_archived).collect();
    archived.sort_by(|a, b| b.week_id.cmp(&a.week_id));
    archived.truncate(limit);
    archived
}

/// Up to `limit` archived weeks with the tasks completed in each.
pub fn archived_weeks(tasks: &[Task], weeks: &[Week], limit: usize) -> Vec<ArchivedWeek> {
    newest_archived(weeks, limit)
        .into_iter()
        .map(|w| {
            let completed_tasks = completed_in(tasks, w.week_id);
            ArchivedWeek {
                week: w.clone(),
                completed_count: completed_tasks.len(),
                completed_tasks,
            }
        })
        .collect()
}

/// One week's record and completed tasks, if the week has a record.
pub fn week_history(tasks: &[Task], weeks: &[Week], week: WeekKey) -> Option<ArchivedWeek> {
    let record = weeks.iter().find(|w| w.week_id == week)?;
    let completed_tasks = completed_in(tasks, week);
    Some(ArchivedWeek {
        week: record.clone(),
        completed_count: completed_tasks.len(),
        completed_tasks,
    })
}

/// Completion counts for the `limit` most recent archived weeks.
///
/// Tasks that rolled back to backlog no longer carry the week key, so the
/// total only counts what is still attached to the week.
pub fn completion_stats(tasks: &[Task], weeks: &[Week], limit: usize) -> Vec<WeekStats> {
    newest_archived(weeks, limit)
        .into_iter()
        .map(|w| {
            let total_count = tasks.iter().filter(|t| t.week_id == Some(w.week_id)).count();
            let completed_count = completed_in(tasks, w.week_id).len();
            WeekStats {
                week_id: w.week_id,
                start_date: w.start_date,
                completed_count,
                total_count,
                completion_rate: percent(completed_count, total_count),
            }
        })
        .collect()
}
