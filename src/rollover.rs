//! Week-boundary rollover.
//!
//! Runs on every board load, so it has to be idempotent: incomplete tasks
//! left in a past week go back to backlog, and a past week that still holds
//! completed tasks gets an archived [`Week`] record if it has none. The
//! current and next week are never touched.

use std::collections::{BTreeSet, HashSet};

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::models::{Task, TaskId, TaskStatus, Week};
use crate::week::{WeekKey, WeekPolicy};

/// Field-level update for one task.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskPatch {
    pub task_id: TaskId,
    pub status: TaskStatus,
    pub week_id: Option<WeekKey>,
}

impl TaskPatch {
    fn to_backlog(task_id: TaskId) -> Self {
        TaskPatch {
            task_id,
            status: TaskStatus::Backlog,
            week_id: None,
        }
    }

    /// Writes the patched fields onto `task`. Applying twice is harmless.
    pub fn apply(&self, task: &mut Task) {
        task.status = self.status;
        task.week_id = self.week_id;
    }
}

/// Everything a rollover decided, ready to be applied in one write.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RolloverPlan {
    /// Incomplete tasks sent back to backlog, in input order.
    pub moved: Vec<TaskId>,
    /// Past weeks that receive a new archived record, ascending.
    pub archived: Vec<WeekKey>,
    pub patches: Vec<TaskPatch>,
    pub inserts: Vec<Week>,
}

impl RolloverPlan {
    pub fn is_empty(&self) -> bool {
        self.moved.is_empty() && self.archived.is_empty()
    }

    /// Applies the patches and inserts to an in-memory snapshot.
    ///
    /// Patches for tasks that no longer exist are skipped, and a week record
    /// is only inserted when no record with the same key is present.
    pub fn apply_to(&self, tasks: &mut [Task], weeks: &mut Vec<Week>) {
        for patch in &self.patches {
            match tasks.iter_mut().find(|t| t.id == patch.task_id) {
                Some(task) => patch.apply(task),
                None => debug!(task_id = patch.task_id, "rollover patch skipped, task is gone"),
            }
        }
        for week in &self.inserts {
            if !weeks.iter().any(|w| w.week_id == week.week_id) {
                weeks.push(week.clone());
            }
        }
    }
}

/// True when `week` lies strictly before the current week and is neither
/// the current nor the next one.
fn is_past_week(week: WeekKey, current: WeekKey) -> bool {
    let next = current.next();
    week != current && week != next && week < current
}

/// Decides which tasks leave past weeks and which past weeks get archived.
pub fn rollover(
    now: DateTime<Utc>,
    tasks: &[Task],
    weeks: &[Week],
    policy: &WeekPolicy,
) -> RolloverPlan {
    let current = policy.current_week_key(now);
    let mut plan = RolloverPlan::default();

    for task in tasks {
        let Some(week) = task.week_id else { continue };
        if !is_past_week(week, current) || task.is_completed() {
            continue;
        }
        plan.moved.push(task.id);
        plan.patches.push(TaskPatch::to_backlog(task.id));
    }

    let known: HashSet<WeekKey> = weeks.iter().map(|w| w.week_id).collect();
    let orphaned: BTreeSet<WeekKey> = tasks
        .iter()
        .filter(|t| t.is_completed())
        .filter_map(|t| t.week_id)
        .filter(|week| is_past_week(*week, current))
        .filter(|week| !known.contains(week))
        .collect();
    for week in orphaned {
        plan.archived.push(week);
        plan.inserts.push(Week::archived(week, now));
    }

    if plan.is_empty() {
        debug!(%current, "rollover found nothing to do");
    } else {
        info!(
            %current,
            moved = plan.moved.len(),
            archived = plan.archived.len(),
            "rollover planned"
        );
    }
    plan
}
