//! Materialising recurring templates into concrete tasks.

use std::collections::HashSet;

use chrono::Datelike;
use tracing::debug;

use crate::models::{Frequency, RecurringTask, RecurringTaskId, Task, TaskDraft, TaskStatus};
use crate::week::WeekKey;

/// Month bucket used for monthly templates: (year, month) of a week key.
fn month_of(week: WeekKey) -> (i32, u32) {
    let d = week.date();
    (d.year(), d.month())
}

/// The week an existing instance was generated for. Instances written
/// before `generatedForWeek` existed fall back to their scheduled week.
fn instance_week(task: &Task) -> Option<WeekKey> {
    task.generated_for_week.or(task.week_id)
}

/// Drafts for every active template that has no instance for `target` yet.
///
/// Weekly templates produce at most one task per week, monthly templates at
/// most one per calendar month of the week key. A template with a preferred
/// day lands in that day's bucket of `target`; otherwise it goes to backlog.
pub fn generate(templates: &[RecurringTask], tasks: &[Task], target: WeekKey) -> Vec<TaskDraft> {
    let mut weekly: HashSet<(RecurringTaskId, WeekKey)> = HashSet::new();
    let mut monthly: HashSet<(RecurringTaskId, (i32, u32))> = HashSet::new();
    for task in tasks {
        let (Some(template_id), Some(week)) = (task.recurring_task_id, instance_week(task)) else {
            continue;
        };
        weekly.insert((template_id, week));
        monthly.insert((template_id, month_of(week)));
    }

    let mut drafts = Vec::new();
    for template in templates.iter().filter(|t| t.is_active) {
        let exists = match template.frequency {
            Frequency::Weekly => weekly.contains(&(template.id, target)),
            Frequency::Monthly => monthly.contains(&(template.id, month_of(target))),
        };
        if exists {
            debug!(template = template.id, week = %target, "recurring task already generated");
            continue;
        }
        drafts.push(TaskDraft {
            title: template.title.clone(),
            description: template.description.clone(),
            priority: template.priority,
            status: template
                .preferred_day
                .map(TaskStatus::Day)
                .unwrap_or(TaskStatus::Backlog),
            week_id: template.preferred_day.map(|_| target),
            recurring_task_id: Some(template.id),
            generated_for_week: Some(target),
        });
    }
    drafts
}
