//! Task and template lifecycle on a loaded [`Database`].
//!
//! Every operation keeps the status invariants: backlog tasks carry no week,
//! day and completed tasks always do, and only completed tasks carry a
//! completion time.

use chrono::{DateTime, Utc};
use tracing::info;

use crate::error::{Error, Result};
use crate::models::{
    Frequency, Priority, RecurringTask, RecurringTaskId, Task, TaskDraft, TaskId, TaskStatus,
};
use crate::recurring;
use crate::rollover::{rollover, RolloverPlan};
use crate::storage::Database;
use crate::week::{DayOfWeek, WeekKey, WeekPolicy};

fn clean_title(title: &str) -> Result<String> {
    let title = title.trim();
    if title.is_empty() {
        return Err(Error::InvalidTitle);
    }
    Ok(title.to_string())
}

impl Database {
    pub fn task(&self, id: TaskId) -> Result<&Task> {
        self.tasks
            .iter()
            .find(|t| t.id == id)
            .ok_or(Error::TaskNotFound(id))
    }

    fn task_mut(&mut self, id: TaskId) -> Result<&mut Task> {
        self.tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(Error::TaskNotFound(id))
    }

    fn insert_draft(&mut self, draft: TaskDraft, now: DateTime<Utc>) -> TaskId {
        let id = self.allocate_task_id();
        self.tasks.push(draft.into_task(id, now));
        id
    }

    /// Creates a task in backlog, or in `day` of the current week.
    pub fn add_task(
        &mut self,
        title: &str,
        description: Option<String>,
        priority: Priority,
        day: Option<DayOfWeek>,
        now: DateTime<Utc>,
        policy: &WeekPolicy,
    ) -> Result<TaskId> {
        let draft = TaskDraft {
            title: clean_title(title)?,
            description,
            priority,
            status: day.map(TaskStatus::Day).unwrap_or(TaskStatus::Backlog),
            week_id: day.map(|_| policy.current_week_key(now)),
            recurring_task_id: None,
            generated_for_week: None,
        };
        let id = self.insert_draft(draft, now);
        info!(task_id = id, "task created");
        Ok(id)
    }

    /// Places a task on `day` of `week`. A completed task is reopened.
    pub fn schedule_task(&mut self, id: TaskId, week: WeekKey, day: DayOfWeek) -> Result<()> {
        let task = self.task_mut(id)?;
        task.status = TaskStatus::Day(day);
        task.week_id = Some(week);
        task.completed_at = None;
        Ok(())
    }

    /// Sends a task back to backlog.
    pub fn unschedule_task(&mut self, id: TaskId) -> Result<()> {
        let task = self.task_mut(id)?;
        task.status = TaskStatus::Backlog;
        task.week_id = None;
        task.completed_at = None;
        Ok(())
    }

    /// Marks a task completed in the current week. Backlog tasks may be
    /// completed directly.
    pub fn complete_task(&mut self, id: TaskId, now: DateTime<Utc>, policy: &WeekPolicy) -> Result<()> {
        let week = policy.current_week_key(now);
        let task = self.task_mut(id)?;
        task.status = TaskStatus::Completed;
        task.completed_at = Some(now);
        task.week_id = Some(week);
        info!(task_id = id, %week, "task completed");
        Ok(())
    }

    /// Moves a completed task back to `day` of the current week, or to
    /// backlog when no day is given.
    pub fn reopen_task(
        &mut self,
        id: TaskId,
        day: Option<DayOfWeek>,
        now: DateTime<Utc>,
        policy: &WeekPolicy,
    ) -> Result<()> {
        if !self.task(id)?.is_completed() {
            return Err(Error::InvalidTransition(format!("task {id} is not completed")));
        }
        match day {
            Some(day) => self.schedule_task(id, policy.current_week_key(now), day),
            None => self.unschedule_task(id),
        }
    }

    /// Moves a task to any bucket of the current week, the way dropping a
    /// card on a board column does.
    pub fn update_status(
        &mut self,
        id: TaskId,
        status: TaskStatus,
        now: DateTime<Utc>,
        policy: &WeekPolicy,
    ) -> Result<()> {
        match status {
            TaskStatus::Backlog => self.unschedule_task(id),
            TaskStatus::Completed => self.complete_task(id, now, policy),
            TaskStatus::Day(day) => self.schedule_task(id, policy.current_week_key(now), day),
        }
    }

    pub fn edit_task(
        &mut self,
        id: TaskId,
        title: Option<String>,
        description: Option<String>,
        priority: Option<Priority>,
    ) -> Result<()> {
        let title = title.as_deref().map(clean_title).transpose()?;
        let task = self.task_mut(id)?;
        if let Some(t) = title {
            task.title = t;
        }
        if let Some(d) = description {
            task.description = if d.trim().is_empty() { None } else { Some(d) };
        }
        if let Some(p) = priority {
            task.priority = p;
        }
        Ok(())
    }

    /// Deletes a task and drops it from any week's commitment list.
    pub fn remove_task(&mut self, id: TaskId) -> Result<Task> {
        let pos = self
            .tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or(Error::TaskNotFound(id))?;
        for week in self.weeks.iter_mut() {
            week.commitment_task_ids.retain(|t| *t != id);
        }
        Ok(self.tasks.remove(pos))
    }

    pub fn recurring(&self, id: RecurringTaskId) -> Result<&RecurringTask> {
        self.recurring_tasks
            .iter()
            .find(|t| t.id == id)
            .ok_or(Error::RecurringTaskNotFound(id))
    }

    pub fn add_recurring(
        &mut self,
        title: &str,
        description: Option<String>,
        priority: Priority,
        frequency: Frequency,
        preferred_day: Option<DayOfWeek>,
        now: DateTime<Utc>,
    ) -> Result<RecurringTaskId> {
        let title = clean_title(title)?;
        let id = self.allocate_recurring_id();
        self.recurring_tasks.push(RecurringTask {
            id,
            title,
            description,
            priority,
            frequency,
            preferred_day,
            is_active: true,
            created_at: now,
        });
        Ok(id)
    }

    /// Flips a template between active and inactive, returning the new state.
    pub fn toggle_recurring(&mut self, id: RecurringTaskId) -> Result<bool> {
        let template = self
            .recurring_tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(Error::RecurringTaskNotFound(id))?;
        template.is_active = !template.is_active;
        Ok(template.is_active)
    }

    /// Deletes a template. Tasks it generated keep their back-reference.
    pub fn remove_recurring(&mut self, id: RecurringTaskId) -> Result<RecurringTask> {
        let pos = self
            .recurring_tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or(Error::RecurringTaskNotFound(id))?;
        Ok(self.recurring_tasks.remove(pos))
    }

    /// Generates this week's instances of every active template and returns
    /// the new task ids. Running it again in the same week adds nothing.
    pub fn generate_recurring(&mut self, now: DateTime<Utc>, policy: &WeekPolicy) -> Vec<TaskId> {
        let week = policy.current_week_key(now);
        let drafts = recurring::generate(&self.recurring_tasks, &self.tasks, week);
        let ids: Vec<TaskId> = drafts
            .into_iter()
            .map(|draft| self.insert_draft(draft, now))
            .collect();
        if !ids.is_empty() {
            info!(%week, generated = ids.len(), "recurring tasks generated");
        }
        ids
    }

    /// Plans a rollover for `now` and applies it to this snapshot.
    pub fn run_rollover(&mut self, now: DateTime<Utc>, policy: &WeekPolicy) -> RolloverPlan {
        let plan = rollover(now, &self.tasks, &self.weeks, policy);
        plan.apply_to(&mut self.tasks, &mut self.weeks);
        plan
    }
}
