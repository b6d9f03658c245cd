use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::week::{DayOfWeek, WeekKey};

pub type TaskId = u64;
pub type RecurringTaskId = u64;

/// Task priority. Boards list `high` first.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    /// Sort rank within a bucket: `high` < `medium` < `low`.
    pub fn rank(&self) -> u8 {
        match self {
            Priority::High => 0,
            Priority::Medium => 1,
            Priority::Low => 2,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            _ => Err(Error::UnknownPriority(s.to_string())),
        }
    }
}

/// The board bucket a task sits in. Exactly one at a time.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub enum TaskStatus {
    Backlog,
    Day(DayOfWeek),
    Completed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Backlog => "backlog",
            TaskStatus::Day(day) => day.as_str(),
            TaskStatus::Completed => "completed",
        }
    }

    pub fn day(&self) -> Option<DayOfWeek> {
        match self {
            TaskStatus::Day(day) => Some(*day),
            _ => None,
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "backlog" => Ok(TaskStatus::Backlog),
            "completed" => Ok(TaskStatus::Completed),
            _ => s
                .parse::<DayOfWeek>()
                .map(TaskStatus::Day)
                .map_err(|_| Error::UnknownTaskStatus(s.to_string())),
        }
    }
}

impl TryFrom<String> for TaskStatus {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<TaskStatus> for String {
    fn from(status: TaskStatus) -> String {
        status.as_str().to_string()
    }
}

/// One unit of work on the board.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Identifier assigned by the store.
    pub id: TaskId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub priority: Priority,
    pub status: TaskStatus,
    /// Week the task is scheduled in (or was completed in). Absent in backlog.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub week_id: Option<WeekKey>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub is_commitment: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commitment_week_id: Option<WeekKey>,
    /// Template that generated this task. Lookup only, not ownership.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurring_task_id: Option<RecurringTaskId>,
    /// Week a recurring instance was generated for, kept even when the
    /// instance sits in backlog.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_for_week: Option<WeekKey>,
}

impl Task {
    pub fn is_completed(&self) -> bool {
        self.status == TaskStatus::Completed
    }

    pub fn is_commitment_for(&self, week: WeekKey) -> bool {
        self.is_commitment && self.commitment_week_id == Some(week)
    }
}

/// Fields of a task that does not have a store id yet.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskDraft {
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
    pub status: TaskStatus,
    pub week_id: Option<WeekKey>,
    pub recurring_task_id: Option<RecurringTaskId>,
    pub generated_for_week: Option<WeekKey>,
}

impl TaskDraft {
    pub fn into_task(self, id: TaskId, created_at: DateTime<Utc>) -> Task {
        Task {
            id,
            title: self.title,
            description: self.description,
            priority: self.priority,
            status: self.status,
            week_id: self.week_id,
            completed_at: None,
            created_at,
            is_commitment: false,
            commitment_week_id: None,
            recurring_task_id: self.recurring_task_id,
            generated_for_week: self.generated_for_week,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    #[default]
    Weekly,
    Monthly,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Frequency {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "weekly" => Ok(Frequency::Weekly),
            "monthly" => Ok(Frequency::Monthly),
            _ => Err(Error::UnknownFrequency(s.to_string())),
        }
    }
}

/// Template for a task that is materialised again every week or month.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RecurringTask {
    pub id: RecurringTaskId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub priority: Priority,
    pub frequency: Frequency,
    /// Generated instances go straight into this day's bucket when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_day: Option<DayOfWeek>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Record of a calendar week, created by a review or by rollover.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Week {
    pub week_id: WeekKey,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub is_archived: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub commitment_task_ids: Vec<TaskId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub week_theme: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reflection_note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_completed_at: Option<DateTime<Utc>>,
}

impl Week {
    pub fn new(week_id: WeekKey, created_at: DateTime<Utc>) -> Week {
        Week {
            week_id,
            start_date: week_id.date(),
            end_date: week_id.end_date(),
            is_archived: false,
            created_at,
            commitment_task_ids: Vec::new(),
            week_theme: None,
            reflection_note: None,
            review_completed_at: None,
        }
    }

    pub fn archived(week_id: WeekKey, created_at: DateTime<Utc>) -> Week {
        Week {
            is_archived: true,
            ..Week::new(week_id, created_at)
        }
    }
}

/// Per-owner review bookkeeping.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct UserSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_backlog_review_week_id: Option<WeekKey>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_week_review_week_id: Option<WeekKey>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl UserSettings {
    pub fn touch(&mut self, now: DateTime<Utc>) {
        if self.created_at.is_none() {
            self.created_at = Some(now);
        }
        self.updated_at = Some(now);
    }
}
