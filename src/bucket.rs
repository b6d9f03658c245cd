//! Partitioning tasks into the nine board buckets.

use crate::models::{Task, TaskStatus};
use crate::week::{DayOfWeek, FirstDay, WeekKey};

/// Tasks grouped by bucket, each bucket ordered by priority.
///
/// Status strings are parsed into [`TaskStatus`] when a task is loaded, and
/// an unknown status fails there with `UnknownTaskStatus`. Every task that
/// reaches a `Board` therefore has exactly one bucket.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Board {
    backlog: Vec<Task>,
    /// Indexed Sunday first.
    days: [Vec<Task>; 7],
    completed: Vec<Task>,
}

impl Board {
    pub fn get(&self, status: TaskStatus) -> &[Task] {
        match status {
            TaskStatus::Backlog => &self.backlog,
            TaskStatus::Day(day) => &self.days[day_index(day)],
            TaskStatus::Completed => &self.completed,
        }
    }

    pub fn day(&self, day: DayOfWeek) -> &[Task] {
        self.get(TaskStatus::Day(day))
    }

    pub fn backlog(&self) -> &[Task] {
        &self.backlog
    }

    pub fn completed(&self) -> &[Task] {
        &self.completed
    }

    /// Total number of tasks across all buckets.
    pub fn len(&self) -> usize {
        self.backlog.len() + self.days.iter().map(Vec::len).sum::<usize>() + self.completed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Buckets in board column order: backlog, the seven days starting at
    /// `first_day`, completed.
    pub fn columns(&self, first_day: FirstDay) -> Vec<(TaskStatus, &[Task])> {
        let mut columns = Vec::with_capacity(9);
        columns.push((TaskStatus::Backlog, self.backlog.as_slice()));
        for day in day_order(first_day) {
            columns.push((TaskStatus::Day(day), self.day(day)));
        }
        columns.push((TaskStatus::Completed, self.completed.as_slice()));
        columns
    }

    fn bucket_mut(&mut self, status: TaskStatus) -> &mut Vec<Task> {
        match status {
            TaskStatus::Backlog => &mut self.backlog,
            TaskStatus::Day(day) => &mut self.days[day_index(day)],
            TaskStatus::Completed => &mut self.completed,
        }
    }
}

fn day_index(day: DayOfWeek) -> usize {
    day.weekday().num_days_from_sunday() as usize
}

/// The seven days in column order for `first_day`.
pub fn day_order(first_day: FirstDay) -> [DayOfWeek; 7] {
    let mut days = DayOfWeek::ALL;
    if first_day == FirstDay::Monday {
        days.rotate_left(1);
    }
    days
}

/// Places each task in the bucket named by its status, then sorts every
/// bucket by priority. The sort is stable, so tasks of equal priority keep
/// their input order.
pub fn bucket<I>(tasks: I) -> Board
where
    I: IntoIterator<Item = Task>,
{
    let mut board = Board::default();
    for task in tasks {
        board.bucket_mut(task.status).push(task);
    }
    board.backlog.sort_by_key(|t| t.priority.rank());
    for day in board.days.iter_mut() {
        day.sort_by_key(|t| t.priority.rank());
    }
    board.completed.sort_by_key(|t| t.priority.rank());
    board
}

/// The board for one week: every backlog task plus the tasks scheduled in
/// or completed during `week`.
pub fn board_for_week(tasks: &[Task], week: WeekKey) -> Board {
    bucket(
        tasks
            .iter()
            .filter(|t| t.status == TaskStatus::Backlog || t.week_id == Some(week))
            .cloned(),
    )
}
