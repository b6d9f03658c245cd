use chrono::{DateTime, Utc};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};

use crate::bucket::board_for_week;
use crate::error::{Error, Result};
use crate::history::{archived_weeks, completion_stats, week_history, ArchivedWeek, ARCHIVE_LIMIT, STATS_LIMIT};
use crate::models::{Frequency, Priority, Task, TaskId, TaskStatus};
use crate::review::{
    commitment_progress, daily_digest, mark_backlog_reviewed, mark_week_reviewed, set_week_commitments,
    should_show_backlog_review, should_show_weekly_review, weekly_summary,
};
use crate::storage::{Database, Store};
use crate::streak::{has_completed_today, next_milestone, streak_from_tasks};
use crate::week::{day_labels_for_week, week_range_label, DayOfWeek, WeekKey, WeekPolicy};

/// Everything a command needs: where the board lives, the calendar policy
/// and the instant the command runs at.
#[derive(Debug, Clone)]
pub struct Context {
    pub store: Store,
    pub policy: WeekPolicy,
    pub now: DateTime<Utc>,
}

impl Context {
    pub fn new(store: Store, policy: WeekPolicy, now: DateTime<Utc>) -> Self {
        Context { store, policy, now }
    }

    fn current_week(&self) -> WeekKey {
        self.policy.current_week_key(self.now)
    }

    /// Loads the board, applies `f` and saves the result.
    fn update<T>(&self, f: impl FnOnce(&mut Database) -> Result<T>) -> Result<T> {
        let mut db = self.store.load()?;
        let out = f(&mut db)?;
        self.store.save(&db)?;
        Ok(out)
    }
}

/// Which week a `schedule` command targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeekChoice {
    Current,
    Next,
    Key(WeekKey),
}

impl WeekChoice {
    fn resolve(&self, current: WeekKey) -> WeekKey {
        match self {
            WeekChoice::Current => current,
            WeekChoice::Next => current.next(),
            WeekChoice::Key(key) => *key,
        }
    }
}

fn priority_color(p: Priority) -> Color {
    match p {
        Priority::High => Color::Red,
        Priority::Medium => Color::Yellow,
        Priority::Low => Color::Green,
    }
}

fn header(names: &[&str]) -> Vec<Cell> {
    names
        .iter()
        .map(|n| Cell::new(n).add_attribute(Attribute::Bold))
        .collect()
}

/// Adds a task to backlog, or to `day` of the current week.
pub fn cmd_add(
    ctx: &Context,
    title: String,
    description: Option<String>,
    priority: Priority,
    day: Option<DayOfWeek>,
    silent: bool,
) -> Result<TaskId> {
    let id = ctx.update(|db| db.add_task(&title, description, priority, day, ctx.now, &ctx.policy))?;
    if !silent {
        println!("Task added (id = {})", id);
    }
    Ok(id)
}

/// Schedules a task on a day of the current, next or a given week.
pub fn cmd_schedule(ctx: &Context, id: TaskId, day: DayOfWeek, week: WeekChoice, silent: bool) -> Result<()> {
    let key = week.resolve(ctx.current_week());
    ctx.update(|db| db.schedule_task(id, key, day))?;
    if !silent {
        println!("Task {} scheduled for {} ({}).", id, day.title(), key.date_of(day));
    }
    Ok(())
}

/// Sends a task back to backlog.
pub fn cmd_unschedule(ctx: &Context, id: TaskId, silent: bool) -> Result<()> {
    ctx.update(|db| db.unschedule_task(id))?;
    if !silent {
        println!("Task {} moved to backlog.", id);
    }
    Ok(())
}

/// Marks a task complete and reports streak milestones.
pub fn cmd_complete(ctx: &Context, id: TaskId, silent: bool) -> Result<()> {
    let streak = ctx.update(|db| {
        db.complete_task(id, ctx.now, &ctx.policy)?;
        Ok(streak_from_tasks(&db.tasks, ctx.now, &ctx.policy))
    })?;
    if !silent {
        println!("Task {} marked as complete.", id);
        if streak.is_milestone() {
            println!("{} day streak reached!", streak.current_streak);
        }
    }
    Ok(())
}

/// Moves a completed task back onto a day of the current week, or to backlog.
pub fn cmd_reopen(ctx: &Context, id: TaskId, day: Option<DayOfWeek>, silent: bool) -> Result<()> {
    ctx.update(|db| db.reopen_task(id, day, ctx.now, &ctx.policy))?;
    if !silent {
        println!("Task {} reopened.", id);
    }
    Ok(())
}

/// Changes a task's title, description or priority.
pub fn cmd_edit(
    ctx: &Context,
    id: TaskId,
    title: Option<String>,
    description: Option<String>,
    priority: Option<Priority>,
    silent: bool,
) -> Result<()> {
    ctx.update(|db| db.edit_task(id, title, description, priority))?;
    if !silent {
        println!("Task {} updated.", id);
    }
    Ok(())
}

/// Deletes a task.
pub fn cmd_remove(ctx: &Context, id: TaskId, silent: bool) -> Result<()> {
    ctx.update(|db| db.remove_task(id))?;
    if !silent {
        println!("Task {} removed.", id);
    }
    Ok(())
}

/// Rolls over past weeks, then prints the board of `week`.
pub fn cmd_board(ctx: &Context, week: WeekChoice, silent: bool) -> Result<()> {
    let key = week.resolve(ctx.current_week());
    let db = ctx.update(|db| {
        db.run_rollover(ctx.now, &ctx.policy);
        Ok(db.clone())
    })?;
    if silent {
        return Ok(());
    }

    let board = board_for_week(&db.tasks, key);
    let (start, end) = week_range_label(key);
    println!("Week of {} ({} - {})", key, start, end);

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header(&["Column", "ID", "Title", "Priority", "Commit"]));

    let labels = day_labels_for_week(key);
    for (status, tasks) in board.columns(ctx.policy.first_day) {
        let column = match status {
            TaskStatus::Day(day) => {
                let date = labels
                    .iter()
                    .find(|(d, _)| *d == day)
                    .map(|(_, label)| label.as_str())
                    .unwrap_or_default();
                format!("{} {}", day.title(), date)
            }
            other => other.as_str().to_string(),
        };
        if tasks.is_empty() {
            table.add_row(vec![
                Cell::new(&column).fg(Color::DarkGrey),
                Cell::new(""),
                Cell::new("-"),
                Cell::new(""),
                Cell::new(""),
            ]);
            continue;
        }
        for (i, t) in tasks.iter().enumerate() {
            table.add_row(task_row(if i == 0 { column.as_str() } else { "" }, t, key));
        }
    }
    println!("{table}");

    let progress = commitment_progress(&db.tasks, key);
    if progress.total > 0 {
        println!("Commitments: {}/{}", progress.completed, progress.total);
    }
    Ok(())
}

fn task_row(column: &str, t: &Task, week: WeekKey) -> Vec<Cell> {
    vec![
        Cell::new(column).add_attribute(Attribute::Bold),
        Cell::new(t.id),
        Cell::new(&t.title),
        Cell::new(t.priority).fg(priority_color(t.priority)),
        Cell::new(if t.is_commitment_for(week) { "*" } else { "" }),
    ]
}

/// Runs the week-boundary rollover on its own.
pub fn cmd_rollover(ctx: &Context, silent: bool) -> Result<()> {
    let plan = ctx.update(|db| Ok(db.run_rollover(ctx.now, &ctx.policy)))?;
    if !silent {
        println!(
            "Moved {} task(s) to backlog, archived {} week(s).",
            plan.moved.len(),
            plan.archived.len()
        );
    }
    Ok(())
}

/// Prints the completion streak and whether today already counts toward it.
pub fn cmd_streak(ctx: &Context) -> Result<()> {
    let db = ctx.store.load()?;
    let streak = streak_from_tasks(&db.tasks, ctx.now, &ctx.policy);
    let today = has_completed_today(&db.tasks, ctx.now, &ctx.policy);
    println!("Current streak: {} day(s)", streak.current_streak);
    println!("Completed today: {}", if today { "yes" } else { "no" });
    println!("Longest streak: {} day(s)", streak.longest_streak);
    if let Some(start) = streak.streak_start_date {
        println!("Streak started: {}", start);
    }
    if let Some(last) = streak.last_completion_date {
        println!("Last completion: {}", last);
    }
    if let Some(next) = next_milestone(streak.current_streak) {
        println!("Next milestone: {} day(s)", next);
    }
    Ok(())
}

/// Adds a recurring task template.
pub fn cmd_recurring_add(
    ctx: &Context,
    title: String,
    description: Option<String>,
    priority: Priority,
    frequency: Frequency,
    day: Option<DayOfWeek>,
    silent: bool,
) -> Result<u64> {
    let id = ctx.update(|db| db.add_recurring(&title, description, priority, frequency, day, ctx.now))?;
    if !silent {
        println!("Recurring task added (id = {})", id);
    }
    Ok(id)
}

/// Prints every recurring task template.
pub fn cmd_recurring_list(ctx: &Context) -> Result<()> {
    let db = ctx.store.load()?;
    if db.recurring_tasks.is_empty() {
        println!("No recurring tasks found.");
        return Ok(());
    }
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(header(&["ID", "Title", "Priority", "Frequency", "Day", "Active"]));
    for t in &db.recurring_tasks {
        table.add_row(vec![
            Cell::new(t.id),
            Cell::new(&t.title),
            Cell::new(t.priority).fg(priority_color(t.priority)),
            Cell::new(t.frequency),
            Cell::new(t.preferred_day.map(|d| d.title()).unwrap_or_else(|| "-".into())),
            Cell::new(if t.is_active { "yes" } else { "no" }),
        ]);
    }
    println!("{table}");
    Ok(())
}

/// Pauses or resumes a template and returns whether it is now active.
pub fn cmd_recurring_toggle(ctx: &Context, id: u64, silent: bool) -> Result<bool> {
    let active = ctx.update(|db| db.toggle_recurring(id))?;
    if !silent {
        println!("Recurring task {} is now {}.", id, if active { "active" } else { "paused" });
    }
    Ok(active)
}

/// Deletes a template. Tasks it generated are kept.
pub fn cmd_recurring_remove(ctx: &Context, id: u64, silent: bool) -> Result<()> {
    ctx.update(|db| db.remove_recurring(id))?;
    if !silent {
        println!("Recurring task {} removed.", id);
    }
    Ok(())
}

/// Creates this week's instances of the active templates.
pub fn cmd_recurring_generate(ctx: &Context, silent: bool) -> Result<Vec<TaskId>> {
    let ids = ctx.update(|db| Ok(db.generate_recurring(ctx.now, &ctx.policy)))?;
    if !silent {
        println!("Generated {} task(s) for the week of {}.", ids.len(), ctx.current_week());
    }
    Ok(ids)
}

/// Sets this week's (or next week's) commitments and theme.
pub fn cmd_commit(
    ctx: &Context,
    week: WeekChoice,
    ids: Vec<TaskId>,
    theme: Option<String>,
    silent: bool,
) -> Result<()> {
    let key = week.resolve(ctx.current_week());
    let count = ctx.update(|db| set_week_commitments(&mut db.tasks, &mut db.weeks, key, &ids, theme, ctx.now))?;
    if !silent {
        println!("{} commitment(s) set for the week of {}.", count, key);
    }
    Ok(())
}

/// Prints completion and commitment rates for a week.
pub fn cmd_review_summary(ctx: &Context, week: WeekChoice) -> Result<()> {
    let key = week.resolve(ctx.current_week());
    let db = ctx.store.load()?;
    let summary = weekly_summary(&db.tasks, &db.weeks, key);
    println!("Week of {}", key);
    if let Some(theme) = &summary.week_theme {
        println!("Theme: {}", theme);
    }
    println!(
        "Completed {}/{} task(s) ({}%)",
        summary.completed_tasks, summary.total_tasks, summary.completion_rate
    );
    println!(
        "Commitments {}/{} ({}%)",
        summary.completed_commitments, summary.commitment_tasks, summary.commitment_rate
    );
    for t in &summary.completed_tasks_list {
        println!("  done: {}", t.title);
    }
    for t in &summary.pending_commitments {
        println!("  pending: {}", t.title);
    }
    Ok(())
}

/// Records the weekly review, with an optional reflection.
pub fn cmd_review_mark(ctx: &Context, note: Option<String>, silent: bool) -> Result<()> {
    let key = ctx.current_week();
    ctx.update(|db| {
        mark_week_reviewed(&mut db.settings, &mut db.weeks, key, note, ctx.now);
        Ok(())
    })?;
    if !silent {
        println!("Week of {} marked as reviewed.", key);
    }
    Ok(())
}

/// Records that the backlog was reviewed this week.
pub fn cmd_backlog_reviewed(ctx: &Context, silent: bool) -> Result<()> {
    ctx.update(|db| {
        mark_backlog_reviewed(&mut db.settings, ctx.now, &ctx.policy);
        Ok(())
    })?;
    if !silent {
        println!("Backlog marked as reviewed.");
    }
    Ok(())
}

/// Prints which reviews are due.
pub fn cmd_review_status(ctx: &Context) -> Result<()> {
    let db = ctx.store.load()?;
    let weekly = should_show_weekly_review(ctx.now, &ctx.policy, &db.settings);
    let backlog = should_show_backlog_review(ctx.now, &ctx.policy, &db.settings);
    println!("Weekly review due: {}", if weekly { "yes" } else { "no" });
    println!("Backlog review due: {}", if backlog { "yes" } else { "no" });
    Ok(())
}

/// Prints today's digest as JSON for an outbound notifier.
pub fn cmd_digest(ctx: &Context) -> Result<()> {
    let db = ctx.store.load()?;
    let digest = daily_digest(&db.tasks, ctx.now, &ctx.policy);
    let json = serde_json::to_string_pretty(&digest).map_err(|source| Error::Json {
        path: ctx.store.path().to_path_buf(),
        source,
    })?;
    println!("{}", json);
    Ok(())
}

/// Prints archived weeks and recent completion rates, or the record of a
/// single week when `week` is given. Returns the weeks shown.
pub fn cmd_history(ctx: &Context, week: Option<WeekKey>, silent: bool) -> Result<Vec<ArchivedWeek>> {
    let db = ctx.store.load()?;
    let weeks = match week {
        Some(key) => week_history(&db.tasks, &db.weeks, key).into_iter().collect(),
        None => archived_weeks(&db.tasks, &db.weeks, ARCHIVE_LIMIT),
    };
    if silent {
        return Ok(weeks);
    }
    if weeks.is_empty() {
        match week {
            Some(key) => println!("No record for the week of {}.", key),
            None => println!("No archived weeks found."),
        }
        return Ok(weeks);
    }
    let stats = completion_stats(&db.tasks, &db.weeks, STATS_LIMIT);

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header(&["Week", "Range", "Completed", "Rate", "Tasks"]));
    for w in &weeks {
        let (start, end) = week_range_label(w.week.week_id);
        let rate = stats
            .iter()
            .find(|s| s.week_id == w.week.week_id)
            .map(|s| format!("{}%", s.completion_rate))
            .unwrap_or_else(|| "-".into());
        let titles: Vec<&str> = w.completed_tasks.iter().map(|t| t.title.as_str()).collect();
        table.add_row(vec![
            Cell::new(w.week.week_id),
            Cell::new(format!("{} - {}", start, end)),
            Cell::new(w.completed_count),
            Cell::new(rate),
            Cell::new(titles.join(", ")),
        ]);
    }
    println!("{table}");
    for w in &weeks {
        if let Some(note) = &w.week.reflection_note {
            println!("{}: {}", w.week.week_id, note);
        }
    }
    Ok(weeks)
}

/// Deletes the board database.
pub fn cmd_reset(ctx: &Context, silent: bool) -> Result<()> {
    ctx.store.delete()?;
    if !silent {
        println!("Database reset successfully.");
    }
    Ok(())
}
