use chrono::{DateTime, TimeZone, Utc};
use weekboard::models::{Priority, Task, TaskStatus, UserSettings, Week};
use weekboard::review::*;
use weekboard::week::{DayOfWeek, WeekKey, WeekPolicy};
use weekboard::Error;

fn key(s: &str) -> WeekKey {
    s.parse().unwrap()
}

fn at(d: u32, h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, d, h, 0, 0).unwrap()
}

fn task(id: u64, status: &str, priority: Priority, week: Option<&str>) -> Task {
    let status: TaskStatus = status.parse().unwrap();
    Task {
        id,
        title: format!("Task {}", id),
        description: None,
        priority,
        status,
        week_id: week.map(key),
        completed_at: (status == TaskStatus::Completed).then(|| at(12, 9)),
        created_at: at(1, 8),
        is_commitment: false,
        commitment_week_id: None,
        recurring_task_id: None,
        generated_for_week: None,
    }
}

#[test]
fn test_percent_rounds() {
    assert_eq!(percent(0, 0), 0);
    assert_eq!(percent(1, 3), 33);
    assert_eq!(percent(2, 3), 67);
    assert_eq!(percent(4, 4), 100);
}

#[test]
fn test_set_commitments_creates_week_record() {
    let mut tasks = vec![
        task(1, "monday", Priority::High, Some("2024-06-09")),
        task(2, "backlog", Priority::Low, None),
    ];
    let mut weeks = Vec::new();
    let n = set_week_commitments(&mut tasks, &mut weeks, key("2024-06-09"), &[1], Some("Focus".into()), at(10, 8)).unwrap();
    assert_eq!(n, 1);
    assert!(tasks[0].is_commitment_for(key("2024-06-09")));
    assert!(!tasks[1].is_commitment);
    assert_eq!(weeks.len(), 1);
    assert_eq!(weeks[0].commitment_task_ids, vec![1]);
    assert_eq!(weeks[0].week_theme.as_deref(), Some("Focus"));
    assert!(!weeks[0].is_archived);

    // Second call updates the same record
    set_week_commitments(&mut tasks, &mut weeks, key("2024-06-09"), &[1, 2], None, at(11, 8)).unwrap();
    assert_eq!(weeks.len(), 1);
    assert_eq!(weeks[0].commitment_task_ids, vec![1, 2]);
}

#[test]
fn test_set_commitments_rejects_unknown_ids_without_changes() {
    let mut tasks = vec![task(1, "monday", Priority::High, Some("2024-06-09"))];
    let mut weeks = Vec::new();
    match set_week_commitments(&mut tasks, &mut weeks, key("2024-06-09"), &[1, 42], None, at(10, 8)) {
        Err(Error::TaskNotFound(42)) => {}
        other => panic!("expected TaskNotFound, got {:?}", other),
    }
    assert!(!tasks[0].is_commitment);
    assert!(weeks.is_empty());
}

#[test]
fn test_weekly_summary_counts() {
    let week = key("2024-06-09");
    let mut tasks = vec![
        task(1, "completed", Priority::High, Some("2024-06-09")),
        task(2, "monday", Priority::Medium, Some("2024-06-09")),
        task(3, "completed", Priority::Low, Some("2024-06-09")),
        task(4, "friday", Priority::Low, Some("2024-06-16")),
        task(5, "backlog", Priority::Low, None),
    ];
    let mut weeks = Vec::new();
    set_week_commitments(&mut tasks, &mut weeks, week, &[1, 2], Some("Ship it".into()), at(9, 8)).unwrap();

    let s = weekly_summary(&tasks, &weeks, week);
    assert_eq!(s.total_tasks, 3);
    assert_eq!(s.completed_tasks, 2);
    assert_eq!(s.completion_rate, 67);
    assert_eq!(s.commitment_tasks, 2);
    assert_eq!(s.completed_commitments, 1);
    assert_eq!(s.commitment_rate, 50);
    assert_eq!(s.week_theme.as_deref(), Some("Ship it"));
    assert_eq!(s.completed_tasks_list.iter().map(|t| t.id).collect::<Vec<_>>(), vec![1, 3]);
    assert_eq!(s.pending_commitments.iter().map(|t| t.id).collect::<Vec<_>>(), vec![2]);

    assert_eq!(commitment_progress(&tasks, week), CommitmentProgress { completed: 1, total: 2 });
}

#[test]
fn test_summary_of_empty_week() {
    let s = weekly_summary(&[], &[], key("2024-06-09"));
    assert_eq!(s.total_tasks, 0);
    assert_eq!(s.completion_rate, 0);
    assert_eq!(s.commitment_rate, 0);
    assert!(s.week_theme.is_none());
}

#[test]
fn test_weekly_review_only_on_weekend() {
    let policy = WeekPolicy::default();
    let mut settings = UserSettings::default();
    // Wednesday
    assert!(!should_show_weekly_review(at(12, 12), &policy, &settings));
    // Saturday
    assert!(should_show_weekly_review(at(15, 12), &policy, &settings));

    let mut weeks = vec![Week::new(key("2024-06-09"), at(9, 8))];
    mark_week_reviewed(&mut settings, &mut weeks, key("2024-06-09"), Some("Good week".into()), at(15, 12));
    assert!(!should_show_weekly_review(at(15, 18), &policy, &settings));
    assert_eq!(weeks[0].reflection_note.as_deref(), Some("Good week"));
    assert_eq!(weeks[0].review_completed_at, Some(at(15, 12)));
    assert_eq!(settings.updated_at, Some(at(15, 12)));

    // The following Sunday opens a new week
    assert!(should_show_weekly_review(at(16, 12), &policy, &settings));
}

#[test]
fn test_backlog_review_once_per_week() {
    let policy = WeekPolicy::default();
    let mut settings = UserSettings::default();
    assert!(should_show_backlog_review(at(10, 8), &policy, &settings));
    mark_backlog_reviewed(&mut settings, at(10, 8), &policy);
    assert_eq!(settings.last_backlog_review_week_id, Some(key("2024-06-09")));
    assert!(!should_show_backlog_review(at(14, 8), &policy, &settings));
    assert!(should_show_backlog_review(at(17, 8), &policy, &settings));
}

#[test]
fn test_daily_digest_lists_today_by_priority() {
    let policy = WeekPolicy::default();
    let now = at(12, 7);
    let tasks = vec![
        task(1, "wednesday", Priority::Low, Some("2024-06-09")),
        task(2, "wednesday", Priority::High, Some("2024-06-09")),
        task(3, "wednesday", Priority::High, Some("2024-06-16")),
        task(4, "thursday", Priority::High, Some("2024-06-09")),
        task(5, "completed", Priority::Low, Some("2024-06-09")),
    ];
    let digest = daily_digest(&tasks, now, &policy);
    assert_eq!(digest.day, DayOfWeek::Wednesday);
    assert_eq!(digest.tasks.iter().map(|t| t.id).collect::<Vec<_>>(), vec![2, 1]);
    assert_eq!(digest.streak.current_streak, 1);
    assert_eq!(digest.commitments, CommitmentProgress::default());
}

#[test]
fn test_recommitting_drops_tasks_left_out() {
    let week = key("2024-06-09");
    let mut tasks = vec![
        task(1, "monday", Priority::High, Some("2024-06-09")),
        task(2, "tuesday", Priority::Medium, Some("2024-06-09")),
    ];
    let mut weeks = Vec::new();
    set_week_commitments(&mut tasks, &mut weeks, week, &[1, 2], None, at(9, 8)).unwrap();
    set_week_commitments(&mut tasks, &mut weeks, week, &[2], None, at(10, 8)).unwrap();

    assert_eq!(weeks[0].commitment_task_ids, vec![2]);
    assert!(!tasks[0].is_commitment);
    assert_eq!(tasks[0].commitment_week_id, None);
    assert_eq!(commitment_progress(&tasks, week), CommitmentProgress { completed: 0, total: 1 });
    assert_eq!(weekly_summary(&tasks, &weeks, week).commitment_tasks, 1);
}

#[test]
fn test_recommitting_leaves_other_weeks_alone() {
    let mut tasks = vec![
        task(1, "monday", Priority::High, Some("2024-06-09")),
        task(2, "monday", Priority::High, Some("2024-06-16")),
    ];
    let mut weeks = Vec::new();
    set_week_commitments(&mut tasks, &mut weeks, key("2024-06-16"), &[2], None, at(12, 8)).unwrap();
    set_week_commitments(&mut tasks, &mut weeks, key("2024-06-09"), &[1], None, at(12, 9)).unwrap();
    assert!(tasks[1].is_commitment_for(key("2024-06-16")));
}
