use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use weekboard::models::{Priority, Task, TaskStatus, Week};
use weekboard::rollover::{rollover, RolloverPlan};
use weekboard::week::{DayOfWeek, WeekKey, WeekPolicy};

fn now() -> DateTime<Utc> {
    // Wednesday; current week 2024-06-09, next week 2024-06-16
    Utc.with_ymd_and_hms(2024, 6, 12, 12, 0, 0).unwrap()
}

fn key(s: &str) -> WeekKey {
    s.parse().unwrap()
}

fn task(id: u64, status: &str, week: Option<&str>) -> Task {
    let status: TaskStatus = status.parse().unwrap();
    Task {
        id,
        title: format!("Task {}", id),
        description: None,
        priority: Priority::Medium,
        status,
        week_id: week.map(key),
        completed_at: (status == TaskStatus::Completed)
            .then(|| Utc.with_ymd_and_hms(2024, 5, 28, 10, 0, 0).unwrap()),
        created_at: Utc.with_ymd_and_hms(2024, 5, 20, 10, 0, 0).unwrap(),
        is_commitment: false,
        commitment_week_id: None,
        recurring_task_id: None,
        generated_for_week: None,
    }
}

fn find(tasks: &[Task], id: u64) -> &Task {
    tasks.iter().find(|t| t.id == id).unwrap()
}

#[test]
fn test_stale_task_moves_to_backlog() {
    let mut tasks = vec![task(1, "wednesday", Some("2024-05-26"))];
    let mut weeks = Vec::new();
    let plan = rollover(now(), &tasks, &weeks, &WeekPolicy::default());
    assert_eq!(plan.moved, vec![1]);

    plan.apply_to(&mut tasks, &mut weeks);
    let t = find(&tasks, 1);
    assert_eq!(t.status, TaskStatus::Backlog);
    assert_eq!(t.week_id, None);
}

#[test]
fn test_current_and_future_weeks_are_untouched() {
    let tasks = vec![
        task(1, "monday", Some("2024-06-09")),
        task(2, "friday", Some("2024-06-16")),
        task(3, "tuesday", Some("2024-06-23")),
        task(4, "completed", Some("2024-06-09")),
        task(5, "backlog", None),
    ];
    let plan = rollover(now(), &tasks, &[], &WeekPolicy::default());
    assert_eq!(plan, RolloverPlan::default());
    assert!(plan.is_empty());
}

#[test]
fn test_next_week_is_exempt_for_any_status() {
    let next = "2024-06-16";
    let tasks: Vec<Task> = ["sunday", "monday", "wednesday", "saturday", "completed"]
        .iter()
        .enumerate()
        .map(|(i, s)| task(i as u64 + 1, s, Some(next)))
        .collect();
    let plan = rollover(now(), &tasks, &[], &WeekPolicy::default());
    assert!(plan.moved.is_empty());
    assert!(plan.archived.is_empty());
}

#[test]
fn test_orphaned_completed_weeks_are_archived() {
    let tasks = vec![
        task(1, "completed", Some("2024-05-26")),
        task(2, "completed", Some("2024-05-26")),
        task(3, "completed", Some("2024-05-19")),
        task(4, "completed", Some("2024-06-09")),
    ];
    let plan = rollover(now(), &tasks, &[], &WeekPolicy::default());
    assert!(plan.moved.is_empty());
    assert_eq!(plan.archived, vec![key("2024-05-19"), key("2024-05-26")]);

    let week = plan.inserts.iter().find(|w| w.week_id == key("2024-05-26")).unwrap();
    assert!(week.is_archived);
    assert_eq!(week.start_date, NaiveDate::from_ymd_opt(2024, 5, 26).unwrap());
    assert_eq!(week.end_date, NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
}

#[test]
fn test_existing_week_record_is_not_duplicated() {
    let tasks = vec![task(1, "completed", Some("2024-05-26"))];
    let weeks = vec![Week::new(key("2024-05-26"), now())];
    let plan = rollover(now(), &tasks, &weeks, &WeekPolicy::default());
    assert!(plan.archived.is_empty());
    assert!(plan.inserts.is_empty());
}

#[test]
fn test_rollover_is_idempotent() {
    let mut tasks = vec![
        task(1, "wednesday", Some("2024-05-26")),
        task(2, "completed", Some("2024-05-26")),
        task(3, "monday", Some("2024-06-02")),
        task(4, "friday", Some("2024-06-09")),
        task(5, "saturday", Some("2024-06-16")),
        task(6, "backlog", None),
        task(7, "completed", Some("2024-04-28")),
    ];
    let mut weeks = vec![Week::archived(key("2024-04-28"), now())];
    let policy = WeekPolicy::default();

    let first = rollover(now(), &tasks, &weeks, &policy);
    assert_eq!(first.moved, vec![1, 3]);
    assert_eq!(first.archived, vec![key("2024-05-26")]);

    first.apply_to(&mut tasks, &mut weeks);
    let second = rollover(now(), &tasks, &weeks, &policy);
    assert!(second.moved.is_empty());
    assert!(second.archived.is_empty());

    // Applying the first plan again does not add a second record
    first.apply_to(&mut tasks, &mut weeks);
    assert_eq!(weeks.iter().filter(|w| w.week_id == key("2024-05-26")).count(), 1);

    assert_eq!(find(&tasks, 4).status, TaskStatus::Day(DayOfWeek::Friday));
    assert_eq!(find(&tasks, 5).week_id, Some(key("2024-06-16")));
    assert_eq!(find(&tasks, 2).status, TaskStatus::Completed);
}

#[test]
fn test_empty_snapshot() {
    let plan = rollover(now(), &[], &[], &WeekPolicy::default());
    assert!(plan.is_empty());
    assert!(plan.patches.is_empty());
}

#[test]
fn test_patch_for_deleted_task_is_skipped() {
    let tasks = vec![task(1, "monday", Some("2024-05-26"))];
    let plan = rollover(now(), &tasks, &[], &WeekPolicy::default());
    let mut remaining: Vec<Task> = Vec::new();
    let mut weeks = Vec::new();
    plan.apply_to(&mut remaining, &mut weeks);
    assert!(remaining.is_empty());
}
