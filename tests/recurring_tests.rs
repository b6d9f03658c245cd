use chrono::{TimeZone, Utc};
use weekboard::models::{Frequency, Priority, RecurringTask, TaskStatus};
use weekboard::recurring::generate;
use weekboard::storage::Database;
use weekboard::week::{DayOfWeek, WeekKey, WeekPolicy};

fn template(id: u64, frequency: Frequency, day: Option<DayOfWeek>) -> RecurringTask {
    RecurringTask {
        id,
        title: format!("Chore {}", id),
        description: Some("every time".into()),
        priority: Priority::High,
        frequency,
        preferred_day: day,
        is_active: true,
        created_at: Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap(),
    }
}

fn key(s: &str) -> WeekKey {
    s.parse().unwrap()
}

#[test]
fn test_preferred_day_goes_to_that_day() {
    let drafts = generate(&[template(1, Frequency::Weekly, Some(DayOfWeek::Monday))], &[], key("2024-06-09"));
    assert_eq!(drafts.len(), 1);
    let d = &drafts[0];
    assert_eq!(d.status, TaskStatus::Day(DayOfWeek::Monday));
    assert_eq!(d.week_id, Some(key("2024-06-09")));
    assert_eq!(d.priority, Priority::High);
    assert_eq!(d.description.as_deref(), Some("every time"));
    assert_eq!(d.recurring_task_id, Some(1));
}

#[test]
fn test_no_preferred_day_goes_to_backlog() {
    let drafts = generate(&[template(1, Frequency::Weekly, None)], &[], key("2024-06-09"));
    assert_eq!(drafts[0].status, TaskStatus::Backlog);
    assert_eq!(drafts[0].week_id, None);
    assert_eq!(drafts[0].generated_for_week, Some(key("2024-06-09")));
}

#[test]
fn test_inactive_templates_are_skipped() {
    let mut t = template(1, Frequency::Weekly, None);
    t.is_active = false;
    assert!(generate(&[t], &[], key("2024-06-09")).is_empty());
}

#[test]
fn test_generation_is_idempotent_per_week() {
    let policy = WeekPolicy::default();
    let now = Utc.with_ymd_and_hms(2024, 6, 12, 9, 0, 0).unwrap();
    let mut db = Database::default();
    db.recurring_tasks = vec![
        template(1, Frequency::Weekly, Some(DayOfWeek::Friday)),
        template(2, Frequency::Weekly, None),
    ];

    let first = db.generate_recurring(now, &policy);
    assert_eq!(first.len(), 2);
    let second = db.generate_recurring(now, &policy);
    assert!(second.is_empty());
    assert_eq!(db.tasks.len(), 2);

    // A backlog instance still counts after being scheduled elsewhere
    let backlog_id = db.tasks.iter().find(|t| t.recurring_task_id == Some(2)).unwrap().id;
    db.schedule_task(backlog_id, key("2024-06-16"), DayOfWeek::Monday).unwrap();
    assert!(db.generate_recurring(now, &policy).is_empty());

    let next_week = Utc.with_ymd_and_hms(2024, 6, 17, 9, 0, 0).unwrap();
    assert_eq!(db.generate_recurring(next_week, &policy).len(), 2);
    assert_eq!(db.tasks.len(), 4);
}

#[test]
fn test_monthly_template_once_per_month() {
    let templates = [template(1, Frequency::Monthly, Some(DayOfWeek::Saturday))];
    let first = generate(&templates, &[], key("2024-06-02"));
    assert_eq!(first.len(), 1);

    let mut tasks = Vec::new();
    for (i, d) in first.into_iter().enumerate() {
        tasks.push(d.into_task(i as u64 + 1, Utc.with_ymd_and_hms(2024, 6, 2, 0, 0, 0).unwrap()));
    }
    assert!(generate(&templates, &tasks, key("2024-06-09")).is_empty());
    assert!(generate(&templates, &tasks, key("2024-06-30")).is_empty());
    assert_eq!(generate(&templates, &tasks, key("2024-07-07")).len(), 1);
}
