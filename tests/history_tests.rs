use chrono::{Duration, NaiveDate, TimeZone, Utc};
use weekboard::history::*;
use weekboard::models::{Priority, Task, TaskStatus, Week};
use weekboard::week::WeekKey;

fn key(s: &str) -> WeekKey {
    s.parse().unwrap()
}

fn task(id: u64, status: TaskStatus, week: &str) -> Task {
    Task {
        id,
        title: format!("Task {}", id),
        description: None,
        priority: Priority::Medium,
        status,
        week_id: Some(key(week)),
        completed_at: None,
        created_at: Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap(),
        is_commitment: false,
        commitment_week_id: None,
        recurring_task_id: None,
        generated_for_week: None,
    }
}

fn archived(week: &str) -> Week {
    Week::archived(key(week), Utc.with_ymd_and_hms(2024, 6, 12, 0, 0, 0).unwrap())
}

#[test]
fn test_archived_weeks_newest_first() {
    let tasks = vec![
        task(1, TaskStatus::Completed, "2024-05-19"),
        task(2, TaskStatus::Completed, "2024-05-26"),
        task(3, TaskStatus::Completed, "2024-05-26"),
    ];
    let mut current = archived("2024-06-09");
    current.is_archived = false;
    let weeks = vec![archived("2024-05-19"), archived("2024-05-26"), current];

    let history = archived_weeks(&tasks, &weeks, ARCHIVE_LIMIT);
    let keys: Vec<String> = history.iter().map(|w| w.week.week_id.to_string()).collect();
    assert_eq!(keys, vec!["2024-05-26", "2024-05-19"]);
    assert_eq!(history[0].completed_count, 2);
    assert_eq!(history[1].completed_tasks[0].id, 1);
}

#[test]
fn test_archive_limit_applies() {
    let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
    let weeks: Vec<Week> = (0..30)
        .map(|i| archived(&(start + Duration::weeks(i)).format("%Y-%m-%d").to_string()))
        .collect();
    let history = archived_weeks(&[], &weeks, ARCHIVE_LIMIT);
    assert_eq!(history.len(), 20);
    assert_eq!(history[0].week.week_id.date(), start + Duration::weeks(29));
    assert_eq!(completion_stats(&[], &weeks, STATS_LIMIT).len(), 8);
}

#[test]
fn test_completion_stats() {
    let tasks = vec![
        task(1, TaskStatus::Completed, "2024-05-26"),
        task(2, "monday".parse().unwrap(), "2024-05-26"),
        task(3, TaskStatus::Completed, "2024-05-26"),
        task(4, TaskStatus::Completed, "2024-05-26"),
    ];
    let stats = completion_stats(&tasks, &[archived("2024-05-26")], STATS_LIMIT);
    assert_eq!(stats.len(), 1);
    assert_eq!(stats[0].completed_count, 3);
    assert_eq!(stats[0].total_count, 4);
    assert_eq!(stats[0].completion_rate, 75);
    assert_eq!(stats[0].start_date, NaiveDate::from_ymd_opt(2024, 5, 26).unwrap());
}

#[test]
fn test_week_history_lookup() {
    let tasks = vec![task(1, TaskStatus::Completed, "2024-05-26")];
    let weeks = vec![archived("2024-05-26")];
    let found = week_history(&tasks, &weeks, key("2024-05-26")).unwrap();
    assert_eq!(found.completed_count, 1);
    assert!(week_history(&tasks, &weeks, key("2024-06-02")).is_none());
}

#[test]
fn test_archived_week_serializes_flat() {
    let weeks = vec![archived("2024-05-26")];
    let history = archived_weeks(&[], &weeks, ARCHIVE_LIMIT);
    let json = serde_json::to_value(&history[0]).unwrap();
    assert_eq!(json["weekId"], "2024-05-26");
    assert_eq!(json["isArchived"], true);
    assert_eq!(json["completedCount"], 0);
}
