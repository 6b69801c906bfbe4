use chrono::{TimeZone, Utc};
use taskboard_core::store::view::{column_counts, visible_tasks, visible_tasks_in};
use taskboard_core::{Column, Priority, PriorityFilter, SortMode, Task, ViewControls};
use uuid::Uuid;

fn task(n: u128, title: &str, priority: Priority, due: Option<&str>, created_hour: u32) -> Task {
    Task {
        id: Uuid::from_u128(n),
        title: title.to_string(),
        description: None,
        priority,
        due_date: due.map(str::to_string),
        tags: Vec::new(),
        column: Column::Todo,
        created_at: Utc.with_ymd_and_hms(2024, 1, 1, created_hour, 0, 0).unwrap(),
    }
}

fn titles(tasks: &[&Task]) -> Vec<String> {
    tasks.iter().map(|task| task.title.clone()).collect()
}

fn sample() -> Vec<Task> {
    vec![
        task(1, "Write report", Priority::High, Some("2024-02-10"), 1),
        task(2, "Fix login bug", Priority::High, None, 2),
        task(3, "Review PR", Priority::Low, Some("2024-01-15"), 3),
        task(4, "Plan sprint", Priority::Medium, Some(""), 4),
        task(5, "REPORT numbers", Priority::Medium, Some("2024-01-15"), 5),
    ]
}

#[test]
fn default_view_sorts_by_due_date_with_missing_dates_last() {
    let tasks = sample();
    let visible = visible_tasks(&tasks, &ViewControls::default());

    assert_eq!(
        titles(&visible),
        vec![
            "Review PR",
            "REPORT numbers",
            "Write report",
            "Fix login bug",
            "Plan sprint",
        ]
    );
}

#[test]
fn created_at_sort_is_newest_first() {
    let tasks = sample();
    let view = ViewControls {
        sort_by: SortMode::CreatedAt,
        ..ViewControls::default()
    };

    let visible = visible_tasks(&tasks, &view);
    assert_eq!(visible.first().unwrap().title, "REPORT numbers");
    assert_eq!(visible.last().unwrap().title, "Write report");
}

#[test]
fn search_is_case_insensitive_on_title() {
    let tasks = sample();
    let view = ViewControls {
        search_query: "RePoRt".to_string(),
        ..ViewControls::default()
    };

    assert_eq!(
        titles(&visible_tasks(&tasks, &view)),
        vec!["REPORT numbers", "Write report"]
    );
}

#[test]
fn search_and_priority_filter_combine() {
    let tasks = sample();
    let view = ViewControls {
        search_query: "report".to_string(),
        filter_priority: PriorityFilter::Only(Priority::High),
        sort_by: SortMode::DueDate,
    };

    assert_eq!(titles(&visible_tasks(&tasks, &view)), vec!["Write report"]);
}

#[test]
fn column_views_partition_visible_tasks() {
    let mut tasks = sample();
    tasks[0].column = Column::Doing;
    tasks[1].column = Column::Done;
    let view = ViewControls::default();

    assert_eq!(
        titles(&visible_tasks_in(&tasks, &view, Column::Doing)),
        vec!["Write report"]
    );
    assert_eq!(
        column_counts(&tasks, &view),
        [(Column::Todo, 3), (Column::Doing, 1), (Column::Done, 1)]
    );
}

#[test]
fn same_day_due_times_sort_by_full_instant() {
    let tasks = vec![
        task(1, "evening", Priority::Low, Some("2024-03-01T18:00:00.000Z"), 1),
        task(2, "morning", Priority::Low, Some("2024-03-01T09:00:00.000Z"), 2),
        task(3, "plain date", Priority::Low, Some("2024-03-01"), 3),
    ];

    assert_eq!(
        titles(&visible_tasks(&tasks, &ViewControls::default())),
        vec!["plain date", "morning", "evening"]
    );
}
