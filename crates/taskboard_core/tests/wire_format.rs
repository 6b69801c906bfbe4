use chrono::{TimeZone, Utc};
use taskboard_core::{ActivityAction, ActivityLogEntry, Column, Priority, Task};
use uuid::Uuid;

#[test]
fn task_serializes_with_camel_case_fields() {
    let task = Task {
        id: Uuid::parse_str("11111111-2222-4333-8444-555555555555").unwrap(),
        title: "Ship board".to_string(),
        description: None,
        priority: Priority::High,
        due_date: Some("2023-12-31".to_string()),
        tags: vec!["bug".to_string()],
        column: Column::Doing,
        created_at: Utc.with_ymd_and_hms(2023, 12, 1, 8, 30, 0).unwrap(),
    };

    let json = serde_json::to_value(&task).unwrap();
    assert_eq!(json["id"], "11111111-2222-4333-8444-555555555555");
    assert_eq!(json["priority"], "High");
    assert_eq!(json["column"], "Doing");
    assert_eq!(json["dueDate"], "2023-12-31");
    assert_eq!(json["createdAt"], "2023-12-01T08:30:00.000Z");
    assert!(json.get("description").is_none());

    let decoded: Task = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, task);
}

#[test]
fn task_reads_browser_written_records() {
    let raw = r#"{
        "id": "6f1c1f4e-2a7b-4c1e-9a57-0d1e2f3a4b5c",
        "title": "T1",
        "description": "",
        "priority": "Low",
        "tags": [],
        "column": "Todo",
        "createdAt": "2024-05-01T10:11:12.345Z"
    }"#;

    let task: Task = serde_json::from_str(raw).unwrap();
    assert_eq!(task.description.as_deref(), Some(""));
    assert_eq!(task.due_date, None);
    assert_eq!(task.due_at(), None);
    assert_eq!(task.column, Column::Todo);
}

#[test]
fn unknown_column_is_rejected() {
    let raw = r#"{
        "id": "6f1c1f4e-2a7b-4c1e-9a57-0d1e2f3a4b5c",
        "title": "T1",
        "priority": "Low",
        "tags": [],
        "column": "Backlog",
        "createdAt": "2024-05-01T10:11:12.345Z"
    }"#;

    assert!(serde_json::from_str::<Task>(raw).is_err());
}

#[test]
fn activity_entry_uses_lowercase_actions() {
    let entry = ActivityLogEntry {
        id: Uuid::from_u128(7),
        task_id: Uuid::from_u128(1),
        task_title: "T1".to_string(),
        action: ActivityAction::Moved,
        timestamp: Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap(),
    };

    let json = serde_json::to_value(&entry).unwrap();
    assert_eq!(json["action"], "moved");
    assert_eq!(json["taskTitle"], "T1");
    assert_eq!(json["taskId"], Uuid::from_u128(1).to_string());
    assert_eq!(json["timestamp"], "2024-01-02T03:04:05.000Z");
}
