use habitlog_core::{CompletionLog, Priority, Task, TaskPatch, TaskValidationError};
use uuid::Uuid;

#[test]
fn task_new_sets_defaults() {
    let task =
        Task::new("hydrate", Priority::High, "#6366f1", 1_700_000_000_000).expect("valid task");

    assert!(!task.id.is_nil());
    assert_eq!(task.id.get_version_num(), 7);
    assert_eq!(task.name, "hydrate");
    assert_eq!(task.color, "#6366f1");
    assert_eq!(task.priority, Priority::High);
    assert_eq!(task.created_at, 1_700_000_000_000);
}

#[test]
fn task_serialization_uses_expected_wire_fields() {
    let id = Uuid::parse_str("01890a5d-ac96-774b-bcce-b302099a8057").expect("valid uuid literal");
    let task = Task {
        id,
        name: "stretch".to_string(),
        color: "#22c55e".to_string(),
        priority: Priority::Medium,
        created_at: 1_700_000_360_000,
    };

    let json = serde_json::to_value(&task).expect("task should serialize");
    assert_eq!(json["id"], id.to_string());
    assert_eq!(json["name"], "stretch");
    assert_eq!(json["color"], "#22c55e");
    assert_eq!(json["priority"], "medium");
    assert_eq!(json["created_at"], 1_700_000_360_000_i64);

    let decoded: Task = serde_json::from_value(json).expect("task should deserialize");
    assert_eq!(decoded, task);
}

#[test]
fn patch_with_blank_name_is_rejected() {
    let mut task = Task::new("read", Priority::Low, "#000000", 0).expect("valid task");
    let err = task
        .apply_patch(&TaskPatch::rename("\t "))
        .expect_err("blank rename should be rejected");
    assert_eq!(err, TaskValidationError::EmptyName);
    assert_eq!(task.name, "read");
}

#[test]
fn priorities_order_high_to_low() {
    let mut priorities = vec![Priority::Low, Priority::High, Priority::Medium];
    priorities.sort();
    assert_eq!(priorities, Priority::ALL.to_vec());
}

#[test]
fn completion_log_defaults_to_not_completed() {
    let log = CompletionLog::new();
    let date = chrono::NaiveDate::from_ymd_opt(2026, 2, 1).expect("valid date");
    assert!(!log.is_completed(date, Uuid::now_v7()));
    assert!(log.day(date).is_none());
}
