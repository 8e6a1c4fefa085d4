use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Lifecycle status of a task. Any status may be changed to any other.
/// Corresponds to the `task_status` SQL enum.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
    Cancelled,
    Delayed,
}

/// Represents the priority of a task.
/// Corresponds to the `task_priority` SQL enum.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "task_priority", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
    Urgent,
}

/// Life area a task belongs to.
/// Corresponds to the `task_category` SQL enum.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "task_category", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TaskCategory {
    Work,
    Personal,
    Family,
    Health,
    Finance,
    Other,
}

/// Input structure for creating a task.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TaskInput {
    /// Must be between 1 and 200 characters.
    #[validate(length(min = 1, max = 200))]
    pub title: String,

    /// At most 200 characters.
    #[validate(length(max = 200))]
    pub description: String,

    #[serde(default, deserialize_with = "due_datetime")]
    pub due_datetime: Option<DateTime<Utc>>,

    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub category: TaskCategory,

    /// Optional user the task is assigned to.
    #[serde(default, rename = "assigneeId")]
    pub assignee_id: Option<i32>,
}

/// Changes applied by `PUT /tasks/{id}`.
///
/// Omitted fields keep their stored value. For the nullable fields an explicit
/// `null` clears the value, which is why they are doubly optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct TaskUpdate {
    #[validate(length(min = 1, max = 200))]
    #[serde(default)]
    pub title: Option<String>,

    #[validate(length(max = 200))]
    #[serde(default)]
    pub description: Option<String>,

    #[serde(
        default,
        deserialize_with = "present_due_datetime",
        skip_serializing_if = "Option::is_none"
    )]
    pub due_datetime: Option<Option<DateTime<Utc>>>,

    #[serde(default)]
    pub status: Option<TaskStatus>,
    #[serde(default)]
    pub priority: Option<TaskPriority>,
    #[serde(default)]
    pub category: Option<TaskCategory>,

    #[serde(
        default,
        rename = "assigneeId",
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub assignee_id: Option<Option<i32>>,
}

/// Marks a field as present even when its value is `null`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Naive forms sent by `<input type="datetime-local">`, read as UTC.
const NAIVE_DATETIME_FORMATS: [&str; 3] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

/// Parses an RFC 3339 timestamp, or an ISO 8601 one without offset as UTC.
pub fn parse_due_datetime(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| Utc.from_utc_datetime(&naive))
}

fn due_datetime<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer)?
        .map(|raw| {
            parse_due_datetime(&raw)
                .ok_or_else(|| de::Error::custom(format!("invalid due_datetime `{}`", raw)))
        })
        .transpose()
}

fn present_due_datetime<'de, D>(deserializer: D) -> Result<Option<Option<DateTime<Utc>>>, D::Error>
where
    D: Deserializer<'de>,
{
    due_datetime(deserializer).map(Some)
}

impl TaskUpdate {
    /// Overwrites the fields of `task` that this update carries.
    /// Timestamps are left to the caller.
    pub fn apply_to(&self, task: &mut Task) {
        if let Some(title) = &self.title {
            task.title = title.clone();
        }
        if let Some(description) = &self.description {
            task.description = description.clone();
        }
        if let Some(due_datetime) = self.due_datetime {
            task.due_datetime = due_datetime;
        }
        if let Some(status) = self.status {
            task.status = status;
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(category) = self.category {
            task.category = category;
        }
        if let Some(assignee_id) = self.assignee_id {
            task.assignee_id = assignee_id;
        }
    }
}

/// Represents a task entity as stored in the database and returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Task {
    /// Server-assigned, monotonically increasing identifier.
    pub id: i32,
    pub title: String,
    pub description: String,
    pub due_datetime: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub category: TaskCategory,
    #[serde(rename = "assigneeId")]
    pub assignee_id: Option<i32>,
}

impl Task {
    /// Builds a new task row from validated input.
    /// `created_at` and `updated_at` are both set to `now`.
    pub fn new(id: i32, input: TaskInput, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: input.title,
            description: input.description,
            due_datetime: input.due_datetime,
            created_at: now,
            updated_at: now,
            status: input.status,
            priority: input.priority,
            category: input.category,
            assignee_id: input.assignee_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn input() -> TaskInput {
        TaskInput {
            title: "Pay rent".to_string(),
            description: "Transfer before the 5th".to_string(),
            due_datetime: Some(Utc::now()),
            status: TaskStatus::Pending,
            priority: TaskPriority::Urgent,
            category: TaskCategory::Finance,
            assignee_id: Some(1),
        }
    }

    #[test]
    fn test_task_creation() {
        let now = Utc::now();
        let task = Task::new(7, input(), now);
        assert_eq!(task.id, 7);
        assert_eq!(task.title, "Pay rent");
        assert_eq!(task.created_at, now);
        assert_eq!(task.updated_at, now);
        assert_eq!(task.assignee_id, Some(1));
    }

    #[test]
    fn test_task_validation() {
        assert!(input().validate().is_ok());

        let mut empty_title = input();
        empty_title.title = String::new();
        assert!(empty_title.validate().is_err());

        let mut long_title = input();
        long_title.title = "a".repeat(201);
        assert!(long_title.validate().is_err());

        let mut long_description = input();
        long_description.description = "b".repeat(201);
        assert!(long_description.validate().is_err());
    }

    #[test]
    fn test_wire_names() {
        let task = Task::new(1, input(), Utc::now());
        let value = serde_json::to_value(&task).unwrap();
        assert_eq!(value["assigneeId"], 1);
        assert_eq!(value["status"], "pending");
        assert_eq!(value["priority"], "urgent");
        assert_eq!(value["category"], "finance");

        let status: TaskStatus = serde_json::from_value(json!("in_progress")).unwrap();
        assert_eq!(status, TaskStatus::InProgress);
    }

    #[test]
    fn test_update_distinguishes_null_from_missing() {
        let update: TaskUpdate = serde_json::from_value(json!({
            "title": "Pay rent today",
            "assigneeId": null
        }))
        .unwrap();
        assert_eq!(update.title.as_deref(), Some("Pay rent today"));
        assert_eq!(update.assignee_id, Some(None));
        assert_eq!(update.due_datetime, None);

        let mut task = Task::new(1, input(), Utc::now());
        let due = task.due_datetime;
        update.apply_to(&mut task);
        assert_eq!(task.title, "Pay rent today");
        assert_eq!(task.assignee_id, None);
        assert_eq!(task.due_datetime, due);
        assert_eq!(task.status, TaskStatus::Pending);
    }

    #[test]
    fn test_update_validation() {
        let update = TaskUpdate {
            title: Some(String::new()),
            ..TaskUpdate::default()
        };
        assert!(update.validate().is_err());
        assert!(TaskUpdate::default().validate().is_ok());
    }

    #[test]
    fn test_due_datetime_accepts_naive_iso() {
        let expected = Utc.with_ymd_and_hms(2024, 6, 1, 18, 0, 0).unwrap();
        for raw in [
            "2024-06-01T18:00:00Z",
            "2024-06-01T20:00:00+02:00",
            "2024-06-01T18:00:00",
            "2024-06-01T18:00:00.000",
            "2024-06-01T18:00",
        ] {
            assert_eq!(parse_due_datetime(raw), Some(expected), "{}", raw);
        }
        assert_eq!(parse_due_datetime("tomorrow"), None);
        assert_eq!(parse_due_datetime("2024-06-01"), None);

        let input: TaskInput = serde_json::from_value(json!({
            "title": "Pay rent",
            "description": "",
            "status": "pending",
            "priority": "urgent",
            "category": "finance",
            "due_datetime": "2024-06-01T18:00"
        }))
        .unwrap();
        assert_eq!(input.due_datetime, Some(expected));

        let update: TaskUpdate =
            serde_json::from_value(json!({ "due_datetime": "2024-06-01T18:00" })).unwrap();
        assert_eq!(update.due_datetime, Some(Some(expected)));

        let rejected = serde_json::from_value::<TaskInput>(json!({
            "title": "Pay rent",
            "description": "",
            "status": "pending",
            "priority": "urgent",
            "category": "finance",
            "due_datetime": "next week"
        }));
        assert!(rejected.is_err());
    }
}
