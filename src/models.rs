// Data models for todostore

use chrono::{DateTime, NaiveDate, Utc};
use eyre::{Result, eyre};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A single to-do item with scheduling and categorization metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub due_date: NaiveDate,
    pub priority: Priority,
    pub status: Status,
    /// Category id; not checked against the live category set
    #[serde(default)]
    pub category: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Stamp a draft with system-assigned fields
    pub fn from_draft(draft: TaskDraft, id: String, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: draft.title,
            description: draft.description,
            due_date: draft.due_date,
            priority: draft.priority,
            status: draft.status,
            category: draft.category,
            created_at: now,
            updated_at: now,
        }
    }

    /// Classify the due date relative to `today`
    pub fn due_state(&self, today: NaiveDate) -> DueState {
        DueState::classify(self.due_date, today)
    }
}

/// Task payload lacking id, created_at and updated_at
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDraft {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub due_date: NaiveDate,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub category: String,
}

impl TaskDraft {
    /// New draft with medium priority and incomplete status
    pub fn new(title: impl Into<String>, due_date: NaiveDate, category: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            due_date,
            priority: Priority::default(),
            status: Status::default(),
            category: category.into(),
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn status(mut self, status: Status) -> Self {
        self.status = status;
        self
    }
}

/// Partial update of a task's mutable fields
///
/// `id` and `created_at` have no slot here, so a patch can never change them.
/// `description` is doubly optional: `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub due_date: Option<NaiveDate>,
    pub priority: Option<Priority>,
    pub status: Option<Status>,
    pub category: Option<String>,
}

impl TaskPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn description(mut self, description: Option<String>) -> Self {
        self.description = Some(description);
        self
    }

    pub fn due_date(mut self, due_date: NaiveDate) -> Self {
        self.due_date = Some(due_date);
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn status(mut self, status: Status) -> Self {
        self.status = Some(status);
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Merge the patch into `task`. Does not touch timestamps.
    pub fn apply_to(&self, task: &mut Task) {
        if let Some(title) = &self.title {
            task.title = title.clone();
        }
        if let Some(description) = &self.description {
            task.description = description.clone();
        }
        if let Some(due_date) = self.due_date {
            task.due_date = due_date;
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(status) = self.status {
            task.status = status;
        }
        if let Some(category) = &self.category {
            task.category = category.clone();
        }
    }
}

impl From<TaskDraft> for TaskPatch {
    /// Full edit: every mutable field is overwritten
    fn from(draft: TaskDraft) -> Self {
        Self {
            title: Some(draft.title),
            description: Some(draft.description),
            due_date: Some(draft.due_date),
            priority: Some(draft.priority),
            status: Some(draft.status),
            category: Some(draft.category),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    /// Sort rank: high first
    pub fn rank(self) -> u8 {
        match self {
            Priority::High => 0,
            Priority::Medium => 1,
            Priority::Low => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Priority {
    type Err = eyre::Report;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" => Ok(Priority::High),
            "medium" => Ok(Priority::Medium),
            "low" => Ok(Priority::Low),
            other => Err(eyre!("Unknown priority: {} (expected high, medium or low)", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    #[default]
    Incomplete,
    InProgress,
    Complete,
    Hold,
}

impl Status {
    /// Sort rank: in-progress < incomplete < hold < complete
    pub fn rank(self) -> u8 {
        match self {
            Status::InProgress => 0,
            Status::Incomplete => 1,
            Status::Hold => 2,
            Status::Complete => 3,
        }
    }

    /// Next status in the advance cycle:
    /// incomplete -> in-progress -> complete -> hold -> incomplete
    pub fn next(self) -> Self {
        match self {
            Status::Incomplete => Status::InProgress,
            Status::InProgress => Status::Complete,
            Status::Complete => Status::Hold,
            Status::Hold => Status::Incomplete,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Status::Incomplete => "incomplete",
            Status::InProgress => "in-progress",
            Status::Complete => "complete",
            Status::Hold => "hold",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Status {
    type Err = eyre::Report;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "incomplete" => Ok(Status::Incomplete),
            "in-progress" | "in_progress" | "inprogress" => Ok(Status::InProgress),
            "complete" => Ok(Status::Complete),
            "hold" => Ok(Status::Hold),
            other => Err(eyre!(
                "Unknown status: {} (expected incomplete, in-progress, complete or hold)",
                other
            )),
        }
    }
}

/// User-defined grouping label applied to tasks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub color: String,
}

impl Category {
    pub fn new(id: impl Into<String>, name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            color: color.into(),
        }
    }
}

/// Seeded category set used when nothing is persisted
pub fn default_categories() -> Vec<Category> {
    vec![
        Category::new("1", "Personal", "#3B82F6"),
        Category::new("2", "Work", "#EF4444"),
        Category::new("3", "Shopping", "#10B981"),
    ]
}

/// Urgency of a due date relative to today
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DueState {
    Overdue,
    Today,
    /// Due within the next three days
    Soon,
    Later,
}

impl DueState {
    pub fn classify(due_date: NaiveDate, today: NaiveDate) -> Self {
        let days = (due_date - today).num_days();
        match days {
            d if d < 0 => DueState::Overdue,
            0 => DueState::Today,
            1..=3 => DueState::Soon,
            _ => DueState::Later,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample_task() -> Task {
        let now = DateTime::parse_from_rfc3339("2025-01-01T10:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let draft = TaskDraft::new("Write report", date(2025, 1, 10), "2")
            .description("quarterly numbers")
            .priority(Priority::High);
        Task::from_draft(draft, "task-1".to_string(), now)
    }

    #[test]
    fn test_task_serialization_layout() {
        let task = sample_task();
        let json = serde_json::to_value(&task).unwrap();

        assert_eq!(json["id"], "task-1");
        assert_eq!(json["dueDate"], "2025-01-10");
        assert_eq!(json["priority"], "high");
        assert_eq!(json["status"], "incomplete");
        assert_eq!(json["category"], "2");
        assert!(json.get("createdAt").is_some());
        assert!(json.get("updatedAt").is_some());
    }

    #[test]
    fn test_task_without_description_omits_field() {
        let mut task = sample_task();
        task.description = None;
        let json = serde_json::to_value(&task).unwrap();
        assert!(json.get("description").is_none());

        let back: Task = serde_json::from_value(json).unwrap();
        assert_eq!(back.description, None);
    }

    #[test]
    fn test_task_without_category_deserializes() {
        let mut json = serde_json::to_value(sample_task()).unwrap();
        json.as_object_mut().unwrap().remove("category");

        let task: Task = serde_json::from_value(json).unwrap();
        assert_eq!(task.category, "");
    }

    #[test]
    fn test_status_serialization() {
        assert_eq!(serde_json::to_string(&Status::InProgress).unwrap(), "\"in-progress\"");
        assert_eq!(serde_json::to_string(&Status::Hold).unwrap(), "\"hold\"");
        let status: Status = serde_json::from_str("\"complete\"").unwrap();
        assert_eq!(status, Status::Complete);
    }

    #[test]
    fn test_status_cycle() {
        assert_eq!(Status::Incomplete.next(), Status::InProgress);
        assert_eq!(Status::InProgress.next(), Status::Complete);
        assert_eq!(Status::Complete.next(), Status::Hold);
        assert_eq!(Status::Hold.next(), Status::Incomplete);
    }

    #[test]
    fn test_parse_and_display() {
        assert_eq!("HIGH".parse::<Priority>().unwrap(), Priority::High);
        assert_eq!("in-progress".parse::<Status>().unwrap(), Status::InProgress);
        assert!("urgent".parse::<Priority>().is_err());
        assert!("done".parse::<Status>().is_err());
        assert_eq!(Status::InProgress.to_string(), "in-progress");
        assert_eq!(Priority::Low.to_string(), "low");
    }

    #[test]
    fn test_draft_defaults_from_json() {
        let draft: TaskDraft = serde_json::from_str(r#"{"title":"Milk","dueDate":"2025-02-01"}"#).unwrap();
        assert_eq!(draft.priority, Priority::Medium);
        assert_eq!(draft.status, Status::Incomplete);
        assert_eq!(draft.category, "");
        assert_eq!(draft.description, None);
    }

    #[test]
    fn test_patch_apply_leaves_unset_fields() {
        let mut task = sample_task();
        let before = task.clone();

        TaskPatch::new().status(Status::Complete).apply_to(&mut task);

        assert_eq!(task.status, Status::Complete);
        assert_eq!(task.title, before.title);
        assert_eq!(task.description, before.description);
        assert_eq!(task.due_date, before.due_date);
        assert_eq!(task.priority, before.priority);
        assert_eq!(task.category, before.category);
        assert_eq!(task.updated_at, before.updated_at);
    }

    #[test]
    fn test_patch_clears_description() {
        let mut task = sample_task();
        TaskPatch::new().description(None).apply_to(&mut task);
        assert_eq!(task.description, None);
    }

    #[test]
    fn test_patch_from_draft_overwrites_everything() {
        let mut task = sample_task();
        let draft = TaskDraft::new("Buy milk", date(2025, 3, 1), "3");
        TaskPatch::from(draft).apply_to(&mut task);

        assert_eq!(task.title, "Buy milk");
        assert_eq!(task.description, None);
        assert_eq!(task.due_date, date(2025, 3, 1));
        assert_eq!(task.priority, Priority::Medium);
        assert_eq!(task.category, "3");
        assert_eq!(task.id, "task-1");
    }

    #[test]
    fn test_patch_is_empty() {
        assert!(TaskPatch::new().is_empty());
        assert!(!TaskPatch::new().title("x").is_empty());
    }

    #[test]
    fn test_due_state() {
        let today = date(2025, 1, 10);
        assert_eq!(DueState::classify(date(2025, 1, 9), today), DueState::Overdue);
        assert_eq!(DueState::classify(today, today), DueState::Today);
        assert_eq!(DueState::classify(date(2025, 1, 11), today), DueState::Soon);
        assert_eq!(DueState::classify(date(2025, 1, 13), today), DueState::Soon);
        assert_eq!(DueState::classify(date(2025, 1, 14), today), DueState::Later);
    }

    #[test]
    fn test_default_categories() {
        let categories = default_categories();
        let names: Vec<&str> = categories.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Personal", "Work", "Shopping"]);
        assert_eq!(categories[0].id, "1");
    }
}
