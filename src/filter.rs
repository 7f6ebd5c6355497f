// Query filtering and ordering for tasks

use crate::models::{Status, Task};
use eyre::{Result, eyre};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Ordering applied to a query result
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    /// Earliest due date first
    #[default]
    DueDate,
    /// high, medium, low
    Priority,
    /// in-progress, incomplete, hold, complete
    Status,
}

impl SortKey {
    pub fn compare(self, a: &Task, b: &Task) -> Ordering {
        match self {
            SortKey::DueDate => a.due_date.cmp(&b.due_date),
            SortKey::Priority => a.priority.rank().cmp(&b.priority.rank()),
            SortKey::Status => a.status.rank().cmp(&b.status.rank()),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortKey::DueDate => write!(f, "due-date"),
            SortKey::Priority => write!(f, "priority"),
            SortKey::Status => write!(f, "status"),
        }
    }
}

impl FromStr for SortKey {
    type Err = eyre::Report;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "due-date" | "duedate" | "due_date" | "due" => Ok(SortKey::DueDate),
            "priority" => Ok(SortKey::Priority),
            "status" => Ok(SortKey::Status),
            other => Err(eyre!("Unknown sort key: {} (expected due-date, priority or status)", other)),
        }
    }
}

/// Filter text, optional category/status, and a sort key
///
/// Absent filters match everything. An empty category string counts as absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskQuery {
    pub text: String,
    pub category: Option<String>,
    pub status: Option<Status>,
    pub sort: SortKey,
}

impl TaskQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn status(mut self, status: Status) -> Self {
        self.status = Some(status);
        self
    }

    pub fn sort(mut self, sort: SortKey) -> Self {
        self.sort = sort;
        self
    }

    /// Inclusion test: case-insensitive title substring, then exact category and status
    pub fn matches(&self, task: &Task) -> bool {
        let needle = self.text.to_lowercase();
        self.matches_lowered(task, &needle)
    }

    /// Filter then stable-sort; `tasks` is left untouched
    pub fn apply<'a>(&self, tasks: &'a [Task]) -> Vec<&'a Task> {
        let needle = self.text.to_lowercase();
        let mut view: Vec<&Task> = tasks.iter().filter(|t| self.matches_lowered(t, &needle)).collect();
        // sort_by is stable, so ties keep collection order
        view.sort_by(|a, b| self.sort.compare(a, b));
        view
    }

    fn matches_lowered(&self, task: &Task, needle: &str) -> bool {
        if !needle.is_empty() && !task.title.to_lowercase().contains(needle) {
            return false;
        }
        if let Some(category) = self.category.as_deref() {
            if !category.is_empty() && task.category != category {
                return false;
            }
        }
        if let Some(status) = self.status {
            if task.status != status {
                return false;
            }
        }
        true
    }
}
