#![forbid(unsafe_code)]

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::TaskListError;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Normal,
    High,
}

impl Priority {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Normal => "normal",
            Priority::High => "high",
        }
    }

    /// Next level, wrapping from high back to low.
    #[must_use]
    pub fn cycle(self) -> Self {
        match self {
            Priority::Low => Priority::Normal,
            Priority::Normal => Priority::High,
            Priority::High => Priority::Low,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = TaskListError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "normal" => Ok(Priority::Normal),
            "high" => Ok(Priority::High),
            other => Err(TaskListError::InvalidPriority(other.to_owned())),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    #[serde(alias = "text")]
    pub title: String,
    #[serde(default, alias = "desc")]
    pub description: String,
    #[serde(default)]
    pub done: bool,
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
}

impl Task {
    /// Builds a not-done task stamped with the current time. `title` is stored as given.
    #[must_use]
    pub fn new(id: String, title: String, description: String, priority: Option<Priority>) -> Self {
        Self {
            id,
            title,
            description,
            done: false,
            created_at: now_rfc3339(),
            priority,
        }
    }

    #[must_use]
    pub fn new_id() -> String {
        let id = Uuid::new_v4().simple().to_string();
        id.chars().take(8).collect()
    }

    /// Case-insensitive containment over title and description. `needle` must already be lowercase.
    #[must_use]
    pub fn matches_lowercase(&self, needle: &str) -> bool {
        if needle.is_empty() {
            return true;
        }
        self.title.to_lowercase().contains(needle)
            || self.description.to_lowercase().contains(needle)
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FilterMode {
    #[default]
    All,
    Active,
    Completed,
}

impl FilterMode {
    pub const ALL: [FilterMode; 3] = [FilterMode::All, FilterMode::Active, FilterMode::Completed];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            FilterMode::All => "all",
            FilterMode::Active => "active",
            FilterMode::Completed => "completed",
        }
    }

    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            FilterMode::All => "All",
            FilterMode::Active => "Active",
            FilterMode::Completed => "Completed",
        }
    }

    #[must_use]
    pub fn accepts(self, task: &Task) -> bool {
        match self {
            FilterMode::All => true,
            FilterMode::Active => !task.done,
            FilterMode::Completed => task.done,
        }
    }

    #[must_use]
    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|m| *m == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }
}

impl fmt::Display for FilterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterMode {
    type Err = TaskListError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "all" => Ok(FilterMode::All),
            "active" => Ok(FilterMode::Active),
            "completed" | "done" => Ok(FilterMode::Completed),
            other => Err(TaskListError::InvalidFilter(other.to_owned())),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct TaskStats {
    pub total: usize,
    pub active: usize,
    pub completed: usize,
}

impl TaskStats {
    #[must_use]
    pub fn from_tasks(tasks: &[Task]) -> Self {
        let completed = tasks.iter().filter(|t| t.done).count();
        Self {
            total: tasks.len(),
            active: tasks.len() - completed,
            completed,
        }
    }

    /// Completed share as a rounded percentage; 0 for an empty list.
    #[must_use]
    pub fn progress(&self) -> u8 {
        if self.total == 0 {
            return 0;
        }
        let pct = (self.completed * 200 + self.total) / (self.total * 2);
        u8::try_from(pct.min(100)).unwrap_or(100)
    }
}

#[must_use]
pub fn now_rfc3339() -> String {
    time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_else(|_| "unknown".to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(title: &str, description: &str, done: bool) -> Task {
        let mut t = Task::new(
            Task::new_id(),
            title.to_owned(),
            description.to_owned(),
            None,
        );
        t.done = done;
        t
    }

    #[test]
    fn parses_browser_shaped_records() {
        let raw = r#"[
            {"id":"1700000000000","title":"Buy milk","desc":"2 litres","done":true,"createdAt":"2024-01-01T10:00:00.000Z","priority":"normal"},
            {"id":"1700000000001","text":"Call Bob","done":false,"createdAt":"2024-01-01T11:00:00.000Z"}
        ]"#;
        let tasks: Vec<Task> = serde_json::from_str(raw).unwrap();
        assert_eq!(tasks[0].description, "2 litres");
        assert_eq!(tasks[0].priority, Some(Priority::Normal));
        assert!(tasks[0].done);
        assert_eq!(tasks[1].title, "Call Bob");
        assert_eq!(tasks[1].description, "");
        assert_eq!(tasks[1].priority, None);
    }

    #[test]
    fn serializes_camel_case_and_omits_missing_priority() {
        let t = Task {
            id: "abc".to_owned(),
            title: "x".to_owned(),
            description: String::new(),
            done: false,
            created_at: "2024-01-01T00:00:00Z".to_owned(),
            priority: None,
        };
        let v = serde_json::to_value(&t).unwrap();
        assert_eq!(v["createdAt"], "2024-01-01T00:00:00Z");
        assert!(v.get("priority").is_none());
        assert!(v.get("created_at").is_none());
    }

    #[test]
    fn filter_modes_parse_and_accept() {
        assert_eq!("".parse::<FilterMode>().unwrap(), FilterMode::All);
        assert_eq!(" Active ".parse::<FilterMode>().unwrap(), FilterMode::Active);
        assert_eq!("done".parse::<FilterMode>().unwrap(), FilterMode::Completed);
        assert!("finished".parse::<FilterMode>().is_err());

        let open = task("a", "", false);
        let closed = task("b", "", true);
        assert!(FilterMode::Active.accepts(&open));
        assert!(!FilterMode::Active.accepts(&closed));
        assert!(FilterMode::Completed.accepts(&closed));
        assert!(FilterMode::All.accepts(&open) && FilterMode::All.accepts(&closed));
        assert_eq!(FilterMode::Completed.next(), FilterMode::All);
    }

    #[test]
    fn search_covers_title_and_description() {
        let t = task("Buy Milk", "at the Corner shop", false);
        assert!(t.matches_lowercase("milk"));
        assert!(t.matches_lowercase("corner"));
        assert!(!t.matches_lowercase("bread"));
        assert!(t.matches_lowercase(""));
    }

    #[test]
    fn stats_and_progress() {
        assert_eq!(TaskStats::default().progress(), 0);

        let tasks = vec![task("a", "", true), task("b", "", false), task("c", "", false)];
        let stats = TaskStats::from_tasks(&tasks);
        assert_eq!(stats.total, 3);
        assert_eq!(stats.active, 2);
        assert_eq!(stats.completed, 1);
        assert_eq!(stats.progress(), 33);

        let tasks = vec![task("a", "", true), task("b", "", true), task("c", "", false)];
        assert_eq!(TaskStats::from_tasks(&tasks).progress(), 67);
    }

    #[test]
    fn new_ids_are_short_hex() {
        let id = Task::new_id();
        assert_eq!(id.len(), 8);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
