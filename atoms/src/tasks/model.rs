use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "PENDING",
            TaskStatus::InProgress => "IN_PROGRESS",
            TaskStatus::Completed => "COMPLETED",
        }
    }

    /// Unknown strings fall back to PENDING, matching how legacy records
    /// with missing or malformed status fields are read.
    pub fn parse(s: &str) -> Self {
        match s {
            "IN_PROGRESS" => TaskStatus::InProgress,
            "COMPLETED" => TaskStatus::Completed,
            _ => TaskStatus::Pending,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskPriority {
    #[default]
    Low,
    Medium,
    High,
}

impl TaskPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Low => "LOW",
            TaskPriority::Medium => "MEDIUM",
            TaskPriority::High => "HIGH",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "MEDIUM" => TaskPriority::Medium,
            "HIGH" => TaskPriority::High,
            _ => TaskPriority::Low,
        }
    }
}

/// Task domain model. One logical task is stored as one physical copy per
/// assignee, all sharing the same `task_id`.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Task {
    pub task_id: String,

    /// Namespace owner of the copy this record was read from. Display only;
    /// never consulted for ownership decisions.
    pub user_id: String,

    /// Authoritative owner for delete/ownership decisions.
    pub creator_id: String,

    pub title: String,
    pub description: String,

    /// YYYY-MM-DD, normalized at create/update time.
    pub due_date: String,

    pub status: TaskStatus,
    pub priority: TaskPriority,

    /// Everyone holding a copy of this task, creator included exactly once.
    /// Ordered: collaborators as given, creator appended if absent.
    pub assigned_users: Vec<String>,

    pub created_at: String,

    /// Collaborator display names, filled in by views/worklists when joining
    /// with the user directory
    #[serde(default)]
    pub members: Vec<crate::users::model::Member>,
}

impl Task {
    /// Membership test used by the due-task reminder: assignee or creator.
    pub fn involves(&self, user_id: &str) -> bool {
        self.creator_id == user_id || self.assigned_users.iter().any(|u| u == user_id)
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateTaskPayload {
    /// Optional explicit id so a retried create converges on the same
    /// stored state instead of producing a second task.
    pub task_id: Option<String>,
    pub title: String,
    pub description: String,
    pub due_date: String,
    pub priority: Option<TaskPriority>,
    pub assigned_users: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateTaskPayload {
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<String>,
    pub priority: Option<TaskPriority>,
    pub status: Option<TaskStatus>,
}

/// What an ownership-aware delete actually did.
#[derive(Debug, PartialEq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum DeleteOutcome {
    /// Every copy of the task was deleted.
    Removed,
    /// The acting user left the task; it remains for the listed assignees.
    Withdrawn { remaining: Vec<String> },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_serializes_screaming_snake() {
        assert_eq!(
            serde_json::to_string(&TaskStatus::InProgress).unwrap(),
            "\"IN_PROGRESS\""
        );
        assert_eq!(
            serde_json::from_str::<TaskStatus>("\"COMPLETED\"").unwrap(),
            TaskStatus::Completed
        );
    }

    #[test]
    fn unknown_status_and_priority_fall_back_to_defaults() {
        assert_eq!(TaskStatus::parse("DONE"), TaskStatus::Pending);
        assert_eq!(TaskStatus::parse(""), TaskStatus::Pending);
        assert_eq!(TaskPriority::parse("URGENT"), TaskPriority::Low);
        assert_eq!(TaskPriority::parse("HIGH"), TaskPriority::High);
    }

    #[test]
    fn involves_matches_creator_and_assignees() {
        let task = Task {
            task_id: "t1".into(),
            user_id: "alice".into(),
            creator_id: "alice".into(),
            title: String::new(),
            description: String::new(),
            due_date: "2026-08-07".into(),
            status: TaskStatus::Pending,
            priority: TaskPriority::Low,
            assigned_users: vec!["alice".into(), "bob".into()],
            created_at: String::new(),
            members: vec![],
        };
        assert!(task.involves("alice"));
        assert!(task.involves("bob"));
        assert!(!task.involves("carol"));
    }
}
