use thiserror::Error;

/// Failure taxonomy for task repository operations.
///
/// Fan-out operations write one physical copy per assignee with no
/// cross-write transaction; `PartialFanout` is how a half-applied
/// operation reaches the caller instead of being logged and dropped.
#[derive(Debug, Error)]
pub enum TaskError {
    #[error("task not found")]
    NotFound,

    #[error("invalid due date '{0}', expected YYYY-MM-DD")]
    InvalidDueDate(String),

    #[error("{action} incomplete for task {task_id}: {} of {attempted} copies failed", .failed.len())]
    PartialFanout {
        action: &'static str,
        task_id: String,
        attempted: usize,
        failed: Vec<String>,
    },

    #[error("backend error: {0}")]
    Backend(String),
}
