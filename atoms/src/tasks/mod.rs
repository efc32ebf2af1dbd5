pub mod model;
pub mod service;

pub use model::{CreateTaskPayload, DeleteOutcome, Task, TaskPriority, TaskStatus, UpdateTaskPayload};
pub use service::*;
