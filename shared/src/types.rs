// ========== USER ==========
pub use taskboard_atoms::users::model::{CreateUserPayload, Member, UpdateUserPayload, User};

// ========== TASK ==========
pub use taskboard_atoms::tasks::model::{
    CreateTaskPayload, DeleteOutcome, Task, TaskPriority, TaskStatus, UpdateTaskPayload,
};
