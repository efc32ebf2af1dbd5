use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct User {
    pub user_id: String,
    pub user_name: String,
    pub user_email: String,
    pub user_created_at: String,
    pub user_last_login: Option<String>,
}

/// Slim directory entry used by the collaborator picker and the worklist
/// name join.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Member {
    pub user_id: String,
    pub user_name: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateUserPayload {
    pub user_name: String,
    pub user_email: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserPayload {
    pub user_name: Option<String>,
}
