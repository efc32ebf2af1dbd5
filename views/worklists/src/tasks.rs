use std::collections::HashMap;

use aws_sdk_dynamodb::Client as DynamoClient;
use lambda_http::{http::StatusCode, Body, Error, Response};

use taskboard_atoms::tasks::{self, CreateTaskPayload, Task, UpdateTaskPayload};
use taskboard_atoms::users::{self, Member, User};
use taskboard_atoms::TaskError;

fn json_response(status: StatusCode, body: String) -> Result<Response<Body>, Error> {
    Ok(Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .body(body.into())
        .map_err(Box::new)?)
}

fn error_response(err: TaskError) -> Result<Response<Body>, Error> {
    match &err {
        TaskError::NotFound => json_response(
            StatusCode::NOT_FOUND,
            serde_json::json!({"error": "Task not found"}).to_string(),
        ),
        TaskError::InvalidDueDate(_) => json_response(
            StatusCode::BAD_REQUEST,
            serde_json::json!({"error": err.to_string()}).to_string(),
        ),
        TaskError::PartialFanout {
            task_id, failed, ..
        } => {
            tracing::error!("{}", err);
            json_response(
                StatusCode::BAD_GATEWAY,
                serde_json::json!({
                    "error": "partial write failure",
                    "task_id": task_id,
                    "failed_users": failed,
                })
                .to_string(),
            )
        }
        TaskError::Backend(_) => {
            tracing::error!("{}", err);
            json_response(
                StatusCode::BAD_GATEWAY,
                serde_json::json!({"error": err.to_string()}).to_string(),
            )
        }
    }
}

/// Resolve assignee ids to directory names. Ids without a directory record
/// (deleted accounts, legacy data) keep the raw id as their display name.
pub(crate) fn attach_members(task_rows: &mut [Task], directory: &[User]) {
    let names: HashMap<&str, &str> = directory
        .iter()
        .map(|u| (u.user_id.as_str(), u.user_name.as_str()))
        .collect();

    for task in task_rows.iter_mut() {
        task.members = task
            .assigned_users
            .iter()
            .map(|id| Member {
                user_id: id.clone(),
                user_name: names
                    .get(id.as_str())
                    .map(|n| n.to_string())
                    .unwrap_or_else(|| id.clone()),
            })
            .collect();
    }
}

/// List the acting user's worklist WITH collaborator names (backend join)
pub async fn list_user_tasks(
    client: &DynamoClient,
    table_name: &str,
    user_id: &str,
) -> Result<Response<Body>, Error> {
    // 1) Tasks and directory in parallel
    let (tasks_result, users_result) = tokio::join!(
        tasks::service::list_tasks_for_user(client, table_name, user_id),
        users::service::list_user_records(client, table_name)
    );

    let mut task_rows = match tasks_result {
        Ok(rows) => rows,
        Err(err) => return error_response(err),
    };
    let directory = users_result
        .map_err(|e| Box::new(std::io::Error::new(std::io::ErrorKind::Other, e))
            as Box<dyn std::error::Error + Send + Sync>)?;

    // 2) Attach names, newest first
    attach_members(&mut task_rows, &directory);
    task_rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    json_response(StatusCode::OK, serde_json::to_string(&task_rows)?)
}

/// Create a task, fanning one copy out per assignee
pub async fn create_task(
    client: &DynamoClient,
    table_name: &str,
    user_id: &str,
    body: &[u8],
) -> Result<Response<Body>, Error> {
    let payload: CreateTaskPayload = serde_json::from_slice(body)?;

    match tasks::service::create_task(client, table_name, user_id, payload).await {
        Ok(task) => json_response(StatusCode::CREATED, serde_json::to_string(&task)?),
        Err(err) => error_response(err),
    }
}

/// Get the acting user's copy of a task
pub async fn get_task(
    client: &DynamoClient,
    table_name: &str,
    user_id: &str,
    task_id: &str,
) -> Result<Response<Body>, Error> {
    match tasks::service::get_task(client, table_name, user_id, task_id).await {
        Ok(task) => json_response(StatusCode::OK, serde_json::to_string(&task)?),
        Err(err) => error_response(err),
    }
}

/// Update a task on every assignee's copy
pub async fn update_task(
    client: &DynamoClient,
    table_name: &str,
    user_id: &str,
    task_id: &str,
    body: &[u8],
) -> Result<Response<Body>, Error> {
    let payload: UpdateTaskPayload = serde_json::from_slice(body)?;

    match tasks::service::update_task(client, table_name, user_id, task_id, payload).await {
        Ok(task) => json_response(StatusCode::OK, serde_json::to_string(&task)?),
        Err(err) => error_response(err),
    }
}

/// Ownership-aware delete; reports whether the task was removed outright or
/// the acting user just left it
pub async fn delete_task(
    client: &DynamoClient,
    table_name: &str,
    user_id: &str,
    task_id: &str,
) -> Result<Response<Body>, Error> {
    match tasks::service::delete_task(client, table_name, user_id, task_id).await {
        Ok(outcome) => json_response(StatusCode::OK, serde_json::to_string(&outcome)?),
        Err(err) => error_response(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskboard_atoms::tasks::{TaskPriority, TaskStatus};

    fn user(id: &str, name: &str) -> User {
        User {
            user_id: id.to_string(),
            user_name: name.to_string(),
            user_email: format!("{}@example.com", id),
            user_created_at: String::new(),
            user_last_login: None,
        }
    }

    #[test]
    fn members_join_keeps_order_and_falls_back_to_ids() {
        let mut rows = vec![Task {
            task_id: "t1".to_string(),
            user_id: "u1".to_string(),
            creator_id: "u1".to_string(),
            title: String::new(),
            description: String::new(),
            due_date: "2026-08-07".to_string(),
            status: TaskStatus::Pending,
            priority: TaskPriority::Low,
            assigned_users: vec!["u2".to_string(), "u1".to_string(), "ghost".to_string()],
            created_at: String::new(),
            members: vec![],
        }];
        let directory = vec![user("u1", "Alice"), user("u2", "Bob")];

        attach_members(&mut rows, &directory);

        let members = &rows[0].members;
        assert_eq!(members.len(), 3);
        assert_eq!(members[0].user_name, "Bob");
        assert_eq!(members[1].user_name, "Alice");
        // no directory record: the raw id doubles as the display name
        assert_eq!(members[2].user_name, "ghost");
    }
}
