use std::collections::{HashMap, HashSet};

use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client as DynamoClient;

use super::model::{CreateTaskPayload, DeleteOutcome, Task, TaskPriority, TaskStatus, UpdateTaskPayload};
use crate::backoff::send_with_retry;
use crate::error::TaskError;

fn task_key(owner_id: &str, task_id: &str) -> (String, String) {
    (format!("USER#{}", owner_id), format!("TASK#{}", task_id))
}

pub(crate) fn str_attr(item: &HashMap<String, AttributeValue>, name: &str) -> String {
    item.get(name)
        .and_then(|v| v.as_s().ok())
        .map(|s| s.to_string())
        .unwrap_or_default()
}

/// Full item for one physical copy of a task under `owner_id`'s namespace.
/// `user_id` is carried by the partition key, not duplicated as an attribute.
pub(crate) fn task_item(task: &Task, owner_id: &str) -> HashMap<String, AttributeValue> {
    let (pk, sk) = task_key(owner_id, &task.task_id);
    let mut item = HashMap::new();
    item.insert("PK".to_string(), AttributeValue::S(pk));
    item.insert("SK".to_string(), AttributeValue::S(sk));
    item.insert(
        "creator_id".to_string(),
        AttributeValue::S(task.creator_id.clone()),
    );
    item.insert("title".to_string(), AttributeValue::S(task.title.clone()));
    item.insert(
        "description".to_string(),
        AttributeValue::S(task.description.clone()),
    );
    item.insert(
        "due_date".to_string(),
        AttributeValue::S(task.due_date.clone()),
    );
    item.insert(
        "status".to_string(),
        AttributeValue::S(task.status.as_str().to_string()),
    );
    item.insert(
        "priority".to_string(),
        AttributeValue::S(task.priority.as_str().to_string()),
    );
    item.insert(
        "assigned_users".to_string(),
        AttributeValue::L(
            task.assigned_users
                .iter()
                .map(|u| AttributeValue::S(u.clone()))
                .collect(),
        ),
    );
    item.insert(
        "created_at".to_string(),
        AttributeValue::S(task.created_at.clone()),
    );
    item
}

pub(crate) fn task_from_item(item: &HashMap<String, AttributeValue>) -> Option<Task> {
    let user_id = item
        .get("PK")?
        .as_s()
        .ok()?
        .strip_prefix("USER#")?
        .to_string();
    let task_id = item
        .get("SK")?
        .as_s()
        .ok()?
        .strip_prefix("TASK#")?
        .to_string();
    let assigned_users = item
        .get("assigned_users")
        .and_then(|v| v.as_l().ok())
        .map(|list| {
            list.iter()
                .filter_map(|v| v.as_s().ok().map(|s| s.to_string()))
                .collect()
        })
        .unwrap_or_default();

    Some(Task {
        task_id,
        user_id,
        creator_id: str_attr(item, "creator_id"),
        title: str_attr(item, "title"),
        description: str_attr(item, "description"),
        due_date: str_attr(item, "due_date"),
        status: TaskStatus::parse(&str_attr(item, "status")),
        priority: TaskPriority::parse(&str_attr(item, "priority")),
        assigned_users,
        created_at: str_attr(item, "created_at"),
        members: vec![],
    })
}

/// Collaborators in input order with duplicates and empty ids dropped,
/// creator appended exactly once.
pub(crate) fn resolve_assignees(creator_id: &str, collaborators: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for id in collaborators {
        if !id.is_empty() && seen.insert(id.as_str()) {
            out.push(id.clone());
        }
    }
    if seen.insert(creator_id) {
        out.push(creator_id.to_string());
    }
    out
}

pub(crate) fn reduce_assignees(assigned: &[String], leaving: &str) -> Vec<String> {
    assigned
        .iter()
        .filter(|u| u.as_str() != leaving)
        .cloned()
        .collect()
}

/// A cross-namespace scan returns every physical copy; collapse to one
/// record per logical task.
pub(crate) fn dedup_by_task_id(tasks: Vec<Task>) -> Vec<Task> {
    let mut seen = HashSet::new();
    tasks
        .into_iter()
        .filter(|t| seen.insert(t.task_id.clone()))
        .collect()
}

pub fn normalize_due_date(raw: &str) -> Result<String, TaskError> {
    chrono::NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(|d| d.format("%Y-%m-%d").to_string())
        .map_err(|_| TaskError::InvalidDueDate(raw.to_string()))
}

type UpdateExpr = (
    Vec<String>,
    HashMap<String, String>,
    HashMap<String, AttributeValue>,
);

pub(crate) fn build_update_expression(payload: &UpdateTaskPayload) -> UpdateExpr {
    let mut update_expr = Vec::new();
    let mut expr_names = HashMap::new();
    let mut expr_values = HashMap::new();

    if let Some(title) = &payload.title {
        update_expr.push("#title = :title".to_string());
        expr_names.insert("#title".to_string(), "title".to_string());
        expr_values.insert(":title".to_string(), AttributeValue::S(title.clone()));
    }

    if let Some(description) = &payload.description {
        update_expr.push("#description = :description".to_string());
        expr_names.insert("#description".to_string(), "description".to_string());
        expr_values.insert(
            ":description".to_string(),
            AttributeValue::S(description.clone()),
        );
    }

    if let Some(due_date) = &payload.due_date {
        update_expr.push("#due_date = :due_date".to_string());
        expr_names.insert("#due_date".to_string(), "due_date".to_string());
        expr_values.insert(":due_date".to_string(), AttributeValue::S(due_date.clone()));
    }

    if let Some(priority) = payload.priority {
        update_expr.push("#priority = :priority".to_string());
        expr_names.insert("#priority".to_string(), "priority".to_string());
        expr_values.insert(
            ":priority".to_string(),
            AttributeValue::S(priority.as_str().to_string()),
        );
    }

    if let Some(status) = payload.status {
        update_expr.push("#status = :status".to_string());
        expr_names.insert("#status".to_string(), "status".to_string());
        expr_values.insert(
            ":status".to_string(),
            AttributeValue::S(status.as_str().to_string()),
        );
    }

    (update_expr, expr_names, expr_values)
}

fn check_fanout(
    action: &'static str,
    task_id: &str,
    attempted: usize,
    failed: Vec<String>,
) -> Result<(), TaskError> {
    if failed.is_empty() {
        return Ok(());
    }
    if failed.len() == attempted {
        return Err(TaskError::Backend(format!(
            "{} failed for every copy of task {}",
            action, task_id
        )));
    }
    Err(TaskError::PartialFanout {
        action,
        task_id: task_id.to_string(),
        attempted,
        failed,
    })
}

async fn put_task_copy(
    client: &DynamoClient,
    table_name: &str,
    owner_id: &str,
    task: &Task,
) -> Result<(), String> {
    let item = task_item(task, owner_id);
    send_with_retry("put_item", || {
        client
            .put_item()
            .table_name(table_name)
            .set_item(Some(item.clone()))
            .send()
    })
    .await
    .map(|_| ())
    .map_err(|e| format!("DynamoDB put_item error: {}", e))
}

async fn delete_task_copy(
    client: &DynamoClient,
    table_name: &str,
    owner_id: &str,
    task_id: &str,
) -> Result<(), String> {
    let (pk, sk) = task_key(owner_id, task_id);
    send_with_retry("delete_item", || {
        client
            .delete_item()
            .table_name(table_name)
            .key("PK", AttributeValue::S(pk.clone()))
            .key("SK", AttributeValue::S(sk.clone()))
            .send()
    })
    .await
    .map(|_| ())
    .map_err(|e| format!("DynamoDB delete_item error: {}", e))
}

/// Apply a prebuilt update expression to one copy. Returns Ok(false) when
/// the copy does not exist (skew left by an earlier partial failure) so the
/// caller can log it without treating it as a write failure.
async fn update_task_copy(
    client: &DynamoClient,
    table_name: &str,
    owner_id: &str,
    task_id: &str,
    update_expr: &[String],
    expr_names: &HashMap<String, String>,
    expr_values: &HashMap<String, AttributeValue>,
) -> Result<bool, String> {
    let (pk, sk) = task_key(owner_id, task_id);
    let update_expression = format!("SET {}", update_expr.join(", "));

    let result = send_with_retry("update_item", || {
        let mut builder = client
            .update_item()
            .table_name(table_name)
            .key("PK", AttributeValue::S(pk.clone()))
            .key("SK", AttributeValue::S(sk.clone()))
            .update_expression(update_expression.clone())
            .condition_expression("attribute_exists(PK)");

        for (k, v) in expr_names {
            builder = builder.expression_attribute_names(k.clone(), v.clone());
        }
        for (k, v) in expr_values {
            builder = builder.expression_attribute_values(k.clone(), v.clone());
        }

        builder.send()
    })
    .await;

    match result {
        Ok(_) => Ok(true),
        Err(err)
            if err
                .as_service_error()
                .is_some_and(|e| e.is_conditional_check_failed_exception()) =>
        {
            Ok(false)
        }
        Err(err) => Err(format!("DynamoDB update_item error: {}", err)),
    }
}

async fn set_assigned_users_copy(
    client: &DynamoClient,
    table_name: &str,
    owner_id: &str,
    task_id: &str,
    assigned: &[String],
) -> Result<bool, String> {
    let update_expr = vec!["#assigned_users = :assigned_users".to_string()];
    let mut expr_names = HashMap::new();
    expr_names.insert("#assigned_users".to_string(), "assigned_users".to_string());
    let mut expr_values = HashMap::new();
    expr_values.insert(
        ":assigned_users".to_string(),
        AttributeValue::L(assigned.iter().map(|u| AttributeValue::S(u.clone())).collect()),
    );
    update_task_copy(
        client,
        table_name,
        owner_id,
        task_id,
        &update_expr,
        &expr_names,
        &expr_values,
    )
    .await
}

/// Create a task and fan one copy out to every assignee's namespace.
///
/// Writes are issued independently; a failed copy is collected, not rolled
/// back. Some copies failing surfaces as `PartialFanout`, all failing as
/// `Backend`.
pub async fn create_task(
    client: &DynamoClient,
    table_name: &str,
    creator_id: &str,
    payload: CreateTaskPayload,
) -> Result<Task, TaskError> {
    let due_date = normalize_due_date(&payload.due_date)?;
    let task_id = payload
        .task_id
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    let assigned_users =
        resolve_assignees(creator_id, payload.assigned_users.as_deref().unwrap_or(&[]));
    let now = chrono::Utc::now().to_rfc3339();

    let task = Task {
        task_id,
        user_id: creator_id.to_string(),
        creator_id: creator_id.to_string(),
        title: payload.title,
        description: payload.description,
        due_date,
        status: TaskStatus::Pending,
        priority: payload.priority.unwrap_or_default(),
        assigned_users,
        created_at: now,
        members: vec![],
    };

    let mut failed = Vec::new();
    for owner_id in &task.assigned_users {
        if let Err(e) = put_task_copy(client, table_name, owner_id, &task).await {
            tracing::error!("failed to write copy of task {} for {}: {}", task.task_id, owner_id, e);
            failed.push(owner_id.clone());
        }
    }
    check_fanout("create", &task.task_id, task.assigned_users.len(), failed)?;

    Ok(task)
}

/// Get the copy stored under `owner_id`'s namespace.
pub async fn get_task(
    client: &DynamoClient,
    table_name: &str,
    owner_id: &str,
    task_id: &str,
) -> Result<Task, TaskError> {
    let (pk, sk) = task_key(owner_id, task_id);

    let result = send_with_retry("get_item", || {
        client
            .get_item()
            .table_name(table_name)
            .key("PK", AttributeValue::S(pk.clone()))
            .key("SK", AttributeValue::S(sk.clone()))
            .send()
    })
    .await
    .map_err(|e| TaskError::Backend(format!("DynamoDB get_item error: {}", e)))?;

    match result.item() {
        Some(item) => task_from_item(item)
            .ok_or_else(|| TaskError::Backend(format!("malformed task record {}", task_id))),
        None => Err(TaskError::NotFound),
    }
}

/// All task copies stored under one user's namespace.
pub async fn list_tasks_for_user(
    client: &DynamoClient,
    table_name: &str,
    owner_id: &str,
) -> Result<Vec<Task>, TaskError> {
    let pk = format!("USER#{}", owner_id);

    let result = send_with_retry("query", || {
        client
            .query()
            .table_name(table_name)
            .key_condition_expression("PK = :pk AND begins_with(SK, :sk_prefix)")
            .expression_attribute_values(":pk", AttributeValue::S(pk.clone()))
            .expression_attribute_values(":sk_prefix", AttributeValue::S("TASK#".to_string()))
            .send()
    })
    .await
    .map_err(|e| TaskError::Backend(format!("DynamoDB query error: {}", e)))?;

    Ok(result.items().iter().filter_map(task_from_item).collect())
}

/// Every logical task due on `due_date`, across all user namespaces.
/// The scan sees one item per physical copy; results are deduplicated by
/// task id. Paginates to the end so a reminder sweep never misses tasks
/// past the first page.
pub async fn list_tasks_due(
    client: &DynamoClient,
    table_name: &str,
    due_date: &str,
) -> Result<Vec<Task>, TaskError> {
    let mut items: Vec<HashMap<String, AttributeValue>> = Vec::new();
    let mut start_key: Option<HashMap<String, AttributeValue>> = None;

    loop {
        let result = send_with_retry("scan", || {
            client
                .scan()
                .table_name(table_name)
                .filter_expression("begins_with(SK, :sk_prefix) AND due_date = :due")
                .expression_attribute_values(":sk_prefix", AttributeValue::S("TASK#".to_string()))
                .expression_attribute_values(":due", AttributeValue::S(due_date.to_string()))
                .set_exclusive_start_key(start_key.clone())
                .send()
        })
        .await
        .map_err(|e| TaskError::Backend(format!("DynamoDB scan error: {}", e)))?;

        items.extend_from_slice(result.items());

        match result.last_evaluated_key() {
            Some(key) if !key.is_empty() => start_key = Some(key.clone()),
            _ => break,
        }
    }

    Ok(dedup_by_task_id(
        items.iter().filter_map(task_from_item).collect(),
    ))
}

/// Overwrite the supplied fields on every assignee's copy so all views of
/// the task stay consistent. Returns the acting user's refreshed copy.
pub async fn update_task(
    client: &DynamoClient,
    table_name: &str,
    acting_user_id: &str,
    task_id: &str,
    mut payload: UpdateTaskPayload,
) -> Result<Task, TaskError> {
    if let Some(raw) = &payload.due_date {
        payload.due_date = Some(normalize_due_date(raw)?);
    }

    let current = get_task(client, table_name, acting_user_id, task_id).await?;

    let (update_expr, expr_names, expr_values) = build_update_expression(&payload);
    if update_expr.is_empty() {
        return Ok(current);
    }

    let mut failed = Vec::new();
    for owner_id in &current.assigned_users {
        match update_task_copy(
            client,
            table_name,
            owner_id,
            task_id,
            &update_expr,
            &expr_names,
            &expr_values,
        )
        .await
        {
            Ok(true) => {}
            Ok(false) => {
                tracing::warn!("no copy of task {} under {}, skipping update", task_id, owner_id)
            }
            Err(e) => {
                tracing::error!("failed to update copy of task {} for {}: {}", task_id, owner_id, e);
                failed.push(owner_id.clone());
            }
        }
    }
    check_fanout("update", task_id, current.assigned_users.len(), failed)?;

    get_task(client, table_name, acting_user_id, task_id).await
}

/// Ownership-aware delete.
///
/// The creator removes the task for everyone. A non-creator removes
/// themselves: the authoritative copy under the creator's namespace is
/// shrunk (and every surviving copy kept in step), and the actor's own
/// copy is deleted. A shrink that empties `assigned_users` deletes the
/// task outright.
pub async fn delete_task(
    client: &DynamoClient,
    table_name: &str,
    acting_user_id: &str,
    task_id: &str,
) -> Result<DeleteOutcome, TaskError> {
    let own_copy = get_task(client, table_name, acting_user_id, task_id).await?;

    if own_copy.creator_id == acting_user_id {
        let mut owners = own_copy.assigned_users.clone();
        if !owners.iter().any(|o| o == acting_user_id) {
            owners.push(acting_user_id.to_string());
        }

        let mut failed = Vec::new();
        for owner_id in &owners {
            if let Err(e) = delete_task_copy(client, table_name, owner_id, task_id).await {
                tracing::error!("failed to delete copy of task {} for {}: {}", task_id, owner_id, e);
                failed.push(owner_id.clone());
            }
        }
        check_fanout("delete", task_id, owners.len(), failed)?;
        return Ok(DeleteOutcome::Removed);
    }

    match get_task(client, table_name, &own_copy.creator_id, task_id).await {
        Ok(creator_copy) => {
            let remaining = reduce_assignees(&creator_copy.assigned_users, acting_user_id);

            if remaining.is_empty() {
                let mut failed = Vec::new();
                for owner_id in [own_copy.creator_id.as_str(), acting_user_id] {
                    if let Err(e) = delete_task_copy(client, table_name, owner_id, task_id).await {
                        tracing::error!(
                            "failed to delete copy of task {} for {}: {}",
                            task_id,
                            owner_id,
                            e
                        );
                        failed.push(owner_id.to_string());
                    }
                }
                check_fanout("delete", task_id, 2, failed)?;
                return Ok(DeleteOutcome::Removed);
            }

            // The creator's copy stays authoritative even when the creator
            // is no longer in the assignee list.
            let mut owners = remaining.clone();
            if !owners.iter().any(|o| o == &own_copy.creator_id) {
                owners.push(own_copy.creator_id.clone());
            }

            let mut failed = Vec::new();
            for owner_id in &owners {
                match set_assigned_users_copy(client, table_name, owner_id, task_id, &remaining)
                    .await
                {
                    Ok(true) => {}
                    Ok(false) => {
                        tracing::warn!("no copy of task {} under {}, skipping shrink", task_id, owner_id)
                    }
                    Err(e) => {
                        tracing::error!(
                            "failed to shrink copy of task {} for {}: {}",
                            task_id,
                            owner_id,
                            e
                        );
                        failed.push(owner_id.clone());
                    }
                }
            }

            let attempted = owners.len() + 1;
            if let Err(e) = delete_task_copy(client, table_name, acting_user_id, task_id).await {
                tracing::error!(
                    "failed to delete copy of task {} for {}: {}",
                    task_id,
                    acting_user_id,
                    e
                );
                failed.push(acting_user_id.to_string());
            }
            check_fanout("unassign", task_id, attempted, failed)?;

            Ok(DeleteOutcome::Withdrawn { remaining })
        }
        Err(TaskError::NotFound) => {
            // Authoritative copy already gone; just drop ours.
            delete_task_copy(client, table_name, acting_user_id, task_id)
                .await
                .map_err(TaskError::Backend)?;
            Ok(DeleteOutcome::Removed)
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_task(task_id: &str, creator: &str, assigned: &[&str], due: &str) -> Task {
        Task {
            task_id: task_id.to_string(),
            user_id: creator.to_string(),
            creator_id: creator.to_string(),
            title: format!("task {}", task_id),
            description: "do the thing".to_string(),
            due_date: due.to_string(),
            status: TaskStatus::Pending,
            priority: TaskPriority::Medium,
            assigned_users: assigned.iter().map(|s| s.to_string()).collect(),
            created_at: "2026-08-06T00:00:00+00:00".to_string(),
            members: vec![],
        }
    }

    #[test]
    fn resolve_assignees_appends_creator_once() {
        let collaborators = vec!["bob".to_string(), "carol".to_string()];
        assert_eq!(
            resolve_assignees("alice", &collaborators),
            vec!["bob", "carol", "alice"]
        );
    }

    #[test]
    fn resolve_assignees_dedups_creator_and_collaborators() {
        let collaborators = vec![
            "bob".to_string(),
            "alice".to_string(),
            "bob".to_string(),
            String::new(),
        ];
        assert_eq!(
            resolve_assignees("alice", &collaborators),
            vec!["bob", "alice"]
        );
    }

    #[test]
    fn reduce_assignees_removes_only_the_leaver() {
        let assigned = vec!["alice".to_string(), "bob".to_string(), "carol".to_string()];
        assert_eq!(reduce_assignees(&assigned, "bob"), vec!["alice", "carol"]);
        assert_eq!(
            reduce_assignees(&["alice".to_string(), "bob".to_string()], "bob"),
            vec!["alice"]
        );
        assert!(reduce_assignees(&["bob".to_string()], "bob").is_empty());
    }

    #[test]
    fn fanout_copies_share_everything_but_the_namespace() {
        let task = sample_task("t1", "alice", &["bob", "carol", "alice"], "2026-08-07");
        let copies: Vec<_> = task
            .assigned_users
            .iter()
            .map(|owner| task_item(&task, owner))
            .collect();

        assert_eq!(copies.len(), 3);
        for (owner, item) in task.assigned_users.iter().zip(&copies) {
            assert_eq!(
                item.get("PK").unwrap().as_s().unwrap(),
                &format!("USER#{}", owner)
            );
            assert_eq!(item.get("SK").unwrap().as_s().unwrap(), "TASK#t1");
            assert_eq!(item.get("title").unwrap().as_s().unwrap(), "task t1");
            assert_eq!(item.get("due_date").unwrap().as_s().unwrap(), "2026-08-07");
        }
    }

    #[test]
    fn item_round_trips_through_task() {
        let task = sample_task("t2", "alice", &["bob", "alice"], "2026-09-01");
        let item = task_item(&task, "bob");
        let parsed = task_from_item(&item).unwrap();

        assert_eq!(parsed.task_id, "t2");
        assert_eq!(parsed.user_id, "bob");
        assert_eq!(parsed.creator_id, "alice");
        assert_eq!(parsed.title, task.title);
        assert_eq!(parsed.description, task.description);
        assert_eq!(parsed.due_date, "2026-09-01");
        assert_eq!(parsed.status, TaskStatus::Pending);
        assert_eq!(parsed.priority, TaskPriority::Medium);
        assert_eq!(parsed.assigned_users, vec!["bob", "alice"]);
        assert_eq!(parsed.created_at, task.created_at);
    }

    #[test]
    fn item_without_task_sort_key_is_rejected() {
        let mut item = task_item(&sample_task("t3", "alice", &["alice"], "2026-09-01"), "alice");
        item.insert("SK".to_string(), AttributeValue::S("USER#alice".to_string()));
        assert!(task_from_item(&item).is_none());
    }

    #[test]
    fn dedup_collapses_copies_of_the_same_logical_task() {
        let tasks = vec![
            sample_task("t1", "alice", &["alice", "bob"], "2026-08-07"),
            sample_task("t1", "alice", &["alice", "bob"], "2026-08-07"),
            sample_task("t2", "bob", &["bob"], "2026-08-07"),
        ];
        let deduped = dedup_by_task_id(tasks);
        assert_eq!(deduped.len(), 2);
        assert_eq!(deduped[0].task_id, "t1");
        assert_eq!(deduped[1].task_id, "t2");
    }

    #[test]
    fn update_expression_covers_exactly_the_supplied_fields() {
        let payload = UpdateTaskPayload {
            title: Some("new title".to_string()),
            status: Some(TaskStatus::InProgress),
            ..Default::default()
        };
        let (expr, names, values) = build_update_expression(&payload);

        assert_eq!(expr, vec!["#title = :title", "#status = :status"]);
        assert_eq!(names.get("#status").unwrap(), "status");
        assert_eq!(
            values.get(":status").unwrap().as_s().unwrap(),
            "IN_PROGRESS"
        );
        assert!(!names.contains_key("#priority"));
    }

    #[test]
    fn empty_update_builds_no_expression() {
        let (expr, names, values) = build_update_expression(&UpdateTaskPayload::default());
        assert!(expr.is_empty());
        assert!(names.is_empty());
        assert!(values.is_empty());
    }

    #[test]
    fn due_dates_are_normalized_or_rejected() {
        assert_eq!(normalize_due_date("2026-08-07").unwrap(), "2026-08-07");
        assert!(matches!(
            normalize_due_date("07/08/2026"),
            Err(TaskError::InvalidDueDate(_))
        ));
        assert!(matches!(
            normalize_due_date("2026-02-30"),
            Err(TaskError::InvalidDueDate(_))
        ));
    }

    #[test]
    fn partial_and_total_fanout_failures_are_distinguished() {
        assert!(check_fanout("create", "t1", 3, vec![]).is_ok());
        assert!(matches!(
            check_fanout("create", "t1", 3, vec!["bob".to_string()]),
            Err(TaskError::PartialFanout { attempted: 3, .. })
        ));
        assert!(matches!(
            check_fanout(
                "create",
                "t1",
                2,
                vec!["alice".to_string(), "bob".to_string()]
            ),
            Err(TaskError::Backend(_))
        ));
    }
}
