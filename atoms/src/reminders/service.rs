use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client as DynamoClient;

use crate::error::TaskError;

/// Record that a reminder for (user, task, due date) went out.
///
/// The conditional put is the seen-set that keeps the daily and instant
/// triggers from notifying twice for the same deadline: the first writer
/// wins, a second attempt fails the condition and reports `false`.
pub async fn mark_reminder_sent(
    client: &DynamoClient,
    table_name: &str,
    user_id: &str,
    task_id: &str,
    due_date: &str,
) -> Result<bool, TaskError> {
    let result = client
        .put_item()
        .table_name(table_name)
        .item("PK", AttributeValue::S(format!("REMINDER#{}", user_id)))
        .item(
            "SK",
            AttributeValue::S(format!("SENT#{}#{}", task_id, due_date)),
        )
        .item(
            "sent_at",
            AttributeValue::S(chrono::Utc::now().to_rfc3339()),
        )
        .condition_expression("attribute_not_exists(PK)")
        .send()
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
        Err(err) => Err(TaskError::Backend(format!(
            "DynamoDB put_item error: {}",
            err
        ))),
    }
}
