use std::collections::HashMap;

use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client as DynamoClient;
use lambda_http::{Body, Error, Response};

use super::model::{CreateUserPayload, UpdateUserPayload, User};
use crate::backoff::send_with_retry;

fn user_key(user_id: &str) -> String {
    format!("USER#{}", user_id)
}

pub(crate) fn user_from_item(item: &HashMap<String, AttributeValue>) -> Option<User> {
    let user_id = item
        .get("PK")?
        .as_s()
        .ok()?
        .strip_prefix("USER#")?
        .to_string();
    let mut user_name = crate::tasks::service::str_attr(item, "user_name");
    let user_email = crate::tasks::service::str_attr(item, "user_email");
    if user_name.trim().is_empty() {
        user_name = user_email.split('@').next().unwrap_or("User").to_string();
    }

    Some(User {
        user_id,
        user_name,
        user_email,
        user_created_at: crate::tasks::service::str_attr(item, "user_created_at"),
        user_last_login: item
            .get("user_last_login")
            .and_then(|v| v.as_s().ok())
            .map(|s| s.to_string()),
    })
}

/// Write the directory record for a freshly signed-up identity.
pub async fn put_user_record(
    client: &DynamoClient,
    table_name: &str,
    user_id: &str,
    user_name: &str,
    user_email: &str,
) -> Result<User, String> {
    let now = chrono::Utc::now().to_rfc3339();
    let pk = user_key(user_id);

    send_with_retry("put_item", || {
        client
            .put_item()
            .table_name(table_name)
            .item("PK", AttributeValue::S(pk.clone()))
            .item("SK", AttributeValue::S(pk.clone()))
            .item("user_name", AttributeValue::S(user_name.to_string()))
            .item("user_email", AttributeValue::S(user_email.to_string()))
            .item("user_created_at", AttributeValue::S(now.clone()))
            .send()
    })
    .await
    .map_err(|e| format!("DynamoDB put_item error: {}", e))?;

    Ok(User {
        user_id: user_id.to_string(),
        user_name: user_name.to_string(),
        user_email: user_email.to_string(),
        user_created_at: now,
        user_last_login: None,
    })
}

pub async fn get_user_record(
    client: &DynamoClient,
    table_name: &str,
    user_id: &str,
) -> Result<Option<User>, String> {
    let pk = user_key(user_id);

    let result = send_with_retry("get_item", || {
        client
            .get_item()
            .table_name(table_name)
            .key("PK", AttributeValue::S(pk.clone()))
            .key("SK", AttributeValue::S(pk.clone()))
            .send()
    })
    .await
    .map_err(|e| format!("DynamoDB get_item error: {}", e))?;

    Ok(result.item().and_then(user_from_item))
}

/// Every directory record, for the collaborator picker and the daily
/// reminder sweep. Paginates the scan to the end.
pub async fn list_user_records(
    client: &DynamoClient,
    table_name: &str,
) -> Result<Vec<User>, String> {
    let mut users = Vec::new();
    let mut start_key: Option<HashMap<String, AttributeValue>> = None;

    loop {
        let result = send_with_retry("scan", || {
            client
                .scan()
                .table_name(table_name)
                .filter_expression("PK = SK AND begins_with(PK, :user_prefix)")
                .expression_attribute_values(":user_prefix", AttributeValue::S("USER#".to_string()))
                .set_exclusive_start_key(start_key.clone())
                .send()
        })
        .await
        .map_err(|e| format!("DynamoDB scan error: {}", e))?;

        users.extend(result.items().iter().filter_map(user_from_item));

        match result.last_evaluated_key() {
            Some(key) if !key.is_empty() => start_key = Some(key.clone()),
            _ => break,
        }
    }

    Ok(users)
}

/// Create the directory record after identity signup.
pub async fn create_user(
    client: &DynamoClient,
    table_name: &str,
    user_id: &str,
    body: &[u8],
) -> Result<Response<Body>, Error> {
    let req: CreateUserPayload = serde_json::from_slice(body)?;

    let user = put_user_record(client, table_name, user_id, &req.user_name, &req.user_email).await?;

    let resp = Response::builder()
        .status(201)
        .header("content-type", "application/json")
        .body(serde_json::to_string(&user)?.into())
        .map_err(Box::new)?;
    Ok(resp)
}

/// Get the current user's directory record, touching last_login on the way.
pub async fn get_user(
    client: &DynamoClient,
    table_name: &str,
    user_id: &str,
) -> Result<Response<Body>, Error> {
    let pk = user_key(user_id);

    match get_user_record(client, table_name, user_id).await? {
        Some(mut user) => {
            let now = chrono::Utc::now().to_rfc3339();
            let _ = client
                .update_item()
                .table_name(table_name)
                .key("PK", AttributeValue::S(pk.clone()))
                .key("SK", AttributeValue::S(pk))
                .update_expression("SET user_last_login = :login")
                .expression_attribute_values(":login", AttributeValue::S(now.clone()))
                .send()
                .await;
            user.user_last_login = Some(now);

            let resp = Response::builder()
                .status(200)
                .header("content-type", "application/json")
                .body(serde_json::to_string(&user)?.into())
                .map_err(Box::new)?;
            Ok(resp)
        }
        None => {
            let resp = Response::builder()
                .status(404)
                .header("content-type", "application/json")
                .body(
                    serde_json::json!({"error": "User not found"})
                        .to_string()
                        .into(),
                )
                .map_err(Box::new)?;
            Ok(resp)
        }
    }
}

/// Update the current user's directory record.
pub async fn update_user(
    client: &DynamoClient,
    table_name: &str,
    user_id: &str,
    body: &[u8],
) -> Result<Response<Body>, Error> {
    let req: UpdateUserPayload = serde_json::from_slice(body)?;
    let pk = user_key(user_id);

    if let Some(name) = req.user_name {
        client
            .update_item()
            .table_name(table_name)
            .key("PK", AttributeValue::S(pk.clone()))
            .key("SK", AttributeValue::S(pk))
            .update_expression("SET #user_name = :user_name")
            .expression_attribute_names("#user_name", "user_name")
            .expression_attribute_values(":user_name", AttributeValue::S(name))
            .send()
            .await
            .map_err(|e| format!("DynamoDB update_item error: {}", e))?;
    }

    get_user(client, table_name, user_id).await
}

/// Directory listing for the collaborator picker.
pub async fn list_users(
    client: &DynamoClient,
    table_name: &str,
) -> Result<Response<Body>, Error> {
    let users = list_user_records(client, table_name).await?;

    let resp = Response::builder()
        .status(200)
        .header("content-type", "application/json")
        .body(serde_json::to_string(&users)?.into())
        .map_err(Box::new)?;
    Ok(resp)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(user_id: &str, name: &str, email: &str) -> HashMap<String, AttributeValue> {
        let pk = format!("USER#{}", user_id);
        let mut item = HashMap::new();
        item.insert("PK".to_string(), AttributeValue::S(pk.clone()));
        item.insert("SK".to_string(), AttributeValue::S(pk));
        item.insert("user_name".to_string(), AttributeValue::S(name.to_string()));
        item.insert(
            "user_email".to_string(),
            AttributeValue::S(email.to_string()),
        );
        item.insert(
            "user_created_at".to_string(),
            AttributeValue::S("2026-08-06T00:00:00+00:00".to_string()),
        );
        item
    }

    #[test]
    fn item_parses_into_user() {
        let user = user_from_item(&item("u1", "Alice", "alice@example.com")).unwrap();
        assert_eq!(user.user_id, "u1");
        assert_eq!(user.user_name, "Alice");
        assert_eq!(user.user_email, "alice@example.com");
        assert!(user.user_last_login.is_none());
    }

    #[test]
    fn blank_name_falls_back_to_email_local_part() {
        let user = user_from_item(&item("u2", "  ", "bob@example.com")).unwrap();
        assert_eq!(user.user_name, "bob");
    }

    #[test]
    fn task_items_are_not_users() {
        let mut it = item("u3", "Carol", "carol@example.com");
        it.insert("PK".to_string(), AttributeValue::S("TASK#t1".to_string()));
        assert!(user_from_item(&it).is_none());
    }
}
