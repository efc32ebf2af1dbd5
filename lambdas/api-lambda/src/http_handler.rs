use std::env;
use std::sync::Arc;

use lambda_http::{
    http::header::{HeaderValue, SET_COOKIE, VARY},
    http::{Method, StatusCode},
    Body, Error, Request, Response,
};
use taskboard_atoms::users;
use taskboard_shared::{auth, reminders, AppState};
use worklists_view::tasks as worklists;

fn with_set_cookies(mut resp: Response<Body>, cookies: &[String]) -> Response<Body> {
    let headers = resp.headers_mut();
    for cookie in cookies {
        if let Ok(v) = HeaderValue::from_str(cookie) {
            headers.append(SET_COOKIE, v);
        }
    }
    resp
}

fn with_cors_headers(mut resp: Response<Body>, request_origin: Option<&str>) -> Response<Body> {
    let cors_origin = auth::get_cors_origin(request_origin);

    let headers = resp.headers_mut();
    headers.insert(
        "Access-Control-Allow-Origin",
        HeaderValue::from_str(&cors_origin)
            .unwrap_or_else(|_| HeaderValue::from_static("https://taskboard.app")),
    );
    headers.insert(
        "Access-Control-Allow-Credentials",
        HeaderValue::from_static("true"),
    );
    headers.insert(
        "Access-Control-Allow-Methods",
        HeaderValue::from_static("GET,POST,PUT,PATCH,DELETE,OPTIONS"),
    );
    headers.insert(
        "Access-Control-Allow-Headers",
        HeaderValue::from_static("Content-Type,Authorization,Cookie"),
    );
    headers.append(VARY, HeaderValue::from_static("Origin"));

    resp
}

fn finalize_response(
    resp: Result<Response<Body>, Error>,
    request_origin: Option<&str>,
    cookies: &[String],
) -> Result<Response<Body>, Error> {
    resp.map(|r| with_cors_headers(with_set_cookies(r, cookies), request_origin))
}

fn not_found() -> Result<Response<Body>, Error> {
    Ok(Response::builder()
        .status(StatusCode::NOT_FOUND)
        .header("Content-Type", "application/json")
        .body(serde_json::json!({"error": "Not found"}).to_string().into())
        .map_err(Box::new)?)
}

fn method_not_allowed() -> Result<Response<Body>, Error> {
    Ok(Response::builder()
        .status(StatusCode::METHOD_NOT_ALLOWED)
        .header("Content-Type", "application/json")
        .body(
            serde_json::json!({"error": "Method not allowed"})
                .to_string()
                .into(),
        )
        .map_err(Box::new)?)
}

fn cognito_app_client() -> (String, String) {
    let client_id = env::var("COGNITO_CLIENT_ID").expect("COGNITO_CLIENT_ID must be set");
    let client_secret =
        env::var("COGNITO_CLIENT_SECRET").expect("COGNITO_CLIENT_SECRET must be set");
    (client_id, client_secret)
}

/// Main Lambda handler - routes requests to auth, user, task, and reminder
/// endpoints
pub(crate) async fn function_handler(
    event: Request,
    state: Arc<AppState>,
) -> Result<Response<Body>, Error> {
    let method = event.method();
    let path = event.uri().path();
    let body = event.body();
    let request_origin = event.headers().get("Origin").and_then(|v| v.to_str().ok());
    let cookie_header = event.headers().get("Cookie").and_then(|v| v.to_str().ok());
    tracing::info!("API Lambda invoked - Method: {} Path: {}", method, path);

    // Handle CORS preflight
    if method == "OPTIONS" {
        let resp = Response::builder()
            .status(StatusCode::OK)
            .body(Body::Empty)
            .map_err(Box::new)?;
        return Ok(with_cors_headers(resp, request_origin));
    }

    // Auth endpoints (no session required)
    if path.starts_with("/login") {
        let (client_id, client_secret) = cognito_app_client();
        return match method {
            &Method::POST => finalize_response(
                auth::login(&state.cognito_client, &client_id, &client_secret, body).await,
                request_origin,
                &[],
            ),
            _ => finalize_response(method_not_allowed(), request_origin, &[]),
        };
    }

    if path.starts_with("/signup") {
        let (client_id, client_secret) = cognito_app_client();
        let table_name = env::var("TABLE_NAME").unwrap_or_else(|_| "taskboard".to_string());
        return match method {
            &Method::POST => finalize_response(
                auth::signup(
                    &state.cognito_client,
                    &state.dynamo_client,
                    &table_name,
                    &client_id,
                    &client_secret,
                    body,
                )
                .await,
                request_origin,
                &[],
            ),
            _ => finalize_response(method_not_allowed(), request_origin, &[]),
        };
    }

    if path.starts_with("/refresh") {
        let (client_id, client_secret) = cognito_app_client();
        return match method {
            &Method::POST => finalize_response(
                auth::refresh_token(
                    &state.cognito_client,
                    &client_id,
                    &client_secret,
                    body,
                    cookie_header,
                )
                .await,
                request_origin,
                &[],
            ),
            _ => finalize_response(method_not_allowed(), request_origin, &[]),
        };
    }

    if path.starts_with("/logout") {
        return match method {
            &Method::POST => {
                let resp = Response::builder()
                    .status(StatusCode::OK)
                    .header("Content-Type", "application/json")
                    .body(serde_json::json!({"message": "ok"}).to_string().into())
                    .map_err(Box::new)?;
                finalize_response(Ok(resp), request_origin, &auth::clear_session_cookies())
            }
            _ => finalize_response(method_not_allowed(), request_origin, &[]),
        };
    }

    // Everything below requires a session (cookie auth + auto-refresh)
    let table_name = env::var("TABLE_NAME").unwrap_or_else(|_| "taskboard".to_string());
    let (client_id, client_secret) = cognito_app_client();

    let auth_ctx = match auth::authenticate_cookie_request(
        &state.cognito_client,
        &client_id,
        &client_secret,
        cookie_header,
    )
    .await
    {
        Ok(ctx) => ctx,
        Err(resp) => return Ok(with_cors_headers(resp, request_origin)),
    };

    let user_id = auth_ctx.user_id.clone();

    // User directory routes
    if path.starts_with("/users") {
        let resp = match (method, path) {
            (&Method::POST, "/users") => {
                users::create_user(&state.dynamo_client, &table_name, &user_id, body).await
            }
            (&Method::GET, "/users") => users::list_users(&state.dynamo_client, &table_name).await,
            (&Method::GET, "/users/me") => {
                users::get_user(&state.dynamo_client, &table_name, &user_id).await
            }
            (&Method::PATCH, "/users/me") => {
                users::update_user(&state.dynamo_client, &table_name, &user_id, body).await
            }
            _ => not_found(),
        };

        return finalize_response(resp, request_origin, &auth_ctx.set_cookies);
    }

    // Task routes (fan-out writes live behind these)
    if path.starts_with("/tasks") {
        let parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        let resp = match (method, parts.as_slice()) {
            // GET /tasks - the acting user's worklist (WITH member names)
            (&Method::GET, ["tasks"]) => {
                worklists::list_user_tasks(&state.dynamo_client, &table_name, &user_id).await
            }
            // POST /tasks - create task (one copy per assignee)
            (&Method::POST, ["tasks"]) => {
                worklists::create_task(&state.dynamo_client, &table_name, &user_id, body).await
            }
            // GET /tasks/{id} - get the acting user's copy
            (&Method::GET, ["tasks", task_id]) => {
                worklists::get_task(&state.dynamo_client, &table_name, &user_id, task_id).await
            }
            // PATCH /tasks/{id} - update every assignee's copy
            (&Method::PATCH, ["tasks", task_id]) => {
                worklists::update_task(&state.dynamo_client, &table_name, &user_id, task_id, body)
                    .await
            }
            // DELETE /tasks/{id} - ownership-aware delete
            (&Method::DELETE, ["tasks", task_id]) => {
                worklists::delete_task(&state.dynamo_client, &table_name, &user_id, task_id).await
            }
            _ => not_found(),
        };

        return finalize_response(resp, request_origin, &auth_ctx.set_cookies);
    }

    // Instant due-task check for the signed-in identity
    if path == "/reminders/run" {
        let resp = match method {
            &Method::POST => match reminders::run_check_for_user(&state, &table_name, &user_id)
                .await
            {
                Ok(summary) => Ok(Response::builder()
                    .status(StatusCode::OK)
                    .header("Content-Type", "application/json")
                    .body(serde_json::to_string(&summary)?.into())
                    .map_err(Box::new)?),
                Err(e) => {
                    tracing::error!("instant reminder check failed: {}", e);
                    Ok(Response::builder()
                        .status(StatusCode::BAD_GATEWAY)
                        .header("Content-Type", "application/json")
                        .body(
                            serde_json::json!({"error": "reminder check failed"})
                                .to_string()
                                .into(),
                        )
                        .map_err(Box::new)?)
                }
            },
            _ => method_not_allowed(),
        };

        return finalize_response(resp, request_origin, &auth_ctx.set_cookies);
    }

    // No matching route
    tracing::warn!("No route matched - Method: {} Path: {}", method, path);
    finalize_response(not_found(), request_origin, &auth_ctx.set_cookies)
}
