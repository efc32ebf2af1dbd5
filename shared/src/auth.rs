use std::collections::HashMap;
use std::env;

use aws_sdk_cognitoidentityprovider::types::{AttributeType, AuthFlowType, AuthenticationResultType};
use aws_sdk_cognitoidentityprovider::Client as CognitoClient;
use aws_sdk_dynamodb::Client as DynamoClient;
use base64::Engine;
use hmac::{Hmac, Mac};
use lambda_http::{http::StatusCode, Body, Error, Response};
use serde::Deserialize;
use sha2::Sha256;

use taskboard_atoms::users;

pub const ACCESS_TOKEN_COOKIE: &str = "tb_access";
pub const REFRESH_TOKEN_COOKIE: &str = "tb_refresh";
pub const USERNAME_COOKIE: &str = "tb_username";

const REFRESH_MAX_AGE_SECS: i64 = 30 * 24 * 60 * 60;

const DEFAULT_ORIGIN: &str = "https://taskboard.app";
const ALLOWED_ORIGINS: &[&str] = &[
    "https://taskboard.app",
    "https://www.taskboard.app",
    "http://localhost:5173",
];

/// Identity of an authenticated request, plus any cookies that must be set
/// on the response (refreshed session tokens).
pub struct AuthContext {
    pub user_id: String,
    pub set_cookies: Vec<String>,
}

#[derive(Deserialize)]
struct LoginRequest {
    email: String,
    password: String,
}

#[derive(Deserialize)]
struct SignupRequest {
    name: String,
    email: String,
    password: String,
}

#[derive(Default, Deserialize)]
struct RefreshRequest {
    refresh_token: Option<String>,
    username: Option<String>,
}

pub fn get_cors_origin(request_origin: Option<&str>) -> String {
    match request_origin {
        Some(origin) if ALLOWED_ORIGINS.contains(&origin) => origin.to_string(),
        _ => DEFAULT_ORIGIN.to_string(),
    }
}

/// Cognito SECRET_HASH: HMAC-SHA256(username + client_id) keyed by the app
/// client secret, base64 encoded.
fn secret_hash(username: &str, client_id: &str, client_secret: &str) -> String {
    let mut mac = Hmac::<Sha256>::new_from_slice(client_secret.as_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(username.as_bytes());
    mac.update(client_id.as_bytes());
    base64::engine::general_purpose::STANDARD.encode(mac.finalize().into_bytes())
}

fn session_cookie(name: &str, value: &str, max_age_secs: i64) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; Secure; SameSite=None; Max-Age={}",
        name, value, max_age_secs
    )
}

pub fn clear_cookie(name: &str) -> String {
    format!(
        "{}=; Path=/; HttpOnly; Secure; SameSite=None; Max-Age=0",
        name
    )
}

pub fn clear_session_cookies() -> Vec<String> {
    vec![
        clear_cookie(ACCESS_TOKEN_COOKIE),
        clear_cookie(REFRESH_TOKEN_COOKIE),
        clear_cookie(USERNAME_COOKIE),
    ]
}

fn parse_cookies(header: Option<&str>) -> HashMap<String, String> {
    let mut cookies = HashMap::new();
    if let Some(header) = header {
        for pair in header.split(';') {
            if let Some((name, value)) = pair.trim().split_once('=') {
                cookies.insert(name.to_string(), value.to_string());
            }
        }
    }
    cookies
}

fn session_cookies(tokens: &AuthenticationResultType, username: &str) -> Vec<String> {
    let mut cookies = Vec::new();
    if let Some(access) = tokens.access_token() {
        cookies.push(session_cookie(
            ACCESS_TOKEN_COOKIE,
            access,
            i64::from(tokens.expires_in()),
        ));
    }
    if let Some(refresh) = tokens.refresh_token() {
        cookies.push(session_cookie(
            REFRESH_TOKEN_COOKIE,
            refresh,
            REFRESH_MAX_AGE_SECS,
        ));
    }
    cookies.push(session_cookie(USERNAME_COOKIE, username, REFRESH_MAX_AGE_SECS));
    cookies
}

fn json_with_cookies(
    status: StatusCode,
    body: String,
    cookies: &[String],
) -> Result<Response<Body>, Error> {
    let mut builder = Response::builder()
        .status(status)
        .header("Content-Type", "application/json");
    for cookie in cookies {
        builder = builder.header("Set-Cookie", cookie.as_str());
    }
    Ok(builder.body(body.into()).map_err(Box::new)?)
}

fn auth_required_response() -> Response<Body> {
    Response::builder()
        .status(StatusCode::UNAUTHORIZED)
        .header("Content-Type", "application/json")
        .body(
            serde_json::json!({"error": "Authentication required"})
                .to_string()
                .into(),
        )
        .unwrap_or_else(|_| Response::new(Body::Empty))
}

async fn initiate_password_auth(
    cognito: &CognitoClient,
    client_id: &str,
    client_secret: &str,
    email: &str,
    password: &str,
) -> Result<Option<AuthenticationResultType>, Error> {
    let output = cognito
        .initiate_auth()
        .auth_flow(AuthFlowType::UserPasswordAuth)
        .client_id(client_id)
        .auth_parameters("USERNAME", email)
        .auth_parameters("PASSWORD", password)
        .auth_parameters("SECRET_HASH", secret_hash(email, client_id, client_secret))
        .send()
        .await
        .map_err(|e| format!("Cognito initiate_auth error: {}", e))?;

    Ok(output.authentication_result().cloned())
}

/// Exchange a refresh token for a new access token. Returns the token and
/// the cookies to set on the response.
async fn refresh_session(
    cognito: &CognitoClient,
    client_id: &str,
    client_secret: &str,
    refresh_token: &str,
    username: &str,
) -> Result<(String, Vec<String>), Error> {
    let output = cognito
        .initiate_auth()
        .auth_flow(AuthFlowType::RefreshTokenAuth)
        .client_id(client_id)
        .auth_parameters("REFRESH_TOKEN", refresh_token)
        .auth_parameters(
            "SECRET_HASH",
            secret_hash(username, client_id, client_secret),
        )
        .send()
        .await
        .map_err(|e| format!("Cognito refresh error: {}", e))?;

    let tokens = output
        .authentication_result()
        .ok_or("refresh response carried no tokens")?;
    let access = tokens
        .access_token()
        .ok_or("refresh response carried no access token")?
        .to_string();

    let mut cookies = vec![session_cookie(
        ACCESS_TOKEN_COOKIE,
        &access,
        i64::from(tokens.expires_in()),
    )];
    // Cognito does not rotate the refresh token on this flow; only re-issue
    // it when one actually comes back.
    if let Some(new_refresh) = tokens.refresh_token() {
        cookies.push(session_cookie(
            REFRESH_TOKEN_COOKIE,
            new_refresh,
            REFRESH_MAX_AGE_SECS,
        ));
    }
    cookies.push(session_cookie(USERNAME_COOKIE, username, REFRESH_MAX_AGE_SECS));

    Ok((access, cookies))
}

async fn user_id_for_token(
    cognito: &CognitoClient,
    access_token: &str,
) -> Result<
    String,
    aws_sdk_cognitoidentityprovider::error::SdkError<
        aws_sdk_cognitoidentityprovider::operation::get_user::GetUserError,
    >,
> {
    let output = cognito.get_user().access_token(access_token).send().await?;
    let sub = output
        .user_attributes()
        .iter()
        .find(|attr| attr.name() == "sub")
        .and_then(|attr| attr.value())
        .unwrap_or_else(|| output.username());
    Ok(sub.to_string())
}

/// Authenticate a request from its Cookie header. An expired access token
/// is transparently refreshed when a refresh cookie is present; the new
/// cookies ride back on the response via `AuthContext::set_cookies`.
pub async fn authenticate_cookie_request(
    cognito: &CognitoClient,
    client_id: &str,
    client_secret: &str,
    cookie_header: Option<&str>,
) -> Result<AuthContext, Response<Body>> {
    let cookies = parse_cookies(cookie_header);

    if let Some(access_token) = cookies.get(ACCESS_TOKEN_COOKIE) {
        match user_id_for_token(cognito, access_token).await {
            Ok(user_id) => {
                return Ok(AuthContext {
                    user_id,
                    set_cookies: Vec::new(),
                })
            }
            Err(err) => {
                let expired = err
                    .as_service_error()
                    .is_some_and(|e| e.is_not_authorized_exception());
                if !expired {
                    tracing::error!("access token check failed: {}", err);
                    return Err(auth_required_response());
                }
            }
        }
    }

    let (Some(refresh_token), Some(username)) = (
        cookies.get(REFRESH_TOKEN_COOKIE),
        cookies.get(USERNAME_COOKIE),
    ) else {
        return Err(auth_required_response());
    };

    let (access, set_cookies) =
        match refresh_session(cognito, client_id, client_secret, refresh_token, username).await {
            Ok(refreshed) => refreshed,
            Err(err) => {
                tracing::warn!("session refresh failed: {}", err);
                return Err(auth_required_response());
            }
        };

    match user_id_for_token(cognito, &access).await {
        Ok(user_id) => Ok(AuthContext {
            user_id,
            set_cookies,
        }),
        Err(err) => {
            tracing::error!("refreshed token check failed: {}", err);
            Err(auth_required_response())
        }
    }
}

/// POST /login
pub async fn login(
    cognito: &CognitoClient,
    client_id: &str,
    client_secret: &str,
    body: &[u8],
) -> Result<Response<Body>, Error> {
    let req: LoginRequest = serde_json::from_slice(body)?;

    match initiate_password_auth(cognito, client_id, client_secret, &req.email, &req.password)
        .await
    {
        Ok(Some(tokens)) => {
            let cookies = session_cookies(&tokens, &req.email);
            json_with_cookies(
                StatusCode::OK,
                serde_json::json!({"message": "ok"}).to_string(),
                &cookies,
            )
        }
        Ok(None) => json_with_cookies(
            StatusCode::UNAUTHORIZED,
            serde_json::json!({"error": "Unsupported auth challenge"}).to_string(),
            &[],
        ),
        Err(err) => {
            tracing::warn!("login failed: {}", err);
            json_with_cookies(
                StatusCode::UNAUTHORIZED,
                serde_json::json!({"error": "Invalid email or password"}).to_string(),
                &[],
            )
        }
    }
}

/// POST /signup - Cognito account, directory record, immediate session
pub async fn signup(
    cognito: &CognitoClient,
    dynamo: &DynamoClient,
    table_name: &str,
    client_id: &str,
    client_secret: &str,
    body: &[u8],
) -> Result<Response<Body>, Error> {
    let req: SignupRequest = serde_json::from_slice(body)?;

    let signup_result = cognito
        .sign_up()
        .client_id(client_id)
        .secret_hash(secret_hash(&req.email, client_id, client_secret))
        .username(req.email.as_str())
        .password(req.password.as_str())
        .user_attributes(
            AttributeType::builder()
                .name("email")
                .value(req.email.as_str())
                .build()
                .map_err(Box::new)?,
        )
        .user_attributes(
            AttributeType::builder()
                .name("name")
                .value(req.name.as_str())
                .build()
                .map_err(Box::new)?,
        )
        .send()
        .await;

    let user_sub = match signup_result {
        Ok(output) => output.user_sub().to_string(),
        Err(err) => {
            if err
                .as_service_error()
                .is_some_and(|e| e.is_username_exists_exception())
            {
                return json_with_cookies(
                    StatusCode::CONFLICT,
                    serde_json::json!({"error": "Email already registered"}).to_string(),
                    &[],
                );
            }
            tracing::error!("signup failed: {}", err);
            return json_with_cookies(
                StatusCode::BAD_REQUEST,
                serde_json::json!({"error": "Signup failed"}).to_string(),
                &[],
            );
        }
    };

    // No email-verification flow in this product; confirm the account so the
    // user can sign in immediately.
    let user_pool_id = env::var("COGNITO_USER_POOL_ID").expect("COGNITO_USER_POOL_ID must be set");
    cognito
        .admin_confirm_sign_up()
        .user_pool_id(user_pool_id)
        .username(req.email.as_str())
        .send()
        .await
        .map_err(|e| format!("Cognito admin_confirm_sign_up error: {}", e))?;

    // The Cognito account exists either way; a failed directory write only
    // costs the name in pickers, so log it rather than failing the signup.
    let user =
        match users::service::put_user_record(dynamo, table_name, &user_sub, &req.name, &req.email)
            .await
        {
            Ok(user) => Some(user),
            Err(e) => {
                tracing::error!("failed to write user record for {}: {}", user_sub, e);
                None
            }
        };

    let cookies = match initiate_password_auth(
        cognito,
        client_id,
        client_secret,
        &req.email,
        &req.password,
    )
    .await
    {
        Ok(Some(tokens)) => session_cookies(&tokens, &req.email),
        Ok(None) => Vec::new(),
        Err(err) => {
            tracing::warn!("post-signup login failed: {}", err);
            Vec::new()
        }
    };

    let body = match user {
        Some(user) => serde_json::to_string(&user)?,
        None => serde_json::json!({"user_id": user_sub}).to_string(),
    };
    json_with_cookies(StatusCode::CREATED, body, &cookies)
}

/// POST /refresh
pub async fn refresh_token(
    cognito: &CognitoClient,
    client_id: &str,
    client_secret: &str,
    body: &[u8],
    cookie_header: Option<&str>,
) -> Result<Response<Body>, Error> {
    let req: RefreshRequest = if body.is_empty() {
        RefreshRequest::default()
    } else {
        serde_json::from_slice(body).unwrap_or_default()
    };
    let cookies = parse_cookies(cookie_header);

    let refresh = req
        .refresh_token
        .or_else(|| cookies.get(REFRESH_TOKEN_COOKIE).cloned());
    let username = req
        .username
        .or_else(|| cookies.get(USERNAME_COOKIE).cloned());

    let (Some(refresh), Some(username)) = (refresh, username) else {
        return json_with_cookies(
            StatusCode::UNAUTHORIZED,
            serde_json::json!({"error": "No refresh token"}).to_string(),
            &[],
        );
    };

    match refresh_session(cognito, client_id, client_secret, &refresh, &username).await {
        Ok((_, set_cookies)) => json_with_cookies(
            StatusCode::OK,
            serde_json::json!({"message": "ok"}).to_string(),
            &set_cookies,
        ),
        Err(err) => {
            tracing::warn!("refresh failed: {}", err);
            json_with_cookies(
                StatusCode::UNAUTHORIZED,
                serde_json::json!({"error": "Session expired"}).to_string(),
                &[],
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cookie_header_parses_into_pairs() {
        let cookies = parse_cookies(Some("tb_access=abc; tb_username=alice%40example.com"));
        assert_eq!(cookies.get(ACCESS_TOKEN_COOKIE).unwrap(), "abc");
        assert_eq!(
            cookies.get(USERNAME_COOKIE).unwrap(),
            "alice%40example.com"
        );
        assert!(parse_cookies(None).is_empty());
    }

    #[test]
    fn secret_hash_is_deterministic_and_user_specific() {
        let a = secret_hash("alice@example.com", "client", "secret");
        let b = secret_hash("alice@example.com", "client", "secret");
        let c = secret_hash("bob@example.com", "client", "secret");
        assert_eq!(a, b);
        assert_ne!(a, c);
        // base64 of a 32-byte HMAC-SHA256 digest
        assert_eq!(a.len(), 44);
    }

    #[test]
    fn unknown_origins_fall_back_to_the_default() {
        assert_eq!(
            get_cors_origin(Some("http://localhost:5173")),
            "http://localhost:5173"
        );
        assert_eq!(get_cors_origin(Some("https://evil.example")), DEFAULT_ORIGIN);
        assert_eq!(get_cors_origin(None), DEFAULT_ORIGIN);
    }

    #[test]
    fn session_cookies_are_http_only_and_expiring() {
        let cookie = session_cookie(ACCESS_TOKEN_COOKIE, "tok", 3600);
        assert!(cookie.starts_with("tb_access=tok;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Max-Age=3600"));

        let cleared = clear_cookie(REFRESH_TOKEN_COOKIE);
        assert!(cleared.contains("Max-Age=0"));
        assert_eq!(clear_session_cookies().len(), 3);
    }
}
