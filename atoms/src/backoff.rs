use std::future::Future;
use std::time::Duration;

use aws_sdk_dynamodb::error::SdkError;

const MAX_ATTEMPTS: u32 = 3;
const BASE_DELAY_MS: u64 = 200;

fn is_transient<E>(err: &SdkError<E>) -> bool {
    match err {
        SdkError::DispatchFailure(_) | SdkError::TimeoutError(_) | SdkError::ResponseError(_) => {
            true
        }
        SdkError::ServiceError(ctx) => ctx.raw().status().as_u16() >= 500,
        _ => false,
    }
}

/// Retry a single DynamoDB call on transient failures with doubling delay.
/// Definitive failures (validation, conditional checks, 4xx) pass straight
/// through to the caller.
pub(crate) async fn send_with_retry<T, E, F, Fut>(op_name: &str, mut op: F) -> Result<T, SdkError<E>>
where
    E: std::fmt::Debug,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, SdkError<E>>>,
{
    let mut attempt = 1u32;
    loop {
        match op().await {
            Ok(out) => return Ok(out),
            Err(err) if attempt < MAX_ATTEMPTS && is_transient(&err) => {
                let delay = Duration::from_millis(BASE_DELAY_MS << (attempt - 1));
                tracing::warn!(
                    "{} attempt {} failed, retrying in {:?}: {:?}",
                    op_name,
                    attempt,
                    delay,
                    err
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}
