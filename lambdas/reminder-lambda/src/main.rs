use std::env;
use std::sync::Arc;

use aws_lambda_events::event::eventbridge::EventBridgeEvent;
use lambda_runtime::{run, service_fn, tracing, Error, LambdaEvent};
use taskboard_shared::{reminders, AppState};

/// EventBridge fires this once a day; the schedule itself lives in infra,
/// the sweep logic in taskboard-shared so the instant HTTP trigger shares
/// it.
async fn function_handler(
    event: LambdaEvent<EventBridgeEvent>,
    state: Arc<AppState>,
) -> Result<(), Error> {
    let table_name = env::var("TABLE_NAME").unwrap_or_else(|_| "taskboard".to_string());
    tracing::info!("reminder sweep triggered by {:?}", event.payload.source);

    let summary = reminders::run_daily_check(&state, &table_name).await?;
    tracing::info!(
        "reminder sweep done for {}: {} scanned, {} matched, {} sent, {} suppressed",
        summary.due_date,
        summary.scanned,
        summary.matched,
        summary.sent,
        summary.suppressed
    );

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing::init_default_subscriber();

    let config = aws_config::load_from_env().await;
    let state = Arc::new(AppState::new(&config));

    run(service_fn(move |event| {
        let state = Arc::clone(&state);
        async move { function_handler(event, state).await }
    }))
    .await
}
