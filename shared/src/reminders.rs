use serde::Serialize;

use taskboard_atoms::tasks::{self, Task};
use taskboard_atoms::users::{self, User};
use taskboard_atoms::reminders as markers;

use crate::email;
use crate::state::AppState;

/// Outcome of one reminder pass. Returned by the instant endpoint and
/// logged by the daily sweep.
#[derive(Debug, Default, Serialize)]
pub struct ReminderRunSummary {
    pub due_date: String,
    /// Logical tasks due on `due_date`, before the membership filter.
    pub scanned: usize,
    pub matched: usize,
    pub sent: usize,
    /// Matches skipped because an earlier run already notified.
    pub suppressed: usize,
}

pub(crate) fn next_day(today: chrono::NaiveDate) -> String {
    (today + chrono::Days::new(1)).format("%Y-%m-%d").to_string()
}

pub fn tomorrow() -> String {
    next_day(chrono::Local::now().date_naive())
}

pub(crate) fn due_for_user<'a>(due_tasks: &'a [Task], user_id: &str) -> Vec<&'a Task> {
    due_tasks.iter().filter(|t| t.involves(user_id)).collect()
}

fn diagnostics_enabled() -> bool {
    std::env::var("REMINDER_DIAGNOSTICS")
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

async fn notify_user(
    state: &AppState,
    table_name: &str,
    user: &User,
    due: &[&Task],
    due_date: &str,
    scanned: usize,
) -> ReminderRunSummary {
    let mut summary = ReminderRunSummary {
        due_date: due_date.to_string(),
        scanned,
        matched: due.len(),
        sent: 0,
        suppressed: 0,
    };

    for task in due {
        let first_time = match markers::mark_reminder_sent(
            &state.dynamo_client,
            table_name,
            &user.user_id,
            &task.task_id,
            due_date,
        )
        .await
        {
            Ok(first_time) => first_time,
            Err(e) => {
                tracing::error!(
                    "reminder marker failed for {} / task {}: {}",
                    user.user_id,
                    task.task_id,
                    e
                );
                continue;
            }
        };
        if !first_time {
            summary.suppressed += 1;
            continue;
        }

        let body = format!("{} is due on {}", task.title, due_date);
        match email::send_reminder_email(&state.ses_client, &user.user_email, "Task due tomorrow", &body)
            .await
        {
            Ok(()) => {
                summary.sent += 1;
                tracing::info!("reminder sent to {} for task {}", user.user_id, task.task_id);
            }
            Err(e) => tracing::error!("reminder email to {} failed: {}", user.user_email, e),
        }
    }

    // Debug-only count notification, off unless REMINDER_DIAGNOSTICS is set.
    if diagnostics_enabled() {
        let body = format!("Checked {} candidate tasks due {}", scanned, due_date);
        if let Err(e) =
            email::send_reminder_email(&state.ses_client, &user.user_email, "Reminder check", &body)
                .await
        {
            tracing::error!("diagnostic email to {} failed: {}", user.user_email, e);
        }
    }

    summary
}

/// Instant check for one signed-in identity (app foreground, right after
/// login).
pub async fn run_check_for_user(
    state: &AppState,
    table_name: &str,
    user_id: &str,
) -> Result<ReminderRunSummary, lambda_http::Error> {
    let due_date = tomorrow();
    let due_tasks = tasks::service::list_tasks_due(&state.dynamo_client, table_name, &due_date)
        .await
        .map_err(|e| e.to_string())?;
    let user = users::service::get_user_record(&state.dynamo_client, table_name, user_id)
        .await?
        .ok_or("user record not found")?;

    let matches = due_for_user(&due_tasks, user_id);
    Ok(notify_user(state, table_name, &user, &matches, &due_date, due_tasks.len()).await)
}

/// Daily sweep over every directory user.
pub async fn run_daily_check(
    state: &AppState,
    table_name: &str,
) -> Result<ReminderRunSummary, lambda_http::Error> {
    let due_date = tomorrow();
    let due_tasks = tasks::service::list_tasks_due(&state.dynamo_client, table_name, &due_date)
        .await
        .map_err(|e| e.to_string())?;
    let directory = users::service::list_user_records(&state.dynamo_client, table_name).await?;

    tracing::info!(
        "reminder sweep: {} tasks due {}, {} directory users",
        due_tasks.len(),
        due_date,
        directory.len()
    );

    let mut total = ReminderRunSummary {
        due_date: due_date.clone(),
        scanned: due_tasks.len(),
        ..Default::default()
    };
    for user in &directory {
        let matches = due_for_user(&due_tasks, &user.user_id);
        if matches.is_empty() && !diagnostics_enabled() {
            continue;
        }
        let summary = notify_user(state, table_name, user, &matches, &due_date, due_tasks.len()).await;
        total.matched += summary.matched;
        total.sent += summary.sent;
        total.suppressed += summary.suppressed;
    }

    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskboard_atoms::tasks::{TaskPriority, TaskStatus};

    fn task(task_id: &str, creator: &str, assigned: &[&str], due: &str) -> Task {
        Task {
            task_id: task_id.to_string(),
            user_id: creator.to_string(),
            creator_id: creator.to_string(),
            title: format!("task {}", task_id),
            description: String::new(),
            due_date: due.to_string(),
            status: TaskStatus::Pending,
            priority: TaskPriority::Low,
            assigned_users: assigned.iter().map(|s| s.to_string()).collect(),
            created_at: String::new(),
            members: vec![],
        }
    }

    #[test]
    fn next_day_rolls_month_and_year_ends() {
        let d = |y, m, d| chrono::NaiveDate::from_ymd_opt(y, m, d).unwrap();
        assert_eq!(next_day(d(2026, 8, 6)), "2026-08-07");
        assert_eq!(next_day(d(2026, 2, 28)), "2026-03-01");
        assert_eq!(next_day(d(2025, 12, 31)), "2026-01-01");
    }

    #[test]
    fn exactly_one_reminder_for_the_fixture() {
        // 5 tasks, 2 due tomorrow, the identity a member of exactly 1 of
        // those 2: the check must surface exactly one task.
        let tomorrow = "2026-08-07";
        let all = vec![
            task("t1", "alice", &["alice", "dave"], tomorrow),
            task("t2", "bob", &["bob", "carol"], tomorrow),
            task("t3", "dave", &["dave"], "2026-08-08"),
            task("t4", "alice", &["alice", "dave"], "2026-09-01"),
            task("t5", "carol", &["carol", "dave"], "2026-08-06"),
        ];

        let due: Vec<Task> = all
            .into_iter()
            .filter(|t| t.due_date == tomorrow)
            .collect();
        assert_eq!(due.len(), 2);

        let for_dave = due_for_user(&due, "dave");
        assert_eq!(for_dave.len(), 1);
        assert_eq!(for_dave[0].task_id, "t1");
    }

    #[test]
    fn creator_is_notified_even_when_not_assigned() {
        let due = vec![task("t1", "alice", &["bob"], "2026-08-07")];
        assert_eq!(due_for_user(&due, "alice").len(), 1);
        assert_eq!(due_for_user(&due, "bob").len(), 1);
        assert!(due_for_user(&due, "carol").is_empty());
    }
}
