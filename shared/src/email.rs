use aws_sdk_sesv2::types::{Body as EmailBody, Content, Destination, EmailContent, Message};
use aws_sdk_sesv2::Client as SesClient;

fn from_address() -> String {
    std::env::var("REMINDER_FROM_EMAIL").unwrap_or_else(|_| "reminders@taskboard.app".to_string())
}

/// Deliver one plain-text reminder through SES.
pub async fn send_reminder_email(
    ses_client: &SesClient,
    to_address: &str,
    subject: &str,
    body_text: &str,
) -> Result<(), String> {
    let subject = Content::builder()
        .data(subject)
        .build()
        .map_err(|e| format!("SES content error: {}", e))?;
    let body = Content::builder()
        .data(body_text)
        .build()
        .map_err(|e| format!("SES content error: {}", e))?;
    let message = Message::builder()
        .subject(subject)
        .body(EmailBody::builder().text(body).build())
        .build();

    ses_client
        .send_email()
        .from_email_address(from_address())
        .destination(Destination::builder().to_addresses(to_address).build())
        .content(EmailContent::builder().simple(message).build())
        .send()
        .await
        .map(|_| ())
        .map_err(|e| format!("SES send_email error: {}", e))
}
