//! Console mail sender for development and testing.

use crate::error::Result;
use crate::providers::MailSender;
use tracing::info;

/// Console mail sender.
///
/// Logs emails instead of sending them. Useful for development where
/// no SMTP relay is configured; every "send" succeeds and returns a
/// synthetic message ID.
#[derive(Clone, Debug, Default)]
pub struct ConsoleMailSender;

impl ConsoleMailSender {
    /// Create a new console mail sender.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl MailSender for ConsoleMailSender {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<String> {
        let message_id = format!("console-{}", uuid::Uuid::new_v4());

        info!(
            to = %to,
            subject = %subject,
            message_id = %message_id,
            "Email (development mode)"
        );
        println!("\n----- EMAIL (development mode) -----");
        println!("To: {to}");
        println!("Subject: {subject}");
        println!("{html_body}");
        println!("------------------------------------\n");

        Ok(message_id)
    }
}
