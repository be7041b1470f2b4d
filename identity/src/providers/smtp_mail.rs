//! SMTP mail sender implementation using Lettre.

use crate::error::{IdentityError, Result};
use crate::providers::MailSender;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};

/// SMTP mail sender using Lettre.
///
/// Sends real emails via an authenticated SMTP relay, suitable for
/// production use.
///
/// # Examples
///
/// ```ignore
/// use studia_identity::providers::SmtpMailSender;
///
/// let sender = SmtpMailSender::new(
///     "smtp.example.com".to_string(),
///     587,
///     "noreply@studia.app".to_string(),
///     "app_password".to_string(),
///     "noreply@studia.app".to_string(),
///     "Studia".to_string(),
/// );
/// ```
#[derive(Clone)]
pub struct SmtpMailSender {
    /// SMTP server address.
    smtp_server: String,

    /// SMTP server port.
    smtp_port: u16,

    /// SMTP credentials.
    credentials: Credentials,

    /// Sender email address.
    from_email: String,

    /// Sender display name.
    from_name: String,
}

impl SmtpMailSender {
    /// Create a new SMTP mail sender.
    #[must_use]
    pub fn new(
        smtp_server: String,
        smtp_port: u16,
        smtp_username: String,
        smtp_password: String,
        from_email: String,
        from_name: String,
    ) -> Self {
        let credentials = Credentials::new(smtp_username, smtp_password);

        Self {
            smtp_server,
            smtp_port,
            credentials,
            from_email,
            from_name,
        }
    }

    /// Build the SMTP transport.
    ///
    /// A fresh transport per send avoids connection pooling issues.
    fn build_transport(&self) -> Result<SmtpTransport> {
        let transport = SmtpTransport::relay(&self.smtp_server)
            .map_err(|e| IdentityError::MailSendFailed(format!("SMTP relay error: {e}")))?
            .port(self.smtp_port)
            .credentials(self.credentials.clone())
            .build();

        Ok(transport)
    }

    /// Build the "From" header.
    fn from_header(&self) -> String {
        format!("{} <{}>", self.from_name, self.from_email)
    }
}

impl MailSender for SmtpMailSender {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<String> {
        let email = Message::builder()
            .from(
                self.from_header()
                    .parse()
                    .map_err(|e| IdentityError::MailSendFailed(format!("Invalid from address: {e}")))?,
            )
            .to(to
                .parse()
                .map_err(|e| IdentityError::MailSendFailed(format!("Invalid to address: {e}")))?)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html_body.to_string())
            .map_err(|e| IdentityError::MailSendFailed(format!("Failed to build email: {e}")))?;

        let mailer = self.build_transport()?;

        // SmtpTransport::send is blocking; keep it off the async worker threads.
        let response = tokio::task::spawn_blocking(move || {
            mailer
                .send(&email)
                .map_err(|e| IdentityError::MailSendFailed(format!("Failed to send email: {e}")))
        })
        .await
        .map_err(|e| IdentityError::MailSendFailed(format!("Email task failed: {e}")))??;

        let message_id = response
            .message()
            .next()
            .unwrap_or_default()
            .to_string();

        Ok(message_id)
    }
}
