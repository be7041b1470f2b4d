//! Mail sender trait.

use crate::error::Result;
use std::future::Future;

/// Mail sender.
///
/// This trait abstracts over email delivery (SMTP in production,
/// console in development, a mock in tests). Sends a single HTML email
/// to one recipient and returns the provider's message ID.
pub trait MailSender: Send + Sync {
    /// Send an HTML email to `to`.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError::MailSendFailed` if:
    /// - The address fails to parse
    /// - The provider rejects the message
    /// - The network request fails
    fn send(
        &self,
        to: &str,
        subject: &str,
        html_body: &str,
    ) -> impl Future<Output = Result<String>> + Send;
}
