//! Mock mail sender for testing.

use crate::error::{IdentityError, Result};
use crate::providers::MailSender;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// A recorded outbound email.
#[derive(Debug, Clone)]
pub struct SentMail {
    /// Recipient address.
    pub to: String,
    /// Subject line.
    pub subject: String,
    /// HTML body.
    pub html_body: String,
}

/// Mock mail sender.
///
/// Records every send instead of delivering. Flip `fail_sends` to
/// simulate provider rejection.
#[derive(Debug, Clone, Default)]
pub struct MockMailSender {
    sent: Arc<Mutex<Vec<SentMail>>>,
    failing: Arc<AtomicBool>,
}

impl MockMailSender {
    /// Create a new mock sender that succeeds.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make all subsequent sends fail.
    pub fn fail_sends(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    /// All mails recorded so far.
    #[must_use]
    pub fn sent(&self) -> Vec<SentMail> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

impl MailSender for MockMailSender {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<String> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(IdentityError::MailSendFailed(
                "simulated provider rejection".to_string(),
            ));
        }

        let mut sent = self
            .sent
            .lock()
            .map_err(|_| IdentityError::InternalError("mail mutex poisoned".to_string()))?;
        sent.push(SentMail {
            to: to.to_string(),
            subject: subject.to_string(),
            html_body: html_body.to_string(),
        });

        Ok(format!("mock-{}", sent.len()))
    }
}
