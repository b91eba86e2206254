//! Mail sender that writes outgoing messages to the log.

use async_trait::async_trait;

use quill_core::ports::{MailError, MailMessage, Mailer};

/// Logs every message instead of delivering it. Stands in for the SMTP
/// collaborator in development and tests.
pub struct LogMailer {
    from: String,
}

impl LogMailer {
    pub fn new(from: impl Into<String>) -> Self {
        Self { from: from.into() }
    }
}

impl Default for LogMailer {
    fn default() -> Self {
        Self::new("noreply@quill.local")
    }
}

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: MailMessage) -> Result<(), MailError> {
        if message.to.is_empty() {
            return Err(MailError::Send("empty recipient".to_string()));
        }

        tracing::info!(
            from = %self.from,
            to = %message.to,
            subject = %message.subject,
            "Outgoing mail:\n{}",
            message.body
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_rejects_empty_recipient() {
        let mailer = LogMailer::default();
        let result = mailer
            .send(MailMessage {
                to: String::new(),
                subject: "hi".to_string(),
                body: "body".to_string(),
            })
            .await;
        assert!(matches!(result, Err(MailError::Send(_))));
    }
}
