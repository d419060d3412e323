use async_trait::async_trait;
use portal_common::validation::is_valid_email;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Clone, PartialEq)]
pub struct EmailMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Error)]
pub enum MailError {
    #[error("Invalid recipient address: {0}")]
    InvalidRecipient(String),

    #[error("Mail transport failed: {0}")]
    Transport(String),
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<(), MailError>;
}

/// Writes outgoing mail to the log instead of an SMTP relay.
pub struct LoggingMailer;

#[async_trait]
impl Mailer for LoggingMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), MailError> {
        if !is_valid_email(&message.to) {
            return Err(MailError::InvalidRecipient(message.to.clone()));
        }
        info!(
            from = %message.from,
            to = %message.to,
            subject = %message.subject,
            "Email dispatched"
        );
        Ok(())
    }
}
