//! Outbound mail transport.

use async_trait::async_trait;
use lettre::{
    Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, MultiPart, SinglePart, header::ContentType},
    transport::smtp::{Error as SmtpError, authentication::Credentials},
};
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use crate::config::MailConfig;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("SMTP error: {0}")]
    Smtp(#[from] SmtpError),

    #[error("Failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    #[error("Invalid email address: {0}")]
    InvalidAddress(String),
}

/// A rendered message with plain-text and HTML alternatives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMail {
    pub to: String,
    pub reply_to: Option<String>,
    pub subject: String,
    pub text: String,
    pub html: String,
}

#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, mail: &OutboundMail) -> Result<(), MailError>;
}

fn parse_address(raw: &str) -> Result<Address, MailError> {
    raw.trim()
        .parse()
        .map_err(|_| MailError::InvalidAddress(raw.to_string()))
}

/// SMTP relay over STARTTLS.
#[derive(Clone)]
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(config: &MailConfig, sender_name: &str) -> Result<Self, MailError> {
        let credentials =
            Credentials::new(config.smtp_username.clone(), config.smtp_password.clone());

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(credentials)
            .timeout(Some(Duration::from_secs(config.timeout_seconds)))
            .build();

        let from = Mailbox::new(
            Some(sender_name.to_string()),
            parse_address(&config.from_address)?,
        );

        Ok(Self { transport, from })
    }
}

#[async_trait]
impl MailTransport for SmtpMailer {
    async fn send(&self, mail: &OutboundMail) -> Result<(), MailError> {
        let mut builder = Message::builder()
            .from(self.from.clone())
            .to(Mailbox::new(None, parse_address(&mail.to)?))
            .subject(mail.subject.as_str());

        if let Some(reply_to) = mail.reply_to.as_deref() {
            builder = builder.reply_to(Mailbox::new(None, parse_address(reply_to)?));
        }

        let message = builder.multipart(
            MultiPart::alternative()
                .singlepart(
                    SinglePart::builder()
                        .header(ContentType::TEXT_PLAIN)
                        .body(mail.text.clone()),
                )
                .singlepart(
                    SinglePart::builder()
                        .header(ContentType::TEXT_HTML)
                        .body(mail.html.clone()),
                ),
        )?;

        self.transport.send(message).await?;

        info!(to = %mail.to, subject = %mail.subject, "Email sent successfully");
        Ok(())
    }
}

/// Used when no SMTP credentials are configured. Messages are logged and dropped.
pub struct DisabledMailer;

#[async_trait]
impl MailTransport for DisabledMailer {
    async fn send(&self, mail: &OutboundMail) -> Result<(), MailError> {
        info!(
            to = %mail.to,
            subject = %mail.subject,
            "Mail delivery disabled, skipping message"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_address() {
        assert!(parse_address(" owner@example.com ").is_ok());
        assert!(matches!(
            parse_address("not an address"),
            Err(MailError::InvalidAddress(_))
        ));
    }

    #[tokio::test]
    async fn test_smtp_mailer_rejects_bad_from_address() {
        let config = MailConfig {
            from_address: "nope".to_string(),
            ..MailConfig::default()
        };
        assert!(matches!(
            SmtpMailer::new(&config, "Shop"),
            Err(MailError::InvalidAddress(_))
        ));
    }

    #[tokio::test]
    async fn test_disabled_mailer_accepts_everything() {
        let mail = OutboundMail {
            to: "a@example.com".to_string(),
            reply_to: None,
            subject: "Hi".to_string(),
            text: "text".to_string(),
            html: "<p>html</p>".to_string(),
        };
        assert!(DisabledMailer.send(&mail).await.is_ok());
    }
}
