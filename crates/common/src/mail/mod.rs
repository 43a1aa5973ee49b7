//! Outbound mail
//!
//! Notifications go through the `Mailer` trait. The default `LogMailer`
//! writes each message to the log instead of delivering it.

use crate::config::MailConfig;
use crate::errors::{AppError, Result};
use async_trait::async_trait;
use serde::Serialize;
use tracing::info;

/// A single outgoing message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MailMessage {
    pub to: String,
    /// Sender; the mailer's default is used when absent
    pub from: Option<String>,
    pub subject: String,
    pub body: String,
}

/// Delivery backend for notifications
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: MailMessage) -> Result<()>;
}

/// Mailer that logs messages through `tracing`
#[derive(Debug, Clone)]
pub struct LogMailer {
    default_from: String,
}

impl LogMailer {
    pub fn new(config: &MailConfig) -> Self {
        Self {
            default_from: config.default_from.clone(),
        }
    }
}

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: MailMessage) -> Result<()> {
        if message.to.trim().is_empty() {
            return Err(AppError::Mail {
                message: "Recipient address is empty".to_string(),
            });
        }

        let from = message.from.as_deref().unwrap_or(&self.default_from);
        info!(
            to = %message.to,
            from = %from,
            subject = %message.subject,
            body_len = message.body.len(),
            "Mail sent"
        );

        Ok(())
    }
}

/// Mailer that keeps every message in memory
#[cfg(test)]
#[derive(Debug, Default)]
pub struct RecordingMailer {
    sent: std::sync::Mutex<Vec<MailMessage>>,
}

#[cfg(test)]
impl RecordingMailer {
    pub fn sent(&self) -> Vec<MailMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[cfg(test)]
#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, message: MailMessage) -> Result<()> {
        self.sent.lock().unwrap().push(message);
        Ok(())
    }
}
