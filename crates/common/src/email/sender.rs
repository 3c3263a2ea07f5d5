use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::domain::{DomainError, DomainResult};

/// One outgoing HTML email
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// Delivers transactional email
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send_email(&self, message: EmailMessage) -> DomainResult<()>;
}

/// Email API settings. Without an API key mail is only logged.
#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub api_url: String,
    pub api_key: Option<String>,
    pub from_address: String,
    pub timeout_secs: u64,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.resend.com/emails".to_string(),
            api_key: None,
            from_address: "Morgana & O.R.U.M. <noreply@morganaorum.it>".to_string(),
            timeout_secs: 10,
        }
    }
}

#[derive(Serialize)]
struct SendEmailBody<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
}

/// Posts messages as JSON to an HTTP email API with bearer authentication
pub struct HttpEmailSender {
    http: reqwest::Client,
    api_url: String,
    api_key: String,
    from_address: String,
}

impl HttpEmailSender {
    pub fn new(config: &EmailConfig, api_key: String) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            api_url: config.api_url.clone(),
            api_key,
            from_address: config.from_address.clone(),
        })
    }
}

#[async_trait]
impl EmailSender for HttpEmailSender {
    #[instrument(skip(self, message), fields(subject = %message.subject))]
    async fn send_email(&self, message: EmailMessage) -> DomainResult<()> {
        let body = SendEmailBody {
            from: &self.from_address,
            to: [&message.to],
            subject: &message.subject,
            html: &message.html,
        };

        let response = self
            .http
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| DomainError::EmailError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(DomainError::EmailError(format!(
                "email API returned {}: {}",
                status, detail
            )));
        }

        debug!("email accepted by provider");
        Ok(())
    }
}

/// Stand-in used when no email API key is configured
#[derive(Debug, Default)]
pub struct LoggingEmailSender;

#[async_trait]
impl EmailSender for LoggingEmailSender {
    async fn send_email(&self, message: EmailMessage) -> DomainResult<()> {
        info!(
            subject = %message.subject,
            bytes = message.html.len(),
            "email delivery disabled, message dropped"
        );
        Ok(())
    }
}

/// Pick the sender for the given configuration
pub fn email_sender_from_config(config: &EmailConfig) -> anyhow::Result<Arc<dyn EmailSender>> {
    match config.api_key.as_deref().map(str::trim).filter(|k| !k.is_empty()) {
        Some(key) => Ok(Arc::new(HttpEmailSender::new(config, key.to_string())?)),
        None => {
            warn!("no email API key configured, outgoing email will only be logged");
            Ok(Arc::new(LoggingEmailSender))
        }
    }
}

/// Send in the background. Failures are logged and never reach the caller.
pub fn dispatch_email(sender: Arc<dyn EmailSender>, message: EmailMessage) {
    tokio::spawn(async move {
        let subject = message.subject.clone();
        if let Err(e) = sender.send_email(message).await {
            warn!(error = %e, subject = %subject, "failed to send email");
        }
    });
}
