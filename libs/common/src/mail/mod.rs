//! Outbound email
//!
//! [`MailTransport`] is the send boundary: it takes one fully rendered
//! message and either delivers it or reports why not. Which transport is
//! used is decided once at startup from [`MailConfig`].

use async_trait::async_trait;
use std::env;
use std::sync::Arc;

use crate::error::{MailError, MailResult};

pub mod dispatcher;
pub mod log;
pub mod mailgun;
pub mod smtp;
pub mod templates;

pub use dispatcher::MailDispatcher;

/// A rendered message addressed to one recipient
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub text_body: String,
    pub html_body: String,
}

/// Delivers rendered messages
#[async_trait]
pub trait MailTransport: Send + Sync {
    /// Short identifier used in logs
    fn name(&self) -> &'static str;

    /// Deliver one message
    async fn send(&self, email: &OutgoingEmail) -> MailResult<()>;
}

/// Which transport backs outbound mail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    Smtp,
    Mailgun,
    Log,
}

impl std::str::FromStr for TransportKind {
    type Err = MailError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "smtp" => Ok(TransportKind::Smtp),
            "mailgun" => Ok(TransportKind::Mailgun),
            "log" | "console" => Ok(TransportKind::Log),
            other => Err(MailError::Configuration(format!(
                "unknown MAIL_TRANSPORT '{}', expected smtp, mailgun or log",
                other
            ))),
        }
    }
}

/// SMTP relay settings
#[derive(Debug, Clone)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    /// Upgrade the connection with STARTTLS
    pub use_tls: bool,
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Mailgun HTTP API settings
#[derive(Debug, Clone)]
pub struct MailgunSettings {
    pub api_key: String,
    pub domain: String,
    pub base_url: String,
}

/// Mail configuration
#[derive(Debug, Clone)]
pub struct MailConfig {
    pub transport: TransportKind,
    /// `From` header; falls back to a per-transport default
    pub default_sender: Option<String>,
    pub smtp: SmtpSettings,
    pub mailgun: Option<MailgunSettings>,
    /// Capacity of the background dispatch queue
    pub queue_capacity: usize,
}

impl MailConfig {
    /// Create a new MailConfig from environment variables
    ///
    /// # Environment Variables
    /// - `MAIL_TRANSPORT`: `smtp`, `mailgun` or `log` (default: `smtp`; `log` only when set)
    /// - `MAIL_DEFAULT_SENDER`: `From` address
    /// - `MAIL_SERVER`: SMTP host (default: "smtp.gmail.com")
    /// - `MAIL_PORT`: SMTP port (default: 587)
    /// - `MAIL_USE_TLS`: STARTTLS on/off (default: true)
    /// - `MAIL_USERNAME`, `MAIL_PASSWORD`: SMTP credentials
    /// - `MAILGUN_API_KEY`, `MAILGUN_DOMAIN`: required for `mailgun`
    /// - `MAILGUN_BASE_URL`: API base (default: "https://api.mailgun.net")
    /// - `MAIL_QUEUE_CAPACITY`: background queue size (default: 64)
    pub fn from_env() -> MailResult<Self> {
        let transport = env::var("MAIL_TRANSPORT")
            .ok()
            .map(|value| value.parse::<TransportKind>())
            .transpose()?
            .unwrap_or(TransportKind::Smtp);

        let use_tls = env::var("MAIL_USE_TLS")
            .map(|value| !matches!(value.trim().to_ascii_lowercase().as_str(), "0" | "false" | "no"))
            .unwrap_or(true);

        let smtp = SmtpSettings {
            host: env::var("MAIL_SERVER").unwrap_or_else(|_| "smtp.gmail.com".to_string()),
            port: env::var("MAIL_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(587),
            use_tls,
            username: non_empty_var("MAIL_USERNAME"),
            password: non_empty_var("MAIL_PASSWORD"),
        };

        let mailgun = match (non_empty_var("MAILGUN_API_KEY"), non_empty_var("MAILGUN_DOMAIN")) {
            (Some(api_key), Some(domain)) => Some(MailgunSettings {
                api_key,
                domain,
                base_url: env::var("MAILGUN_BASE_URL")
                    .unwrap_or_else(|_| "https://api.mailgun.net".to_string()),
            }),
            _ => None,
        };

        if transport == TransportKind::Mailgun && mailgun.is_none() {
            return Err(MailError::Configuration(
                "MAIL_TRANSPORT=mailgun requires MAILGUN_API_KEY and MAILGUN_DOMAIN".to_string(),
            ));
        }

        let queue_capacity = env::var("MAIL_QUEUE_CAPACITY")
            .ok()
            .and_then(|s| s.parse().ok())
            .filter(|capacity: &usize| *capacity > 0)
            .unwrap_or(dispatcher::DEFAULT_QUEUE_CAPACITY);

        Ok(MailConfig {
            transport,
            default_sender: non_empty_var("MAIL_DEFAULT_SENDER"),
            smtp,
            mailgun,
            queue_capacity,
        })
    }

    /// The `From` address actually used
    pub fn sender(&self) -> String {
        if let Some(sender) = &self.default_sender {
            return sender.clone();
        }
        match (&self.transport, &self.mailgun, &self.smtp.username) {
            (TransportKind::Mailgun, Some(mailgun), _) => {
                format!("Job Application Tracker <postmaster@{}>", mailgun.domain)
            }
            (TransportKind::Smtp, _, Some(username)) if username.contains('@') => {
                format!("Job Application Tracker <{}>", username)
            }
            _ => "Job Application Tracker <noreply@localhost>".to_string(),
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Build the transport selected by the configuration
pub fn build_transport(config: &MailConfig) -> MailResult<Arc<dyn MailTransport>> {
    let sender = config.sender();
    let transport: Arc<dyn MailTransport> = match config.transport {
        TransportKind::Smtp => Arc::new(smtp::SmtpTransport::new(&config.smtp, &sender)?),
        TransportKind::Mailgun => {
            let settings = config.mailgun.as_ref().ok_or_else(|| {
                MailError::Configuration("Mailgun settings are missing".to_string())
            })?;
            Arc::new(mailgun::MailgunTransport::new(settings, &sender)?)
        }
        TransportKind::Log => Arc::new(log::LogTransport::new(&sender)),
    };

    tracing::info!("Outbound mail uses the {} transport", transport.name());
    Ok(transport)
}
