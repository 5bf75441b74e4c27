//! SMTP transport backed by lettre

use async_trait::async_trait;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::debug;

use super::{MailTransport, OutgoingEmail, SmtpSettings};
use crate::error::{MailError, MailResult};

/// Sends multipart (text + HTML) messages through an SMTP relay
pub struct SmtpTransport {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    sender: Mailbox,
}

impl SmtpTransport {
    /// Build the transport; no connection is opened until the first send
    pub fn new(settings: &SmtpSettings, sender: &str) -> MailResult<Self> {
        let sender = parse_mailbox(sender)?;

        let builder = if settings.use_tls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host)
                .map_err(|e| MailError::Configuration(format!("Invalid SMTP relay: {}", e)))?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&settings.host)
        };

        let mut builder = builder.port(settings.port);
        if let (Some(username), Some(password)) = (&settings.username, &settings.password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        Ok(Self {
            mailer: builder.build(),
            sender,
        })
    }

    fn build_message(&self, email: &OutgoingEmail) -> MailResult<Message> {
        Message::builder()
            .from(self.sender.clone())
            .to(parse_mailbox(&email.to)?)
            .subject(email.subject.clone())
            .multipart(MultiPart::alternative_plain_html(
                email.text_body.clone(),
                email.html_body.clone(),
            ))
            .map_err(|e| MailError::Build(e.to_string()))
    }
}

#[async_trait]
impl MailTransport for SmtpTransport {
    fn name(&self) -> &'static str {
        "smtp"
    }

    async fn send(&self, email: &OutgoingEmail) -> MailResult<()> {
        let message = self.build_message(email)?;
        let response = self
            .mailer
            .send(message)
            .await
            .map_err(|e| MailError::Transport(e.to_string()))?;
        debug!("SMTP relay answered {}", response.code());
        Ok(())
    }
}

fn parse_mailbox(address: &str) -> MailResult<Mailbox> {
    address.trim().parse::<Mailbox>().map_err(|e| MailError::Address {
        address: address.to_string(),
        reason: e.to_string(),
    })
}
