//! Development transport that only writes messages to the log

use async_trait::async_trait;
use tracing::info;

use super::{MailTransport, OutgoingEmail};
use crate::error::MailResult;

/// Logs every message instead of delivering it
pub struct LogTransport {
    sender: String,
}

impl LogTransport {
    pub fn new(sender: &str) -> Self {
        Self {
            sender: sender.to_string(),
        }
    }
}

#[async_trait]
impl MailTransport for LogTransport {
    fn name(&self) -> &'static str {
        "log"
    }

    async fn send(&self, email: &OutgoingEmail) -> MailResult<()> {
        info!(
            from = %self.sender,
            to = %email.to,
            subject = %email.subject,
            "Email not delivered (log transport)\n{}",
            email.text_body
        );
        Ok(())
    }
}
