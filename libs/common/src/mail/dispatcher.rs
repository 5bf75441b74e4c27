//! Background delivery for request paths
//!
//! Handlers hand a rendered email to [`MailDispatcher::dispatch`] and move
//! on. A single worker drains the bounded queue and sends one message at a
//! time; outcomes are only logged.

use std::sync::Arc;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use super::{MailTransport, OutgoingEmail};

pub const DEFAULT_QUEUE_CAPACITY: usize = 64;

/// Sending half of the mail queue
#[derive(Clone)]
pub struct MailDispatcher {
    sender: mpsc::Sender<OutgoingEmail>,
}

impl MailDispatcher {
    /// Start the worker and return a handle to enqueue messages
    ///
    /// The worker stops once every dispatcher clone has been dropped and the
    /// queue is drained.
    pub fn spawn(transport: Arc<dyn MailTransport>, capacity: usize) -> (Self, JoinHandle<()>) {
        let (sender, mut receiver) = mpsc::channel::<OutgoingEmail>(capacity.max(1));

        let worker = tokio::spawn(async move {
            while let Some(email) = receiver.recv().await {
                match transport.send(&email).await {
                    Ok(()) => info!(
                        target: "mail_dispatcher",
                        to = %email.to,
                        subject = %email.subject,
                        "Email sent via {}",
                        transport.name()
                    ),
                    Err(e) => error!(
                        target: "mail_dispatcher",
                        to = %email.to,
                        subject = %email.subject,
                        "Failed to send email: {}",
                        e
                    ),
                }
            }
            info!(target: "mail_dispatcher", "Mail queue closed, worker stopping");
        });

        (Self { sender }, worker)
    }

    /// Enqueue without waiting; returns whether the message was accepted
    pub fn dispatch(&self, email: OutgoingEmail) -> bool {
        match self.sender.try_send(email) {
            Ok(()) => true,
            Err(TrySendError::Full(email)) => {
                warn!(
                    target: "mail_dispatcher",
                    to = %email.to,
                    "Mail queue is full, dropping \"{}\"",
                    email.subject
                );
                false
            }
            Err(TrySendError::Closed(email)) => {
                error!(
                    target: "mail_dispatcher",
                    to = %email.to,
                    "Mail queue is closed, dropping \"{}\"",
                    email.subject
                );
                false
            }
        }
    }
}
