//! Follow-up reminder delivery for a single application

use std::sync::Arc;
use tracing::{error, info};

use crate::mail::{MailTransport, templates};
use crate::models::{Application, User};

/// Formats and sends one reminder per call
#[derive(Clone)]
pub struct Notifier {
    transport: Arc<dyn MailTransport>,
}

impl Notifier {
    pub fn new(transport: Arc<dyn MailTransport>) -> Self {
        Self { transport }
    }

    /// Send a follow-up reminder for `application` to `user`
    ///
    /// Never fails: rendering and transport errors are logged and reported
    /// as `false`. No retry is attempted.
    pub async fn notify(&self, user: &User, application: &Application) -> bool {
        let email = match templates::reminder_email(user, application) {
            Ok(email) => email,
            Err(e) => {
                error!(
                    application_id = %application.id,
                    "Failed to render reminder: {}",
                    e
                );
                return false;
            }
        };

        match self.transport.send(&email).await {
            Ok(()) => {
                info!(
                    application_id = %application.id,
                    company = %application.company,
                    "Reminder sent to {}",
                    user.email
                );
                true
            }
            Err(e) => {
                error!(
                    application_id = %application.id,
                    company = %application.company,
                    "Failed to send reminder to {}: {}",
                    user.email,
                    e
                );
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{MailError, MailResult};
    use crate::mail::OutgoingEmail;
    use crate::models::ApplicationStatus;
    use async_trait::async_trait;
    use chrono::{NaiveDate, Utc};
    use std::sync::Mutex;
    use uuid::Uuid;

    #[derive(Default)]
    struct FakeTransport {
        fail: bool,
        outbox: Mutex<Vec<OutgoingEmail>>,
    }

    #[async_trait]
    impl MailTransport for FakeTransport {
        fn name(&self) -> &'static str {
            "fake"
        }

        async fn send(&self, email: &OutgoingEmail) -> MailResult<()> {
            if self.fail {
                return Err(MailError::Transport("connection refused".to_string()));
            }
            self.outbox.lock().unwrap().push(email.clone());
            Ok(())
        }
    }

    fn user() -> User {
        User {
            id: Uuid::new_v4(),
            email: "ada@example.com".to_string(),
            name: Some("Ada".to_string()),
            password_hash: String::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn application(owner: &User) -> Application {
        Application {
            id: Uuid::new_v4(),
            user_id: owner.id,
            company: "Acme".to_string(),
            position: "Engineer".to_string(),
            status: ApplicationStatus::Applied,
            date_applied: NaiveDate::from_ymd_opt(2026, 10, 1).unwrap(),
            follow_up_date: None,
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn successful_send_returns_true() {
        let transport = Arc::new(FakeTransport::default());
        let notifier = Notifier::new(transport.clone());
        let user = user();

        assert!(notifier.notify(&user, &application(&user)).await);

        let outbox = transport.outbox.lock().unwrap();
        assert_eq!(outbox.len(), 1);
        assert_eq!(outbox[0].to, "ada@example.com");
        assert_eq!(outbox[0].subject, "Follow-up reminder: Acme");
        assert!(outbox[0].text_body.contains("- Follow-up date: N/A"));
        assert!(outbox[0].text_body.contains("Notes: None"));
    }

    #[tokio::test]
    async fn transport_failure_returns_false() {
        let transport = Arc::new(FakeTransport {
            fail: true,
            ..Default::default()
        });
        let notifier = Notifier::new(transport.clone());
        let user = user();

        assert!(!notifier.notify(&user, &application(&user)).await);
        assert!(transport.outbox.lock().unwrap().is_empty());
    }
}
