//! Follow-up reminder batch job
//!
//! Selects the applications whose follow-up is due, resolves each owner and
//! sends one reminder per application, strictly one at a time. A failed send
//! is counted and the batch moves on; only store errors end a run early.

use async_trait::async_trait;
use chrono::{Days, NaiveDate};
use common::error::DatabaseResult;
use common::models::{Application, User};
use common::notifier::Notifier;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::summary::{DailySummary, DateRange, Tally, UpcomingSummary};

pub const DEFAULT_DAYS_AHEAD: u32 = 3;

/// Read access the job needs from the record store
#[async_trait]
pub trait ReminderSource: Send + Sync {
    /// Applications awaiting a response with a follow-up on `date`
    async fn list_due(&self, date: NaiveDate) -> DatabaseResult<Vec<Application>>;

    /// Applications awaiting a response with a follow-up in `[from, to]`
    async fn list_due_in_range(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> DatabaseResult<Vec<Application>>;

    async fn find_user(&self, id: Uuid) -> DatabaseResult<Option<User>>;
}

#[derive(Error, Debug)]
pub enum JobError {
    #[error(transparent)]
    Store(#[from] common::error::DatabaseError),

    #[error("{days} days after {from} is out of range")]
    WindowOutOfRange { from: NaiveDate, days: u32 },
}

#[derive(Clone)]
pub struct ReminderJob {
    source: Arc<dyn ReminderSource>,
    notifier: Notifier,
}

impl ReminderJob {
    pub fn new(source: Arc<dyn ReminderSource>, notifier: Notifier) -> Self {
        Self { source, notifier }
    }

    /// Remind about every follow-up that falls on `today`
    pub async fn send_daily(&self, today: NaiveDate) -> Result<DailySummary, JobError> {
        info!("Checking follow-ups due on {}", today);
        let due = self.source.list_due(today).await?;
        let tally = self.notify_all(&due).await?;

        info!(
            "Daily reminders for {}: {} checked, {} sent, {} failed",
            today, tally.total_applications, tally.sent, tally.failed
        );
        Ok(DailySummary { date: today, tally })
    }

    /// Remind about every follow-up between `today` and `today + days_ahead`, both inclusive
    pub async fn send_upcoming(
        &self,
        today: NaiveDate,
        days_ahead: u32,
    ) -> Result<UpcomingSummary, JobError> {
        let end = today
            .checked_add_days(Days::new(u64::from(days_ahead)))
            .ok_or(JobError::WindowOutOfRange {
                from: today,
                days: days_ahead,
            })?;
        let date_range = DateRange { from: today, to: end };

        info!("Checking follow-ups due from {}", date_range);
        let due = self.source.list_due_in_range(today, end).await?;
        let tally = self.notify_all(&due).await?;

        info!(
            "Upcoming reminders for {}: {} checked, {} sent, {} failed",
            date_range, tally.total_applications, tally.sent, tally.failed
        );
        Ok(UpcomingSummary { date_range, tally })
    }

    async fn notify_all(&self, applications: &[Application]) -> DatabaseResult<Tally> {
        let mut tally = Tally {
            total_applications: applications.len(),
            ..Tally::default()
        };
        // Owners are looked up once per run
        let mut owners: HashMap<Uuid, Option<User>> = HashMap::new();

        for application in applications {
            let owner = match owners.get(&application.user_id) {
                Some(owner) => owner.clone(),
                None => {
                    let owner = self.source.find_user(application.user_id).await?;
                    owners.insert(application.user_id, owner.clone());
                    owner
                }
            };

            let delivered = match owner {
                Some(user) if user.has_email() => self.notifier.notify(&user, application).await,
                Some(user) => {
                    warn!(
                        application_id = %application.id,
                        "User {} has no email address, skipping reminder",
                        user.id
                    );
                    false
                }
                None => {
                    warn!(
                        application_id = %application.id,
                        "Owner {} not found, skipping reminder",
                        application.user_id
                    );
                    false
                }
            };
            tally.record(delivered);
        }

        Ok(tally)
    }
}
