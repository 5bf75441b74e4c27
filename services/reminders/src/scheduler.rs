use anyhow::Result;
use chrono::Local;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};
use tracing::{error, info};

use crate::job::ReminderJob;
use crate::settings::ReminderSettings;
use crate::summary::RunSummary;

/// Runs the daily and upcoming jobs on their cron schedules
pub struct ReminderScheduler {
    job: ReminderJob,
    settings: ReminderSettings,
}

impl ReminderScheduler {
    pub fn new(job: ReminderJob, settings: ReminderSettings) -> Self {
        Self { job, settings }
    }

    /// Register both jobs and start ticking; the returned scheduler must be kept alive
    pub async fn start(&self) -> Result<JobScheduler> {
        let scheduler = JobScheduler::new().await?;

        scheduler
            .add(daily_job(self.job.clone(), &self.settings.daily_schedule)?)
            .await?;
        scheduler
            .add(upcoming_job(
                self.job.clone(),
                &self.settings.upcoming_schedule,
                self.settings.upcoming_days_ahead,
            )?)
            .await?;
        scheduler.start().await?;

        info!(
            "Started reminder scheduler: daily '{}', upcoming '{}' ({} days ahead)",
            self.settings.daily_schedule,
            self.settings.upcoming_schedule,
            self.settings.upcoming_days_ahead
        );
        Ok(scheduler)
    }
}

fn daily_job(job: ReminderJob, schedule: &str) -> Result<Job, JobSchedulerError> {
    Job::new_async(schedule, move |_, _| {
        let job = job.clone();
        Box::pin(async move {
            info!("Daily reminder job executed");
            match job.send_daily(Local::now().date_naive()).await {
                Ok(summary) => info!("\n{}", RunSummary::from(summary)),
                Err(e) => error!("Daily reminder run failed: {}", e),
            }
        })
    })
}

fn upcoming_job(
    job: ReminderJob,
    schedule: &str,
    days_ahead: u32,
) -> Result<Job, JobSchedulerError> {
    Job::new_async(schedule, move |_, _| {
        let job = job.clone();
        Box::pin(async move {
            info!("Upcoming reminder job executed");
            match job.send_upcoming(Local::now().date_naive(), days_ahead).await {
                Ok(summary) => info!("\n{}", RunSummary::from(summary)),
                Err(e) => error!("Upcoming reminder run failed: {}", e),
            }
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::ReminderSource;
    use crate::settings::{DEFAULT_DAILY_SCHEDULE, DEFAULT_UPCOMING_SCHEDULE};
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use common::error::DatabaseResult;
    use common::mail::log::LogTransport;
    use common::models::{Application, User};
    use common::notifier::Notifier;
    use std::sync::Arc;
    use uuid::Uuid;

    struct EmptySource;

    #[async_trait]
    impl ReminderSource for EmptySource {
        async fn list_due(&self, _date: NaiveDate) -> DatabaseResult<Vec<Application>> {
            Ok(Vec::new())
        }

        async fn list_due_in_range(
            &self,
            _from: NaiveDate,
            _to: NaiveDate,
        ) -> DatabaseResult<Vec<Application>> {
            Ok(Vec::new())
        }

        async fn find_user(&self, _id: Uuid) -> DatabaseResult<Option<User>> {
            Ok(None)
        }
    }

    fn reminder_job() -> ReminderJob {
        ReminderJob::new(
            Arc::new(EmptySource),
            Notifier::new(Arc::new(LogTransport::new("noreply@example.com"))),
        )
    }

    #[tokio::test]
    async fn default_schedules_are_valid() {
        assert!(daily_job(reminder_job(), DEFAULT_DAILY_SCHEDULE).is_ok());
        assert!(upcoming_job(reminder_job(), DEFAULT_UPCOMING_SCHEDULE, 3).is_ok());
    }

    #[tokio::test]
    async fn malformed_schedule_is_rejected() {
        assert!(daily_job(reminder_job(), "every morning").is_err());
    }
}
