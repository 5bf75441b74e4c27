//! Reminder schedule settings
//!
//! Read through the `config` crate from `REMINDERS_*` environment variables:
//! `REMINDERS_DAILY_SCHEDULE`, `REMINDERS_UPCOMING_SCHEDULE` and
//! `REMINDERS_UPCOMING_DAYS_AHEAD`.

use config::{Config, ConfigError, Environment};
use serde::Deserialize;

use crate::job::DEFAULT_DAYS_AHEAD;

/// Every day at 09:00
pub const DEFAULT_DAILY_SCHEDULE: &str = "0 0 9 * * *";
/// Mondays at 08:00
pub const DEFAULT_UPCOMING_SCHEDULE: &str = "0 0 8 * * Mon";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReminderSettings {
    /// Six-field cron expression (seconds first) for the due-today run
    pub daily_schedule: String,
    /// Six-field cron expression for the due-within-window run
    pub upcoming_schedule: String,
    pub upcoming_days_ahead: u32,
}

impl ReminderSettings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("daily_schedule", DEFAULT_DAILY_SCHEDULE)?
            .set_default("upcoming_schedule", DEFAULT_UPCOMING_SCHEDULE)?
            .set_default("upcoming_days_ahead", i64::from(DEFAULT_DAYS_AHEAD))?
            .add_source(Environment::with_prefix("REMINDERS").try_parsing(true))
            .build()?
            .try_deserialize()
    }
}
