use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use common::database::{DatabaseConfig, init_pool};
use common::logging::init_tracing;
use common::mail::{MailConfig, build_transport};
use common::notifier::Notifier;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};

mod database;
mod job;
mod scheduler;
mod settings;
mod summary;

use database::PgReminderSource;
use job::ReminderJob;
use scheduler::ReminderScheduler;
use settings::ReminderSettings;
use summary::RunSummary;

#[derive(Parser, Debug)]
#[command(
    name = "reminders",
    about = "Email follow-up reminders for tracked job applications",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Remind about follow-ups due today, then exit
    Daily(RunArgs),
    /// Remind about follow-ups due within the next days, then exit
    Upcoming {
        /// Window length in days after the start date (defaults to REMINDERS_UPCOMING_DAYS_AHEAD)
        #[arg(long)]
        days: Option<u32>,
        #[command(flatten)]
        run: RunArgs,
    },
    /// Run both jobs on their cron schedules until interrupted
    Schedule,
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Print the summary as JSON
    #[arg(long)]
    json: bool,
    /// Evaluation date (YYYY-MM-DD, defaults to today)
    #[arg(long, value_parser = parse_date)]
    date: Option<NaiveDate>,
}

fn parse_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|e| format!("invalid date '{}': {}", value, e))
}

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(e) = init_tracing() {
        eprintln!("{:#}", e);
    }

    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            error!("Reminder run failed: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<u8> {
    let job = build_job().await?;

    match cli.command {
        Command::Daily(args) => {
            let today = args.date.unwrap_or_else(|| Local::now().date_naive());
            let summary = RunSummary::from(job.send_daily(today).await?);
            print_summary(&summary, args.json)?;
            Ok(summary.exit_code())
        }
        Command::Upcoming { days, run } => {
            let today = run.date.unwrap_or_else(|| Local::now().date_naive());
            let days = window_days(days)?;
            let summary = RunSummary::from(job.send_upcoming(today, days).await?);
            print_summary(&summary, run.json)?;
            Ok(summary.exit_code())
        }
        Command::Schedule => {
            let settings = load_settings()?;
            let mut scheduler = ReminderScheduler::new(job, settings).start().await?;
            info!("Reminder service started successfully");

            tokio::signal::ctrl_c().await?;
            info!("Shutting down reminder service");
            scheduler.shutdown().await?;
            Ok(0)
        }
    }
}

fn load_settings() -> Result<ReminderSettings> {
    ReminderSettings::from_env().context("Invalid reminder settings")
}

/// An explicit `--days` wins and leaves the environment unread
fn window_days(days: Option<u32>) -> Result<u32> {
    match days {
        Some(days) => Ok(days),
        None => Ok(load_settings()?.upcoming_days_ahead),
    }
}

async fn build_job() -> Result<ReminderJob> {
    let pool = init_pool(&DatabaseConfig::from_env()?).await?;
    let transport = build_transport(&MailConfig::from_env()?)?;

    Ok(ReminderJob::new(
        Arc::new(PgReminderSource::new(pool)),
        Notifier::new(transport),
    ))
}

fn print_summary(summary: &RunSummary, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(summary)?);
    } else {
        println!("{}", summary);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn upcoming_accepts_days_and_json() {
        let cli = Cli::try_parse_from(["reminders", "upcoming", "--days", "7", "--json"]).unwrap();
        match cli.command {
            Command::Upcoming { days, run } => {
                assert_eq!(days, Some(7));
                assert!(run.json);
                assert!(run.date.is_none());
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn daily_accepts_explicit_date() {
        let cli = Cli::try_parse_from(["reminders", "daily", "--date", "2026-10-16"]).unwrap();
        match cli.command {
            Command::Daily(args) => {
                assert_eq!(args.date, NaiveDate::from_ymd_opt(2026, 10, 16));
                assert!(!args.json);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    #[serial_test::serial]
    fn explicit_days_ignore_broken_settings() {
        unsafe {
            std::env::set_var("REMINDERS_UPCOMING_DAYS_AHEAD", "-2");
        }

        assert_eq!(window_days(Some(7)).unwrap(), 7);
        assert!(window_days(None).is_err());

        unsafe {
            std::env::remove_var("REMINDERS_UPCOMING_DAYS_AHEAD");
        }
        assert_eq!(window_days(None).unwrap(), job::DEFAULT_DAYS_AHEAD);
    }

    #[test]
    fn malformed_date_is_rejected() {
        assert!(Cli::try_parse_from(["reminders", "daily", "--date", "16/10/2026"]).is_err());
    }
}
