//! Outcome of one reminder run

use chrono::NaiveDate;
use serde::{Serialize, Serializer};
use std::fmt;

const RULE: &str = "============================================================";

/// Counts shared by every run; `sent + failed == total_applications`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Tally {
    pub total_applications: usize,
    pub sent: usize,
    pub failed: usize,
}

impl Tally {
    pub fn record(&mut self, delivered: bool) {
        if delivered {
            self.sent += 1;
        } else {
            self.failed += 1;
        }
    }

    /// Nothing was due, or at least one reminder went out
    pub fn succeeded(&self) -> bool {
        self.total_applications == 0 || self.sent > 0
    }
}

/// Inclusive date window, rendered as `YYYY-MM-DD to YYYY-MM-DD`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.from, self.to)
    }
}

impl Serialize for DateRange {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Result of the due-today run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailySummary {
    pub date: NaiveDate,
    #[serde(flatten)]
    pub tally: Tally,
}

/// Result of the due-within-window run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpcomingSummary {
    pub date_range: DateRange,
    #[serde(flatten)]
    pub tally: Tally,
}

/// Either kind of run, as printed by the shell
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum RunSummary {
    Daily(DailySummary),
    Upcoming(UpcomingSummary),
}

impl RunSummary {
    pub fn tally(&self) -> Tally {
        match self {
            RunSummary::Daily(summary) => summary.tally,
            RunSummary::Upcoming(summary) => summary.tally,
        }
    }

    /// Process exit status for a one-shot run
    pub fn exit_code(&self) -> u8 {
        if self.tally().succeeded() { 0 } else { 1 }
    }
}

impl From<DailySummary> for RunSummary {
    fn from(summary: DailySummary) -> Self {
        RunSummary::Daily(summary)
    }
}

impl From<UpcomingSummary> for RunSummary {
    fn from(summary: UpcomingSummary) -> Self {
        RunSummary::Upcoming(summary)
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{RULE}")?;
        writeln!(f, "REMINDER SUMMARY")?;
        writeln!(f, "{RULE}")?;
        match self {
            RunSummary::Daily(summary) => writeln!(f, "Date: {}", summary.date)?,
            RunSummary::Upcoming(summary) => writeln!(f, "Date range: {}", summary.date_range)?,
        }
        let tally = self.tally();
        writeln!(f, "Total applications checked: {}", tally.total_applications)?;
        writeln!(f, "Reminders sent: {}", tally.sent)?;
        writeln!(f, "Failed: {}", tally.failed)?;
        write!(f, "{RULE}")
    }
}
