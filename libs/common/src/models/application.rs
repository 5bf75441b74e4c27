//! Job application model and its status lifecycle

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Where an application currently stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ApplicationStatus {
    #[default]
    Applied,
    Interview,
    Offer,
    Rejected,
    Accepted,
    Withdrawn,
}

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 6] = [
        ApplicationStatus::Applied,
        ApplicationStatus::Interview,
        ApplicationStatus::Offer,
        ApplicationStatus::Rejected,
        ApplicationStatus::Accepted,
        ApplicationStatus::Withdrawn,
    ];

    /// Statuses that still warrant a follow-up reminder
    pub const AWAITING_RESPONSE: [ApplicationStatus; 2] =
        [ApplicationStatus::Applied, ApplicationStatus::Interview];

    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Applied => "Applied",
            ApplicationStatus::Interview => "Interview",
            ApplicationStatus::Offer => "Offer",
            ApplicationStatus::Rejected => "Rejected",
            ApplicationStatus::Accepted => "Accepted",
            ApplicationStatus::Withdrawn => "Withdrawn",
        }
    }

    pub fn awaits_response(&self) -> bool {
        Self::AWAITING_RESPONSE.contains(self)
    }

    /// Badge colour used by the status-change email
    pub fn badge_color(&self) -> &'static str {
        match self {
            ApplicationStatus::Applied => "#0dcaf0",
            ApplicationStatus::Interview => "#ffc107",
            ApplicationStatus::Offer | ApplicationStatus::Accepted => "#198754",
            ApplicationStatus::Rejected => "#dc3545",
            ApplicationStatus::Withdrawn => "#6c757d",
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string names no known status
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown application status '{0}'")]
pub struct ParseStatusError(pub String);

impl FromStr for ApplicationStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|status| status.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ParseStatusError(s.to_string()))
    }
}

/// A job application owned by exactly one user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
    pub id: Uuid,
    #[serde(skip_serializing)]
    pub user_id: Uuid,
    pub company: String,
    pub position: String,
    pub status: ApplicationStatus,
    pub date_applied: NaiveDate,
    pub follow_up_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields accepted when creating an application
#[derive(Debug, Clone, PartialEq)]
pub struct NewApplication {
    pub company: String,
    pub position: String,
    pub status: ApplicationStatus,
    /// Defaults to the creation date when absent
    pub date_applied: Option<NaiveDate>,
    pub follow_up_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

/// Partial update; `None` leaves a field untouched
///
/// The nullable columns use a nested option so that callers can clear them:
/// `Some(None)` writes NULL.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateApplication {
    pub company: Option<String>,
    pub position: Option<String>,
    pub status: Option<ApplicationStatus>,
    pub date_applied: Option<NaiveDate>,
    pub follow_up_date: Option<Option<NaiveDate>>,
    pub notes: Option<Option<String>>,
}

impl UpdateApplication {
    pub fn is_empty(&self) -> bool {
        *self == UpdateApplication::default()
    }

    /// Apply the update to an in-memory copy
    pub fn apply_to(&self, application: &mut Application) {
        if let Some(company) = &self.company {
            application.company = company.clone();
        }
        if let Some(position) = &self.position {
            application.position = position.clone();
        }
        if let Some(status) = self.status {
            application.status = status;
        }
        if let Some(date_applied) = self.date_applied {
            application.date_applied = date_applied;
        }
        if let Some(follow_up_date) = self.follow_up_date {
            application.follow_up_date = follow_up_date;
        }
        if let Some(notes) = &self.notes {
            application.notes = notes.clone();
        }
    }
}
