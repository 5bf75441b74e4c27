//! API models for request and response payloads

use chrono::NaiveDate;
use common::models::{Application, ApplicationStatus, NewApplication, UpdateApplication};
use common::repositories::ApplicationFilter;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ApiError;

/// Width of the `company` and `position` columns
pub const MAX_FIELD_LENGTH: usize = 255;

/// Query string of `GET /applications`
#[derive(Debug, Default, Deserialize)]
pub struct ApplicationQuery {
    pub company: Option<String>,
    pub status: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl ApplicationQuery {
    /// A blank status means no status filter
    pub fn into_filter(self) -> Result<ApplicationFilter, ApiError> {
        Ok(ApplicationFilter {
            company: self.company,
            status: parse_optional_status(self.status.as_deref())?,
            page: self.page,
            per_page: self.per_page,
        })
    }
}

/// Body of `POST /applications`
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreateApplicationRequest {
    pub company: Option<String>,
    pub position: Option<String>,
    pub status: Option<String>,
    pub date_applied: Option<NaiveDate>,
    pub follow_up_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

impl CreateApplicationRequest {
    pub fn into_new_application(self) -> Result<NewApplication, ApiError> {
        let company = required(self.company, "company")?;
        let position = required(self.position, "position")?;

        Ok(NewApplication {
            company,
            position,
            status: parse_optional_status(self.status.as_deref())?.unwrap_or_default(),
            date_applied: self.date_applied,
            follow_up_date: self.follow_up_date,
            notes: non_blank(self.notes),
        })
    }
}

/// Body of `PUT /applications/:id`
///
/// `follow_up_date` and `notes` distinguish an absent key from an explicit
/// `null`, which clears the stored value.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpdateApplicationRequest {
    pub company: Option<String>,
    pub position: Option<String>,
    pub status: Option<String>,
    pub date_applied: Option<NaiveDate>,
    #[serde(deserialize_with = "double_option")]
    pub follow_up_date: Option<Option<NaiveDate>>,
    #[serde(deserialize_with = "double_option")]
    pub notes: Option<Option<String>>,
}

impl UpdateApplicationRequest {
    pub fn into_update(self) -> Result<UpdateApplication, ApiError> {
        let company = self
            .company
            .map(|company| required(Some(company), "company"))
            .transpose()?;
        let position = self
            .position
            .map(|position| required(Some(position), "position"))
            .transpose()?;

        Ok(UpdateApplication {
            company,
            position,
            status: parse_optional_status(self.status.as_deref())?,
            date_applied: self.date_applied,
            follow_up_date: self.follow_up_date,
            notes: self.notes.map(non_blank),
        })
    }
}

/// Response of `GET /applications`
#[derive(Debug, Serialize)]
pub struct ApplicationListResponse {
    pub applications: Vec<Application>,
    pub total: i64,
    pub page: u32,
    pub per_page: u32,
}

/// Response of `GET /dashboard`
#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub total: i64,
    pub applied: i64,
    pub interview: i64,
    pub recent: Vec<Application>,
}

fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn required(value: Option<String>, field: &str) -> Result<String, ApiError> {
    let value = value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| ApiError::BadRequest(format!("{} required", field)))?;

    if value.chars().count() > MAX_FIELD_LENGTH {
        return Err(ApiError::BadRequest(format!(
            "{} must be at most {} characters long",
            field, MAX_FIELD_LENGTH
        )));
    }

    Ok(value)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}

fn parse_optional_status(value: Option<&str>) -> Result<Option<ApplicationStatus>, ApiError> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value
            .parse::<ApplicationStatus>()
            .map(Some)
            .map_err(|e| ApiError::BadRequest(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create(body: &str) -> Result<NewApplication, ApiError> {
        serde_json::from_str::<CreateApplicationRequest>(body)
            .unwrap()
            .into_new_application()
    }

    fn update(body: &str) -> Result<UpdateApplication, ApiError> {
        serde_json::from_str::<UpdateApplicationRequest>(body)
            .unwrap()
            .into_update()
    }

    #[test]
    fn create_defaults_status_and_trims() {
        let new = create(r#"{"company": "  Initech ", "position": "Engineer"}"#).unwrap();

        assert_eq!(new.company, "Initech");
        assert_eq!(new.status, ApplicationStatus::Applied);
        assert_eq!(new.date_applied, None);
        assert_eq!(new.notes, None);
    }

    #[test]
    fn create_requires_company_and_position() {
        assert!(matches!(
            create(r#"{"position": "Engineer"}"#),
            Err(ApiError::BadRequest(msg)) if msg == "company required"
        ));
        assert!(matches!(
            create(r#"{"company": "Initech", "position": "  "}"#),
            Err(ApiError::BadRequest(msg)) if msg == "position required"
        ));
    }

    #[test]
    fn create_rejects_unknown_status() {
        let result = create(r#"{"company": "Initech", "position": "Engineer", "status": "Ghosted"}"#);
        assert!(matches!(
            result,
            Err(ApiError::BadRequest(msg)) if msg == "unknown application status 'Ghosted'"
        ));
    }

    #[test]
    fn create_parses_dates_and_status() {
        let new = create(
            r#"{"company": "Initech", "position": "Engineer", "status": "interview",
                "date_applied": "2026-10-01", "follow_up_date": "2026-10-08", "notes": "Call Bill"}"#,
        )
        .unwrap();

        assert_eq!(new.status, ApplicationStatus::Interview);
        assert_eq!(new.date_applied, NaiveDate::from_ymd_opt(2026, 10, 1));
        assert_eq!(new.follow_up_date, NaiveDate::from_ymd_opt(2026, 10, 8));
        assert_eq!(new.notes.as_deref(), Some("Call Bill"));
    }

    #[test]
    fn update_distinguishes_null_from_absent() {
        let cleared = update(r#"{"follow_up_date": null, "notes": null}"#).unwrap();
        assert_eq!(cleared.follow_up_date, Some(None));
        assert_eq!(cleared.notes, Some(None));

        let untouched = update(r#"{"status": "Offer"}"#).unwrap();
        assert_eq!(untouched.follow_up_date, None);
        assert_eq!(untouched.notes, None);
        assert_eq!(untouched.status, Some(ApplicationStatus::Offer));
    }

    #[test]
    fn update_rejects_blank_company() {
        assert!(matches!(
            update(r#"{"company": " "}"#),
            Err(ApiError::BadRequest(msg)) if msg == "company required"
        ));
    }

    #[test]
    fn overlong_fields_are_rejected() {
        let body = serde_json::json!({ "company": "x".repeat(256), "position": "Engineer" });
        assert!(matches!(
            create(&body.to_string()),
            Err(ApiError::BadRequest(msg)) if msg == "company must be at most 255 characters long"
        ));

        let body = serde_json::json!({ "position": "é".repeat(256) });
        assert!(matches!(
            update(&body.to_string()),
            Err(ApiError::BadRequest(msg)) if msg == "position must be at most 255 characters long"
        ));

        let body = serde_json::json!({ "company": "x".repeat(255), "position": "Engineer" });
        assert_eq!(create(&body.to_string()).unwrap().company.len(), 255);
    }

    #[test]
    fn empty_update_is_empty() {
        assert!(update("{}").unwrap().is_empty());
    }

    #[test]
    fn query_treats_blank_status_as_unfiltered() {
        let filter = ApplicationQuery {
            status: Some(" ".to_string()),
            ..Default::default()
        }
        .into_filter()
        .unwrap();
        assert_eq!(filter.status, None);

        let result = ApplicationQuery {
            status: Some("Pending".to_string()),
            ..Default::default()
        }
        .into_filter();
        assert!(matches!(result, Err(ApiError::BadRequest(_))));
    }
}
