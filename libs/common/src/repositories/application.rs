//! Application repository for database operations
//!
//! Every owner-facing query is keyed on `user_id` as well as the row id, so
//! one user can never read or modify another user's records through it.

use chrono::{NaiveDate, Utc};
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::info;
use uuid::Uuid;

use crate::error::{DatabaseError, DatabaseResult};
use crate::models::{
    Application, ApplicationStatus, NewApplication, UpdateApplication,
};

const APPLICATION_COLUMNS: &str = "id, user_id, company, position, status, date_applied, \
     follow_up_date, notes, created_at, updated_at";

/// Default page size for owner listings
pub const DEFAULT_PER_PAGE: u32 = 10;
/// Upper bound on page size
pub const MAX_PER_PAGE: u32 = 100;

/// Search and pagination options for an owner's applications
#[derive(Debug, Clone, Default)]
pub struct ApplicationFilter {
    /// Case-insensitive substring of the company name
    pub company: Option<String>,
    pub status: Option<ApplicationStatus>,
    /// 1-based page number
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl ApplicationFilter {
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn per_page(&self) -> u32 {
        self.per_page
            .unwrap_or(DEFAULT_PER_PAGE)
            .clamp(1, MAX_PER_PAGE)
    }

    fn offset(&self) -> i64 {
        (self.page() - 1) as i64 * self.per_page() as i64
    }

    fn company_pattern(&self) -> Option<String> {
        self.company
            .as_deref()
            .map(str::trim)
            .filter(|company| !company.is_empty())
            .map(|company| format!("%{}%", escape_like(company)))
    }
}

/// Result of an update, carrying the status the row had before
#[derive(Debug, Clone)]
pub struct UpdatedApplication {
    pub previous_status: ApplicationStatus,
    pub application: Application,
}

impl UpdatedApplication {
    pub fn status_changed(&self) -> bool {
        self.previous_status != self.application.status
    }
}

/// Application repository
#[derive(Clone)]
pub struct ApplicationRepository {
    pool: PgPool,
}

impl ApplicationRepository {
    /// Create a new application repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create an application owned by `owner`
    pub async fn create(&self, owner: Uuid, new: &NewApplication) -> DatabaseResult<Application> {
        let now = Utc::now();
        let date_applied = new.date_applied.unwrap_or_else(|| now.date_naive());

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO applications
                (id, user_id, company, position, status, date_applied, follow_up_date, notes,
                 created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9)
            RETURNING {APPLICATION_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(owner)
        .bind(&new.company)
        .bind(&new.position)
        .bind(new.status.as_str())
        .bind(date_applied)
        .bind(new.follow_up_date)
        .bind(&new.notes)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        let application = map_application(&row)?;
        info!(
            "User {} created application {} for {}",
            owner, application.id, application.company
        );
        Ok(application)
    }

    /// Fetch one application if it belongs to `owner`
    pub async fn find_for_owner(&self, owner: Uuid, id: Uuid) -> DatabaseResult<Option<Application>> {
        let row = sqlx::query(&format!(
            "SELECT {APPLICATION_COLUMNS} FROM applications WHERE id = $1 AND user_id = $2"
        ))
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::Query)?;

        row.as_ref().map(map_application).transpose()
    }

    /// List an owner's applications, newest application date first
    ///
    /// Returns the requested page together with the total number of matches.
    pub async fn list_for_owner(
        &self,
        owner: Uuid,
        filter: &ApplicationFilter,
    ) -> DatabaseResult<(Vec<Application>, i64)> {
        let company = filter.company_pattern();
        let status = filter.status.map(|status| status.as_str());

        let rows = sqlx::query(&format!(
            r#"
            SELECT {APPLICATION_COLUMNS}
            FROM applications
            WHERE user_id = $1
              AND ($2::text IS NULL OR company ILIKE $2)
              AND ($3::text IS NULL OR status = $3)
            ORDER BY date_applied DESC, created_at DESC, id
            LIMIT $4 OFFSET $5
            "#
        ))
        .bind(owner)
        .bind(&company)
        .bind(status)
        .bind(filter.per_page() as i64)
        .bind(filter.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::Query)?;

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM applications
            WHERE user_id = $1
              AND ($2::text IS NULL OR company ILIKE $2)
              AND ($3::text IS NULL OR status = $3)
            "#,
        )
        .bind(owner)
        .bind(&company)
        .bind(status)
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::Query)?;

        let applications = rows
            .iter()
            .map(map_application)
            .collect::<DatabaseResult<Vec<_>>>()?;

        Ok((applications, total))
    }

    /// The `limit` most recently applied-for applications of an owner
    pub async fn recent_for_owner(&self, owner: Uuid, limit: u32) -> DatabaseResult<Vec<Application>> {
        let (applications, _) = self
            .list_for_owner(
                owner,
                &ApplicationFilter {
                    per_page: Some(limit),
                    ..Default::default()
                },
            )
            .await?;
        Ok(applications)
    }

    /// Count an owner's applications, optionally restricted to one status
    pub async fn count_for_owner(
        &self,
        owner: Uuid,
        status: Option<ApplicationStatus>,
    ) -> DatabaseResult<i64> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM applications WHERE user_id = $1 AND ($2::text IS NULL OR status = $2)",
        )
        .bind(owner)
        .bind(status.map(|status| status.as_str()))
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::Query)
    }

    /// Apply a partial update to an owner's application
    ///
    /// Returns `None` when the application does not exist or belongs to
    /// someone else.
    pub async fn update_for_owner(
        &self,
        owner: Uuid,
        id: Uuid,
        update: &UpdateApplication,
    ) -> DatabaseResult<Option<UpdatedApplication>> {
        let mut tx = self.pool.begin().await.map_err(DatabaseError::Connection)?;

        let row = sqlx::query(&format!(
            "SELECT {APPLICATION_COLUMNS} FROM applications WHERE id = $1 AND user_id = $2 FOR UPDATE"
        ))
        .bind(id)
        .bind(owner)
        .fetch_optional(&mut *tx)
        .await
        .map_err(DatabaseError::Query)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let mut application = map_application(&row)?;
        let previous_status = application.status;
        update.apply_to(&mut application);
        application.updated_at = Utc::now();

        sqlx::query(
            r#"
            UPDATE applications
            SET company = $1, position = $2, status = $3, date_applied = $4,
                follow_up_date = $5, notes = $6, updated_at = $7
            WHERE id = $8 AND user_id = $9
            "#,
        )
        .bind(&application.company)
        .bind(&application.position)
        .bind(application.status.as_str())
        .bind(application.date_applied)
        .bind(application.follow_up_date)
        .bind(&application.notes)
        .bind(application.updated_at)
        .bind(id)
        .bind(owner)
        .execute(&mut *tx)
        .await
        .map_err(DatabaseError::Query)?;

        tx.commit().await.map_err(DatabaseError::Query)?;

        info!("User {} updated application {} for {}", owner, id, application.company);
        Ok(Some(UpdatedApplication {
            previous_status,
            application,
        }))
    }

    /// Delete an owner's application; false when nothing matched
    pub async fn delete_for_owner(&self, owner: Uuid, id: Uuid) -> DatabaseResult<bool> {
        let result = sqlx::query("DELETE FROM applications WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner)
            .execute(&self.pool)
            .await
            .map_err(DatabaseError::Query)?;

        Ok(result.rows_affected() > 0)
    }

    /// Applications awaiting a response whose follow-up falls on `date`
    pub async fn list_due(&self, date: NaiveDate) -> DatabaseResult<Vec<Application>> {
        self.list_due_in_range(date, date).await
    }

    /// Applications awaiting a response whose follow-up falls in `[from, to]`
    ///
    /// Ordered by follow-up date, then creation time, then id, so repeated
    /// runs over the same data visit records in the same order.
    pub async fn list_due_in_range(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> DatabaseResult<Vec<Application>> {
        let statuses: Vec<String> = ApplicationStatus::AWAITING_RESPONSE
            .iter()
            .map(|status| status.as_str().to_string())
            .collect();

        let rows = sqlx::query(&format!(
            r#"
            SELECT {APPLICATION_COLUMNS}
            FROM applications
            WHERE follow_up_date >= $1
              AND follow_up_date <= $2
              AND status = ANY($3)
            ORDER BY follow_up_date, created_at, id
            "#
        ))
        .bind(from)
        .bind(to)
        .bind(&statuses)
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::Query)?;

        rows.iter().map(map_application).collect()
    }
}

fn map_application(row: &PgRow) -> DatabaseResult<Application> {
    let status: String = row.try_get("status").map_err(DatabaseError::Query)?;
    let status = status
        .parse()
        .map_err(|e: crate::models::ParseStatusError| DatabaseError::Decode(e.to_string()))?;

    Ok(Application {
        id: row.try_get("id").map_err(DatabaseError::Query)?,
        user_id: row.try_get("user_id").map_err(DatabaseError::Query)?,
        company: row.try_get("company").map_err(DatabaseError::Query)?,
        position: row.try_get("position").map_err(DatabaseError::Query)?,
        status,
        date_applied: row.try_get("date_applied").map_err(DatabaseError::Query)?,
        follow_up_date: row.try_get("follow_up_date").map_err(DatabaseError::Query)?,
        notes: row.try_get("notes").map_err(DatabaseError::Query)?,
        created_at: row.try_get("created_at").map_err(DatabaseError::Query)?,
        updated_at: row.try_get("updated_at").map_err(DatabaseError::Query)?,
    })
}

/// Escape LIKE wildcards so user input matches literally
fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
