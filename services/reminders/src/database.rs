//! PostgreSQL-backed [`ReminderSource`]

use async_trait::async_trait;
use chrono::NaiveDate;
use common::error::DatabaseResult;
use common::models::{Application, User};
use common::repositories::{ApplicationRepository, UserRepository};
use sqlx::PgPool;
use uuid::Uuid;

use crate::job::ReminderSource;

#[derive(Clone)]
pub struct PgReminderSource {
    applications: ApplicationRepository,
    users: UserRepository,
}

impl PgReminderSource {
    pub fn new(pool: PgPool) -> Self {
        Self {
            applications: ApplicationRepository::new(pool.clone()),
            users: UserRepository::new(pool),
        }
    }
}

#[async_trait]
impl ReminderSource for PgReminderSource {
    async fn list_due(&self, date: NaiveDate) -> DatabaseResult<Vec<Application>> {
        self.applications.list_due(date).await
    }

    async fn list_due_in_range(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> DatabaseResult<Vec<Application>> {
        self.applications.list_due_in_range(from, to).await
    }

    async fn find_user(&self, id: Uuid) -> DatabaseResult<Option<User>> {
        self.users.find_by_id(id).await
    }
}
