//! Shared library for the job tracker services
//!
//! Database and Redis connectivity, the domain models and their
//! repositories, outbound mail and the follow-up [`notifier::Notifier`].

pub mod cache;
pub mod database;
pub mod error;
pub mod logging;
pub mod mail;
pub mod models;
pub mod notifier;
pub mod repositories;

/// Example usage: list today's due follow-ups
///
/// ```rust,no_run
/// use common::database::{DatabaseConfig, init_pool};
/// use common::repositories::ApplicationRepository;
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let pool = init_pool(&DatabaseConfig::from_env()?).await?;
///     let due = ApplicationRepository::new(pool)
///         .list_due(chrono::Local::now().date_naive())
///         .await?;
///     println!("{} follow-ups due today", due.len());
///     Ok(())
/// }
/// ```
pub fn example_usage() {}
