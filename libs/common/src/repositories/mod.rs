//! Repositories for database operations
//!
//! These form the record store: users, and applications always looked up
//! through their owner, plus the follow-up selections used by reminders.

pub mod application;
pub mod user;

pub use application::{ApplicationFilter, ApplicationRepository};
pub use user::UserRepository;
