//! Custom error types for the common library
//!
//! This module defines application-specific error types that can be used
//! throughout the application.

use sqlx::Error as SqlxError;
use thiserror::Error;

/// Custom error type for database operations
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Error occurred during database connection
    #[error("Database connection error: {0}")]
    Connection(#[source] SqlxError),

    /// Error occurred during database query execution
    #[error("Database query error: {0}")]
    Query(#[source] SqlxError),

    /// Error occurred during database migration
    #[error("Database migration error: {0}")]
    Migration(String),

    /// Configuration error
    #[error("Database configuration error: {0}")]
    Configuration(String),

    /// A unique constraint rejected the write
    #[error("Duplicate record: {0}")]
    Duplicate(String),

    /// A stored value could not be mapped back onto a domain type
    #[error("Failed to decode row: {0}")]
    Decode(String),
}

impl DatabaseError {
    /// Classify a query error, turning unique violations into [`DatabaseError::Duplicate`]
    pub fn from_query(err: SqlxError) -> Self {
        if let SqlxError::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                let constraint = db_err.constraint().unwrap_or("unique constraint");
                return DatabaseError::Duplicate(constraint.to_string());
            }
        }
        DatabaseError::Query(err)
    }
}

/// Type alias for Result with DatabaseError
pub type DatabaseResult<T> = Result<T, DatabaseError>;

/// Errors raised while building or delivering an email
#[derive(Error, Debug)]
pub enum MailError {
    /// Missing or invalid mail settings
    #[error("Mail configuration error: {0}")]
    Configuration(String),

    /// Sender or recipient is not a valid mailbox
    #[error("Invalid email address {address}: {reason}")]
    Address { address: String, reason: String },

    /// The message could not be assembled
    #[error("Failed to build message: {0}")]
    Build(String),

    /// A body template failed to render
    #[error("Failed to render email template: {0}")]
    Template(#[from] tera::Error),

    /// The transport rejected or failed to deliver the message
    #[error("Mail transport error: {0}")]
    Transport(String),
}

/// Type alias for Result with MailError
pub type MailResult<T> = Result<T, MailError>;
