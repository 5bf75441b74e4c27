//! User repository for database operations

use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};
use chrono::Utc;
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::info;
use uuid::Uuid;

use crate::error::{DatabaseError, DatabaseResult};
use crate::models::{NewUser, User};

const USER_COLUMNS: &str = "id, email, name, password_hash, created_at, updated_at";

/// User repository
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new user, hashing the plaintext password with Argon2
    ///
    /// A second account for the same email (compared case-insensitively)
    /// fails with [`DatabaseError::Duplicate`].
    pub async fn create(&self, new_user: &NewUser) -> DatabaseResult<User> {
        info!("Creating new user: {}", new_user.email);

        let password_hash = hash_password(&new_user.password)?;
        let now = Utc::now();

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO users (id, email, name, password_hash, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $5)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(new_user.email.trim())
        .bind(new_user.name.as_deref().map(str::trim))
        .bind(&password_hash)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        map_user(&row)
    }

    /// Find a user by email
    pub async fn find_by_email(&self, email: &str) -> DatabaseResult<Option<User>> {
        let row = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE LOWER(email) = LOWER($1)"
        ))
        .bind(email.trim())
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::Query)?;

        row.as_ref().map(map_user).transpose()
    }

    /// Find a user by ID
    pub async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<User>> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::Query)?;

        row.as_ref().map(map_user).transpose()
    }

    /// Delete a user; their applications go with them via `ON DELETE CASCADE`
    pub async fn delete(&self, id: Uuid) -> DatabaseResult<bool> {
        info!("Deleting user: {}", id);

        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(DatabaseError::Query)?;

        Ok(result.rows_affected() > 0)
    }

    /// Verify a user's password
    pub fn verify_password(&self, user: &User, password: &str) -> DatabaseResult<bool> {
        verify_password(&user.password_hash, password)
    }
}

fn map_user(row: &PgRow) -> DatabaseResult<User> {
    Ok(User {
        id: row.try_get("id").map_err(DatabaseError::Query)?,
        email: row.try_get("email").map_err(DatabaseError::Query)?,
        name: row.try_get("name").map_err(DatabaseError::Query)?,
        password_hash: row.try_get("password_hash").map_err(DatabaseError::Query)?,
        created_at: row.try_get("created_at").map_err(DatabaseError::Query)?,
        updated_at: row.try_get("updated_at").map_err(DatabaseError::Query)?,
    })
}

/// Hash a plaintext password into a PHC string
pub fn hash_password(password: &str) -> DatabaseResult<String> {
    let salt = SaltString::generate(&mut rand::thread_rng());
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| DatabaseError::Configuration(format!("Failed to hash password: {}", e)))
}

/// Check a plaintext password against a stored PHC string
pub fn verify_password(password_hash: &str, password: &str) -> DatabaseResult<bool> {
    let parsed_hash = PasswordHash::new(password_hash)
        .map_err(|e| DatabaseError::Decode(format!("Failed to parse password hash: {}", e)))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}
