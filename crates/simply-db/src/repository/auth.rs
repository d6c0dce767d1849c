//! # Auth Repository
//!
//! Staff accounts on SQLite: `users` (e-mail + argon2 hash), `profiles`
//! (full name, role) and opaque `sessions`.
//!
//! ## Sign-in Flow
//! ```text
//! sign_in(email, password)
//!      │
//!      ▼
//! users WHERE email = ? (case-insensitive)
//!      │  missing / hash mismatch ──► InvalidCredentials
//!      ▼
//! INSERT sessions (token = UUID v4)
//!      │
//!      ▼
//! Session { token, user: users ⋈ profiles }
//! ```

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::store::AuthProvider;
use simply_core::{Role, Session, User};

const USER_SELECT: &str = r#"
    SELECT u.id, u.email, p.full_name, COALESCE(p.role, 'vendedor') AS role
    FROM users u
    LEFT JOIN profiles p ON p.id = u.id
"#;

#[derive(Debug, sqlx::FromRow)]
struct SessionRow {
    token: String,
    created_at: DateTime<Utc>,
    user_id: String,
}

fn hash_password(password: &str) -> DbResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| DbError::Internal(format!("Failed to hash password: {}", e)))?;
    Ok(hash.to_string())
}

fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Repository for users, profiles and sessions.
#[derive(Debug, Clone)]
pub struct AuthRepository {
    pool: SqlitePool,
}

impl AuthRepository {
    pub fn new(pool: SqlitePool) -> Self {
        AuthRepository { pool }
    }

    async fn user_by_id(&self, id: &str) -> DbResult<Option<User>> {
        let sql = format!("{USER_SELECT} WHERE u.id = ?1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }
}

#[async_trait]
impl AuthProvider for AuthRepository {
    async fn current_session(&self, token: &str) -> DbResult<Option<Session>> {
        debug!("Resolving session");

        let row = sqlx::query_as::<_, SessionRow>(
            "SELECT token, created_at, user_id FROM sessions WHERE token = ?1",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        Ok(self.user_by_id(&row.user_id).await?.map(|user| Session {
            token: row.token,
            user,
            created_at: row.created_at,
        }))
    }

    async fn sign_in(&self, email: &str, password: &str) -> DbResult<Session> {
        let email = normalize_email(email);
        debug!(email = %email, "Signing in");

        let credentials: Option<(String, String)> =
            sqlx::query_as("SELECT id, password_hash FROM users WHERE email = ?1")
                .bind(&email)
                .fetch_optional(&self.pool)
                .await?;

        let user_id = match credentials {
            Some((id, hash)) if verify_password(password, &hash) => id,
            _ => {
                warn!(email = %email, "Sign-in rejected");
                return Err(DbError::InvalidCredentials);
            }
        };

        let session_token = Uuid::new_v4().to_string();
        let now = Utc::now();
        sqlx::query("INSERT INTO sessions (token, user_id, created_at) VALUES (?1, ?2, ?3)")
            .bind(&session_token)
            .bind(&user_id)
            .bind(now)
            .execute(&self.pool)
            .await?;

        let user = self
            .user_by_id(&user_id)
            .await?
            .ok_or_else(|| DbError::not_found("User", &user_id))?;

        info!(user_id = %user.id, role = ?user.role, "Signed in");

        Ok(Session {
            token: session_token,
            user,
            created_at: now,
        })
    }

    async fn sign_out(&self, token: &str) -> DbResult<()> {
        debug!("Signing out");

        sqlx::query("DELETE FROM sessions WHERE token = ?1")
            .bind(token)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        full_name: Option<&str>,
        role: Role,
    ) -> DbResult<User> {
        let email = normalize_email(email);
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();
        let password_hash = hash_password(password)?;

        debug!(email = %email, role = ?role, "Creating user");

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        sqlx::query("INSERT INTO users (id, email, password_hash, created_at) VALUES (?1, ?2, ?3, ?4)")
            .bind(&id)
            .bind(&email)
            .bind(&password_hash)
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(|e| match DbError::from(e) {
                DbError::UniqueViolation { field, .. } => DbError::UniqueViolation {
                    field,
                    value: email.clone(),
                },
                other => other,
            })?;

        sqlx::query(
            r#"
            INSERT INTO profiles (id, full_name, role, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?4)
            "#,
        )
        .bind(&id)
        .bind(full_name)
        .bind(role)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(user_id = %id, role = ?role, "User created");

        Ok(User {
            id,
            email,
            full_name: full_name.map(str::to_string),
            role,
        })
    }
}
