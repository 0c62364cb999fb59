use sqlx::PgPool;
use time::OffsetDateTime;
use uuid::Uuid;

pub use crate::auth::repo_types::{Role, User};

// All default lookups exclude deactivated accounts; a soft-deleted user is
// invisible to login, token resolution and reset-token exchange alike.

impl User {
    pub async fn find_by_email(db: &PgPool, email: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, role, password_changed_at,
                   password_reset_token_hash, password_reset_expires_at, active, created_at
            FROM users
            WHERE email = $1 AND active = TRUE
            "#,
        )
        .bind(email)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, role, password_changed_at,
                   password_reset_token_hash, password_reset_expires_at, active, created_at
            FROM users
            WHERE id = $1 AND active = TRUE
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Create a new user with an already-hashed password. Role always
    /// starts as the column default `user`.
    pub async fn create(
        db: &PgPool,
        name: Option<&str>,
        email: &str,
        password_hash: &str,
    ) -> anyhow::Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, name, email, password_hash, role, password_changed_at,
                      password_reset_token_hash, password_reset_expires_at, active, created_at
            "#,
        )
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .fetch_one(db)
        .await?;
        Ok(user)
    }

    /// Store the hash and expiry of a fresh reset token. Targeted UPDATE:
    /// nothing else on the row is touched or re-validated.
    pub async fn set_reset_token(
        db: &PgPool,
        id: Uuid,
        token_hash: &str,
        expires_at: OffsetDateTime,
    ) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE users
            SET password_reset_token_hash = $2, password_reset_expires_at = $3
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(token_hash)
        .bind(expires_at)
        .execute(db)
        .await?;
        Ok(())
    }

    /// Rollback path for forgot-password: if the email never went out, the
    /// token must not stay resolvable.
    pub async fn clear_reset_token(db: &PgPool, id: Uuid) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE users
            SET password_reset_token_hash = NULL, password_reset_expires_at = NULL
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(db)
        .await?;
        Ok(())
    }

    /// Exchange a hashed reset token for its owner. Wrong token and expired
    /// token both come back as `None`; the caller cannot tell them apart.
    pub async fn find_by_reset_token(
        db: &PgPool,
        token_hash: &str,
    ) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, role, password_changed_at,
                   password_reset_token_hash, password_reset_expires_at, active, created_at
            FROM users
            WHERE password_reset_token_hash = $1
              AND password_reset_expires_at > now()
              AND active = TRUE
            "#,
        )
        .bind(token_hash)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Single mutation for every password change: new hash, stamp
    /// `password_changed_at`, and consume any outstanding reset token.
    pub async fn update_password(
        db: &PgPool,
        id: Uuid,
        password_hash: &str,
    ) -> anyhow::Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET password_hash = $2,
                password_changed_at = now(),
                password_reset_token_hash = NULL,
                password_reset_expires_at = NULL
            WHERE id = $1
            RETURNING id, name, email, password_hash, role, password_changed_at,
                      password_reset_token_hash, password_reset_expires_at, active, created_at
            "#,
        )
        .bind(id)
        .bind(password_hash)
        .fetch_one(db)
        .await?;
        Ok(user)
    }
}
