use sqlx::PgPool;
use uuid::Uuid;

use crate::users::repo_types::User;

impl User {
    pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, role, confirmed, avatar, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    pub async fn find_by_username(db: &PgPool, username: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, role, confirmed, avatar, created_at, updated_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    pub async fn find_by_email(db: &PgPool, email: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, role, confirmed, avatar, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Create a new user with hashed password. Starts unconfirmed with the
    /// default USER role.
    pub async fn create(
        db: &PgPool,
        username: &str,
        email: &str,
        password_hash: &str,
        avatar: Option<&str>,
    ) -> anyhow::Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email, password_hash, avatar)
            VALUES ($1, $2, $3, $4)
            RETURNING id, username, email, password_hash, role, confirmed, avatar, created_at, updated_at
            "#,
        )
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .bind(avatar)
        .fetch_one(db)
        .await?;
        Ok(user)
    }

    /// Mark the user's email as confirmed.
    pub async fn confirm_email(db: &PgPool, email: &str) -> anyhow::Result<()> {
        sqlx::query("UPDATE users SET confirmed = TRUE, updated_at = now() WHERE email = $1")
            .bind(email)
            .execute(db)
            .await?;
        Ok(())
    }

    pub async fn update_avatar(
        db: &PgPool,
        email: &str,
        url: &str,
    ) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users SET avatar = $2, updated_at = now()
            WHERE email = $1
            RETURNING id, username, email, password_hash, role, confirmed, avatar, created_at, updated_at
            "#,
        )
        .bind(email)
        .bind(url)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    pub async fn update_password(
        db: &PgPool,
        email: &str,
        password_hash: &str,
    ) -> anyhow::Result<()> {
        sqlx::query("UPDATE users SET password_hash = $2, updated_at = now() WHERE email = $1")
            .bind(email)
            .bind(password_hash)
            .execute(db)
            .await?;
        Ok(())
    }
}
