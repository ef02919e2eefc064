use sqlx::PgPool;
use uuid::Uuid;

use crate::contacts::dto::ContactPayload;
use crate::contacts::repo_types::Contact;

impl Contact {
    pub async fn create(
        db: &PgPool,
        user_id: Uuid,
        body: &ContactPayload,
    ) -> anyhow::Result<Contact> {
        let contact = sqlx::query_as::<_, Contact>(
            r#"
            INSERT INTO contacts (user_id, first_name, last_name, email, phone_number, birthday, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, user_id, first_name, last_name, email, phone_number, birthday, notes,
                      created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(&body.first_name)
        .bind(&body.last_name)
        .bind(&body.email)
        .bind(&body.phone_number)
        .bind(body.birthday)
        .bind(&body.notes)
        .fetch_one(db)
        .await?;
        Ok(contact)
    }

    pub async fn list(
        db: &PgPool,
        user_id: Uuid,
        skip: i64,
        limit: i64,
    ) -> anyhow::Result<Vec<Contact>> {
        let rows = sqlx::query_as::<_, Contact>(
            r#"
            SELECT id, user_id, first_name, last_name, email, phone_number, birthday, notes,
                   created_at, updated_at
            FROM contacts
            WHERE user_id = $1
            ORDER BY created_at
            OFFSET $2 LIMIT $3
            "#,
        )
        .bind(user_id)
        .bind(skip)
        .bind(limit)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    /// Owner-scoped lookup: a contact belonging to another user resolves to
    /// None, exactly like a nonexistent id.
    pub async fn find(db: &PgPool, user_id: Uuid, id: Uuid) -> anyhow::Result<Option<Contact>> {
        let contact = sqlx::query_as::<_, Contact>(
            r#"
            SELECT id, user_id, first_name, last_name, email, phone_number, birthday, notes,
                   created_at, updated_at
            FROM contacts
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(db)
        .await?;
        Ok(contact)
    }

    /// Full-row replace of the allow-listed fields.
    pub async fn update(
        db: &PgPool,
        user_id: Uuid,
        id: Uuid,
        body: &ContactPayload,
    ) -> anyhow::Result<Option<Contact>> {
        let contact = sqlx::query_as::<_, Contact>(
            r#"
            UPDATE contacts
            SET first_name = $3, last_name = $4, email = $5, phone_number = $6,
                birthday = $7, notes = $8, updated_at = now()
            WHERE id = $1 AND user_id = $2
            RETURNING id, user_id, first_name, last_name, email, phone_number, birthday, notes,
                      created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(&body.first_name)
        .bind(&body.last_name)
        .bind(&body.email)
        .bind(&body.phone_number)
        .bind(body.birthday)
        .bind(&body.notes)
        .fetch_optional(db)
        .await?;
        Ok(contact)
    }

    pub async fn delete(db: &PgPool, user_id: Uuid, id: Uuid) -> anyhow::Result<bool> {
        let deleted = sqlx::query_scalar::<_, Uuid>(
            "DELETE FROM contacts WHERE id = $1 AND user_id = $2 RETURNING id",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(db)
        .await?;
        Ok(deleted.is_some())
    }

    /// Case-insensitive substring search across name, email, phone and notes.
    pub async fn search(
        db: &PgPool,
        user_id: Uuid,
        text: &str,
        skip: i64,
        limit: i64,
    ) -> anyhow::Result<Vec<Contact>> {
        let pattern = format!("%{text}%");
        let rows = sqlx::query_as::<_, Contact>(
            r#"
            SELECT id, user_id, first_name, last_name, email, phone_number, birthday, notes,
                   created_at, updated_at
            FROM contacts
            WHERE user_id = $1
              AND (first_name ILIKE $2
                   OR last_name ILIKE $2
                   OR email ILIKE $2
                   OR phone_number ILIKE $2
                   OR notes ILIKE $2)
            ORDER BY created_at
            OFFSET $3 LIMIT $4
            "#,
        )
        .bind(user_id)
        .bind(&pattern)
        .bind(skip)
        .bind(limit)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    /// Every contact of the user, for the in-process birthday-window filter.
    pub async fn list_all(db: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<Contact>> {
        let rows = sqlx::query_as::<_, Contact>(
            r#"
            SELECT id, user_id, first_name, last_name, email, phone_number, birthday, notes,
                   created_at, updated_at
            FROM contacts
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }
}
