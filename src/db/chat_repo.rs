// src/db/chat_repo.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{common::error::AppError, models::chat::ChatMessage};

#[derive(Clone)]
pub struct ChatRepository {
    pool: PgPool,
}

impl ChatRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert(
        &self,
        organization_id: Uuid,
        job_id: Uuid,
        sender_id: Uuid,
        body: &str,
    ) -> Result<ChatMessage, AppError> {
        let message = sqlx::query_as::<_, ChatMessage>(
            r#"
            INSERT INTO chat_messages (organization_id, job_id, sender_id, body)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(organization_id)
        .bind(job_id)
        .bind(sender_id)
        .bind(body)
        .fetch_one(&self.pool)
        .await?;

        Ok(message)
    }

    // Mensagens apagadas mantêm a linha, mas o corpo sai vazio na leitura
    pub async fn list_by_job(
        &self,
        organization_id: Uuid,
        job_id: Uuid,
    ) -> Result<Vec<ChatMessage>, AppError> {
        let messages = sqlx::query_as::<_, ChatMessage>(
            r#"
            SELECT id, organization_id, job_id, sender_id,
                   CASE WHEN deleted_at IS NOT NULL THEN '' ELSE body END AS body,
                   edited_at, deleted_at, created_at
            FROM chat_messages
            WHERE organization_id = $1 AND job_id = $2
            ORDER BY created_at
            "#,
        )
        .bind(organization_id)
        .bind(job_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(messages)
    }

    pub async fn find_by_id(
        &self,
        organization_id: Uuid,
        message_id: Uuid,
    ) -> Result<Option<ChatMessage>, AppError> {
        let message = sqlx::query_as::<_, ChatMessage>(
            "SELECT * FROM chat_messages WHERE organization_id = $1 AND id = $2",
        )
        .bind(organization_id)
        .bind(message_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(message)
    }

    // Edição in-place: o corpo muda, `edited_at` marca que mudou
    pub async fn edit(
        &self,
        organization_id: Uuid,
        message_id: Uuid,
        body: &str,
    ) -> Result<Option<ChatMessage>, AppError> {
        let message = sqlx::query_as::<_, ChatMessage>(
            r#"
            UPDATE chat_messages
            SET body = $3, edited_at = NOW()
            WHERE organization_id = $1 AND id = $2 AND deleted_at IS NULL
            RETURNING *
            "#,
        )
        .bind(organization_id)
        .bind(message_id)
        .bind(body)
        .fetch_optional(&self.pool)
        .await?;

        Ok(message)
    }

    pub async fn soft_delete(
        &self,
        organization_id: Uuid,
        message_id: Uuid,
    ) -> Result<Option<ChatMessage>, AppError> {
        let message = sqlx::query_as::<_, ChatMessage>(
            r#"
            UPDATE chat_messages
            SET deleted_at = NOW()
            WHERE organization_id = $1 AND id = $2 AND deleted_at IS NULL
            RETURNING *
            "#,
        )
        .bind(organization_id)
        .bind(message_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(message)
    }
}
