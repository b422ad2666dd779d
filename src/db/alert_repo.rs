// src/db/alert_repo.rs

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{common::error::AppError, models::alerts::Alert};

#[derive(Clone)]
pub struct AlertRepository {
    pool: PgPool,
}

impl AlertRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert(
        &self,
        organization_id: Uuid,
        message: &str,
        scheduled_at: DateTime<Utc>,
        created_by: Uuid,
    ) -> Result<Alert, AppError> {
        let alert = sqlx::query_as::<_, Alert>(
            r#"
            INSERT INTO alerts (organization_id, message, scheduled_at, created_by)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(organization_id)
        .bind(message)
        .bind(scheduled_at)
        .bind(created_by)
        .fetch_one(&self.pool)
        .await?;

        Ok(alert)
    }

    pub async fn list(&self, organization_id: Uuid) -> Result<Vec<Alert>, AppError> {
        let alerts = sqlx::query_as::<_, Alert>(
            "SELECT * FROM alerts WHERE organization_id = $1 ORDER BY scheduled_at DESC",
        )
        .bind(organization_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(alerts)
    }

    pub async fn find_by_id(
        &self,
        organization_id: Uuid,
        alert_id: Uuid,
    ) -> Result<Option<Alert>, AppError> {
        let alert = sqlx::query_as::<_, Alert>(
            "SELECT * FROM alerts WHERE organization_id = $1 AND id = $2",
        )
        .bind(organization_id)
        .bind(alert_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(alert)
    }

    // O "aviso ativo": o mais antigo já agendado que o usuário ainda não leu
    pub async fn active_for_user(
        &self,
        organization_id: Uuid,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<Alert>, AppError> {
        let alert = sqlx::query_as::<_, Alert>(
            r#"
            SELECT a.* FROM alerts a
            WHERE a.organization_id = $1
              AND a.scheduled_at <= $3
              AND NOT EXISTS (
                  SELECT 1 FROM alert_reads r
                  WHERE r.alert_id = a.id AND r.user_id = $2
              )
            ORDER BY a.scheduled_at
            LIMIT 1
            "#,
        )
        .bind(organization_id)
        .bind(user_id)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        Ok(alert)
    }

    // Idempotente: repetir o "ciente" não duplica a leitura (PK composta)
    pub async fn acknowledge(&self, alert_id: Uuid, user_id: Uuid) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO alert_reads (alert_id, user_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(alert_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
