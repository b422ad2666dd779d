// src/db/job_repo.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::jobs::{Job, JobHistoryEntry, JobItem, JobStatus, JobUrgency},
};

#[derive(Clone)]
pub struct JobRepository {
    pool: PgPool,
}

impl JobRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  TRABALHOS
    // =========================================================================

    pub async fn insert_job<'e, E>(
        &self,
        executor: E,
        organization_id: Uuid,
        created_by: Uuid,
        client_user_id: Option<Uuid>,
        assigned_user_id: Option<Uuid>,
        patient_name: Option<&str>,
        job_type_id: Option<Uuid>,
        sector_id: Option<Uuid>,
        urgency: JobUrgency,
        notes: Option<&str>,
        due_date: Option<NaiveDate>,
    ) -> Result<Job, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let job = sqlx::query_as::<_, Job>(
            r#"
            INSERT INTO jobs (
                organization_id, created_by, client_user_id, assigned_user_id,
                patient_name, job_type_id, sector_id, urgency, notes, due_date
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(organization_id)
        .bind(created_by)
        .bind(client_user_id)
        .bind(assigned_user_id)
        .bind(patient_name)
        .bind(job_type_id)
        .bind(sector_id)
        .bind(urgency)
        .bind(notes)
        .bind(due_date)
        .fetch_one(executor)
        .await?;

        Ok(job)
    }

    pub async fn find_by_id(
        &self,
        organization_id: Uuid,
        job_id: Uuid,
    ) -> Result<Option<Job>, AppError> {
        let job = sqlx::query_as::<_, Job>(
            "SELECT * FROM jobs WHERE organization_id = $1 AND id = $2",
        )
        .bind(organization_id)
        .bind(job_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(job)
    }

    pub async fn list(
        &self,
        organization_id: Uuid,
        status: Option<JobStatus>,
        urgency: Option<JobUrgency>,
        client_user_id: Option<Uuid>,
    ) -> Result<Vec<Job>, AppError> {
        // Filtros opcionais via "parâmetro nulo ignora"
        let jobs = sqlx::query_as::<_, Job>(
            r#"
            SELECT * FROM jobs
            WHERE organization_id = $1
              AND ($2::job_status IS NULL OR status = $2)
              AND ($3::job_urgency IS NULL OR urgency = $3)
              AND ($4::uuid IS NULL OR client_user_id = $4)
            ORDER BY created_at DESC
            "#,
        )
        .bind(organization_id)
        .bind(status)
        .bind(urgency)
        .bind(client_user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(jobs)
    }

    pub async fn update_fields<'e, E>(
        &self,
        executor: E,
        organization_id: Uuid,
        job_id: Uuid,
        patient_name: Option<&str>,
        job_type_id: Option<Uuid>,
        sector_id: Option<Uuid>,
        assigned_user_id: Option<Uuid>,
        urgency: Option<JobUrgency>,
        notes: Option<&str>,
        due_date: Option<NaiveDate>,
        chat_enabled: Option<bool>,
    ) -> Result<Option<Job>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let job = sqlx::query_as::<_, Job>(
            r#"
            UPDATE jobs
            SET patient_name     = COALESCE($3, patient_name),
                job_type_id      = COALESCE($4, job_type_id),
                sector_id        = COALESCE($5, sector_id),
                assigned_user_id = COALESCE($6, assigned_user_id),
                urgency          = COALESCE($7, urgency),
                notes            = COALESCE($8, notes),
                due_date         = COALESCE($9, due_date),
                chat_enabled     = COALESCE($10, chat_enabled),
                updated_at       = NOW()
            WHERE organization_id = $1 AND id = $2
            RETURNING *
            "#,
        )
        .bind(organization_id)
        .bind(job_id)
        .bind(patient_name)
        .bind(job_type_id)
        .bind(sector_id)
        .bind(assigned_user_id)
        .bind(urgency)
        .bind(notes)
        .bind(due_date)
        .bind(chat_enabled)
        .fetch_optional(executor)
        .await?;

        Ok(job)
    }

    pub async fn update_status<'e, E>(
        &self,
        executor: E,
        organization_id: Uuid,
        job_id: Uuid,
        status: JobStatus,
    ) -> Result<Job, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let job = sqlx::query_as::<_, Job>(
            r#"
            UPDATE jobs SET status = $3, updated_at = NOW()
            WHERE organization_id = $1 AND id = $2
            RETURNING *
            "#,
        )
        .bind(organization_id)
        .bind(job_id)
        .bind(status)
        .fetch_one(executor)
        .await?;

        Ok(job)
    }

    pub async fn delete<'e, E>(
        &self,
        executor: E,
        organization_id: Uuid,
        job_id: Uuid,
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM jobs WHERE organization_id = $1 AND id = $2")
            .bind(organization_id)
            .bind(job_id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected())
    }

    // =========================================================================
    //  ITENS
    // =========================================================================

    pub async fn insert_item<'e, E>(
        &self,
        executor: E,
        organization_id: Uuid,
        job_id: Uuid,
        description: &str,
        quantity: Decimal,
        unit_price: Decimal,
    ) -> Result<JobItem, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let item = sqlx::query_as::<_, JobItem>(
            r#"
            INSERT INTO job_items (organization_id, job_id, description, quantity, unit_price)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(organization_id)
        .bind(job_id)
        .bind(description)
        .bind(quantity)
        .bind(unit_price)
        .fetch_one(executor)
        .await?;

        Ok(item)
    }

    pub async fn update_item<'e, E>(
        &self,
        executor: E,
        organization_id: Uuid,
        item_id: Uuid,
        description: Option<&str>,
        quantity: Option<Decimal>,
        unit_price: Option<Decimal>,
    ) -> Result<Option<JobItem>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let item = sqlx::query_as::<_, JobItem>(
            r#"
            UPDATE job_items
            SET description = COALESCE($3, description),
                quantity    = COALESCE($4, quantity),
                unit_price  = COALESCE($5, unit_price)
            WHERE organization_id = $1 AND id = $2
            RETURNING *
            "#,
        )
        .bind(organization_id)
        .bind(item_id)
        .bind(description)
        .bind(quantity)
        .bind(unit_price)
        .fetch_optional(executor)
        .await?;

        Ok(item)
    }

    pub async fn delete_item<'e, E>(
        &self,
        executor: E,
        organization_id: Uuid,
        item_id: Uuid,
    ) -> Result<Option<Uuid>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        // Devolve o job para o service recalcular o total
        let job_id = sqlx::query_scalar::<_, Uuid>(
            "DELETE FROM job_items WHERE organization_id = $1 AND id = $2 RETURNING job_id",
        )
        .bind(organization_id)
        .bind(item_id)
        .fetch_optional(executor)
        .await?;

        Ok(job_id)
    }

    pub async fn list_items(
        &self,
        organization_id: Uuid,
        job_id: Uuid,
    ) -> Result<Vec<JobItem>, AppError> {
        let items = sqlx::query_as::<_, JobItem>(
            r#"
            SELECT * FROM job_items
            WHERE organization_id = $1 AND job_id = $2
            ORDER BY created_at
            "#,
        )
        .bind(organization_id)
        .bind(job_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    // Recalcula e atualiza o total em UMA única query, dentro da mesma
    // transação que mexeu nos itens.
    pub async fn recalculate_total<'e, E>(
        &self,
        executor: E,
        organization_id: Uuid,
        job_id: Uuid,
    ) -> Result<Decimal, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let total = sqlx::query_scalar::<_, Decimal>(
            r#"
            UPDATE jobs
            SET total_value = (
                SELECT COALESCE(SUM(quantity * unit_price), 0)
                FROM job_items
                WHERE job_items.job_id = jobs.id
            ),
            updated_at = NOW()
            WHERE id = $1 AND organization_id = $2
            RETURNING total_value
            "#,
        )
        .bind(job_id)
        .bind(organization_id)
        .fetch_one(executor)
        .await?;

        Ok(total)
    }

    // =========================================================================
    //  HISTÓRICO (append-only)
    // =========================================================================

    pub async fn insert_history<'e, E>(
        &self,
        executor: E,
        organization_id: Uuid,
        job_id: Uuid,
        user_id: Uuid,
        action: &str,
        detail: Option<&str>,
    ) -> Result<JobHistoryEntry, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let entry = sqlx::query_as::<_, JobHistoryEntry>(
            r#"
            INSERT INTO job_history (organization_id, job_id, user_id, action, detail)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(organization_id)
        .bind(job_id)
        .bind(user_id)
        .bind(action)
        .bind(detail)
        .fetch_one(executor)
        .await?;

        Ok(entry)
    }

    pub async fn list_history(
        &self,
        organization_id: Uuid,
        job_id: Uuid,
    ) -> Result<Vec<JobHistoryEntry>, AppError> {
        let entries = sqlx::query_as::<_, JobHistoryEntry>(
            r#"
            SELECT * FROM job_history
            WHERE organization_id = $1 AND job_id = $2
            ORDER BY created_at
            "#,
        )
        .bind(organization_id)
        .bind(job_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    // =========================================================================
    //  FATURAMENTO
    // =========================================================================

    pub async fn list_completed_unbilled<'e, E>(
        &self,
        executor: E,
        organization_id: Uuid,
        client_user_id: Uuid,
        period_start: NaiveDate,
        period_end: NaiveDate,
    ) -> Result<Vec<Job>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let jobs = sqlx::query_as::<_, Job>(
            r#"
            SELECT * FROM jobs
            WHERE organization_id = $1
              AND client_user_id = $2
              AND status = 'COMPLETED'
              AND billing_batch_id IS NULL
              AND created_at::date BETWEEN $3 AND $4
            ORDER BY created_at
            "#,
        )
        .bind(organization_id)
        .bind(client_user_id)
        .bind(period_start)
        .bind(period_end)
        .fetch_all(executor)
        .await?;

        Ok(jobs)
    }

    pub async fn assign_batch<'e, E>(
        &self,
        executor: E,
        organization_id: Uuid,
        batch_id: Uuid,
        job_ids: &[Uuid],
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            UPDATE jobs SET billing_batch_id = $2, updated_at = NOW()
            WHERE organization_id = $1 AND id = ANY($3)
            "#,
        )
        .bind(organization_id)
        .bind(batch_id)
        .bind(job_ids)
        .execute(executor)
        .await?;

        Ok(())
    }
}
