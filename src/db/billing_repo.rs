// src/db/billing_repo.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::billing::{BatchStatus, BillingBatch, CommissionRecord, CommissionStatus},
};

#[derive(Clone)]
pub struct BillingRepository {
    pool: PgPool,
}

impl BillingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  LOTES DE FATURAMENTO
    // =========================================================================

    pub async fn insert_batch<'e, E>(
        &self,
        executor: E,
        organization_id: Uuid,
        client_user_id: Uuid,
        period_start: NaiveDate,
        period_end: NaiveDate,
        total: Decimal,
    ) -> Result<BillingBatch, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let batch = sqlx::query_as::<_, BillingBatch>(
            r#"
            INSERT INTO billing_batches (
                organization_id, client_user_id, period_start, period_end, total
            )
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(organization_id)
        .bind(client_user_id)
        .bind(period_start)
        .bind(period_end)
        .bind(total)
        .fetch_one(executor)
        .await?;

        Ok(batch)
    }

    pub async fn find_batch<'e, E>(
        &self,
        executor: E,
        organization_id: Uuid,
        batch_id: Uuid,
    ) -> Result<Option<BillingBatch>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let batch = sqlx::query_as::<_, BillingBatch>(
            "SELECT * FROM billing_batches WHERE organization_id = $1 AND id = $2",
        )
        .bind(organization_id)
        .bind(batch_id)
        .fetch_optional(executor)
        .await?;

        Ok(batch)
    }

    pub async fn list_batches(
        &self,
        organization_id: Uuid,
    ) -> Result<Vec<BillingBatch>, AppError> {
        let batches = sqlx::query_as::<_, BillingBatch>(
            "SELECT * FROM billing_batches WHERE organization_id = $1 ORDER BY created_at DESC",
        )
        .bind(organization_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(batches)
    }

    pub async fn mark_charged<'e, E>(
        &self,
        executor: E,
        organization_id: Uuid,
        batch_id: Uuid,
        boleto_url: &str,
        gateway_charge_id: &str,
    ) -> Result<BillingBatch, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let batch = sqlx::query_as::<_, BillingBatch>(
            r#"
            UPDATE billing_batches
            SET status = 'CHARGED', boleto_url = $3, gateway_charge_id = $4, updated_at = NOW()
            WHERE organization_id = $1 AND id = $2
            RETURNING *
            "#,
        )
        .bind(organization_id)
        .bind(batch_id)
        .bind(boleto_url)
        .bind(gateway_charge_id)
        .fetch_one(executor)
        .await?;

        Ok(batch)
    }

    // Usado pelo webhook: o gateway só conhece o id da cobrança
    pub async fn set_status_by_charge(
        &self,
        gateway_charge_id: &str,
        status: BatchStatus,
    ) -> Result<Option<BillingBatch>, AppError> {
        let batch = sqlx::query_as::<_, BillingBatch>(
            r#"
            UPDATE billing_batches
            SET status = $2, updated_at = NOW()
            WHERE gateway_charge_id = $1
            RETURNING *
            "#,
        )
        .bind(gateway_charge_id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await?;

        Ok(batch)
    }

    // =========================================================================
    //  COMISSÕES
    // =========================================================================

    pub async fn insert_commission<'e, E>(
        &self,
        executor: E,
        organization_id: Uuid,
        user_id: Uuid,
        job_id: Uuid,
        job_item_id: Uuid,
        amount: Decimal,
    ) -> Result<CommissionRecord, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let record = sqlx::query_as::<_, CommissionRecord>(
            r#"
            INSERT INTO commission_records (
                organization_id, user_id, job_id, job_item_id, amount
            )
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(organization_id)
        .bind(user_id)
        .bind(job_id)
        .bind(job_item_id)
        .bind(amount)
        .fetch_one(executor)
        .await?;

        Ok(record)
    }

    pub async fn list_commissions<'e, E>(
        &self,
        executor: E,
        organization_id: Uuid,
        user_id: Option<Uuid>,
        status: Option<CommissionStatus>,
    ) -> Result<Vec<CommissionRecord>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let records = sqlx::query_as::<_, CommissionRecord>(
            r#"
            SELECT * FROM commission_records
            WHERE organization_id = $1
              AND ($2::uuid IS NULL OR user_id = $2)
              AND ($3::commission_status IS NULL OR status = $3)
            ORDER BY created_at DESC
            "#,
        )
        .bind(organization_id)
        .bind(user_id)
        .bind(status)
        .fetch_all(executor)
        .await?;

        Ok(records)
    }

    pub async fn mark_commission_paid<'e, E>(
        &self,
        executor: E,
        organization_id: Uuid,
        record_id: Uuid,
    ) -> Result<Option<CommissionRecord>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let record = sqlx::query_as::<_, CommissionRecord>(
            r#"
            UPDATE commission_records
            SET status = 'PAID', paid_at = NOW()
            WHERE organization_id = $1 AND id = $2 AND status = 'PENDING'
            RETURNING *
            "#,
        )
        .bind(organization_id)
        .bind(record_id)
        .fetch_optional(executor)
        .await?;

        Ok(record)
    }
}
