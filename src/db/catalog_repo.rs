// src/db/catalog_repo.rs

use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::catalog::{JobType, Sector},
};

#[derive(Clone)]
pub struct CatalogRepository {
    pool: PgPool,
}

impl CatalogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // --- Tipos de trabalho ---

    pub async fn create_job_type(
        &self,
        organization_id: Uuid,
        name: &str,
        default_price: Decimal,
    ) -> Result<JobType, AppError> {
        sqlx::query_as::<_, JobType>(
            r#"
            INSERT INTO job_types (organization_id, name, default_price)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(organization_id)
        .bind(name)
        .bind(default_price)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    return AppError::UniqueConstraintViolation(
                        "Já existe um tipo de trabalho com esse nome.".into(),
                    );
                }
            }
            e.into()
        })
    }

    pub async fn list_job_types(&self, organization_id: Uuid) -> Result<Vec<JobType>, AppError> {
        let types = sqlx::query_as::<_, JobType>(
            "SELECT * FROM job_types WHERE organization_id = $1 ORDER BY name",
        )
        .bind(organization_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(types)
    }

    pub async fn update_job_type(
        &self,
        organization_id: Uuid,
        job_type_id: Uuid,
        name: Option<&str>,
        default_price: Option<Decimal>,
        is_active: Option<bool>,
    ) -> Result<Option<JobType>, AppError> {
        let job_type = sqlx::query_as::<_, JobType>(
            r#"
            UPDATE job_types
            SET name          = COALESCE($3, name),
                default_price = COALESCE($4, default_price),
                is_active     = COALESCE($5, is_active)
            WHERE organization_id = $1 AND id = $2
            RETURNING *
            "#,
        )
        .bind(organization_id)
        .bind(job_type_id)
        .bind(name)
        .bind(default_price)
        .bind(is_active)
        .fetch_optional(&self.pool)
        .await?;

        Ok(job_type)
    }

    // --- Setores ---

    pub async fn create_sector(
        &self,
        organization_id: Uuid,
        name: &str,
        position: i32,
    ) -> Result<Sector, AppError> {
        sqlx::query_as::<_, Sector>(
            r#"
            INSERT INTO sectors (organization_id, name, position)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(organization_id)
        .bind(name)
        .bind(position)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    return AppError::UniqueConstraintViolation(
                        "Já existe um setor com esse nome.".into(),
                    );
                }
            }
            e.into()
        })
    }

    pub async fn list_sectors(&self, organization_id: Uuid) -> Result<Vec<Sector>, AppError> {
        let sectors = sqlx::query_as::<_, Sector>(
            "SELECT * FROM sectors WHERE organization_id = $1 ORDER BY position, name",
        )
        .bind(organization_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(sectors)
    }
}
