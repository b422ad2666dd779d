// src/db/route_repo.rs

use chrono::NaiveDate;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::routes::{DeliveryRoute, RouteItem, RouteShift},
};

#[derive(Clone)]
pub struct RouteRepository {
    pool: PgPool,
}

impl RouteRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // "Busca ou cria" numa query só: a chave única (org, data, turno,
    // motorista) absorve chamadas concorrentes sem duplicar rota.
    pub async fn upsert_route<'e, E>(
        &self,
        executor: E,
        organization_id: Uuid,
        driver_id: Uuid,
        route_date: NaiveDate,
        shift: RouteShift,
    ) -> Result<DeliveryRoute, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let route = sqlx::query_as::<_, DeliveryRoute>(
            r#"
            INSERT INTO delivery_routes (organization_id, driver_id, route_date, shift)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (organization_id, route_date, shift, driver_id)
            DO UPDATE SET updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(organization_id)
        .bind(driver_id)
        .bind(route_date)
        .bind(shift)
        .fetch_one(executor)
        .await?;

        Ok(route)
    }

    pub async fn find_route(
        &self,
        organization_id: Uuid,
        route_id: Uuid,
    ) -> Result<Option<DeliveryRoute>, AppError> {
        let route = sqlx::query_as::<_, DeliveryRoute>(
            "SELECT * FROM delivery_routes WHERE organization_id = $1 AND id = $2",
        )
        .bind(organization_id)
        .bind(route_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(route)
    }

    pub async fn list_by_date(
        &self,
        organization_id: Uuid,
        route_date: NaiveDate,
        driver_id: Option<Uuid>,
    ) -> Result<Vec<DeliveryRoute>, AppError> {
        let routes = sqlx::query_as::<_, DeliveryRoute>(
            r#"
            SELECT * FROM delivery_routes
            WHERE organization_id = $1
              AND route_date = $2
              AND ($3::uuid IS NULL OR driver_id = $3)
            ORDER BY shift, created_at
            "#,
        )
        .bind(organization_id)
        .bind(route_date)
        .bind(driver_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(routes)
    }

    // Acrescenta no fim da rota: posição = maior posição + 1, na mesma query
    pub async fn append_item<'e, E>(
        &self,
        executor: E,
        organization_id: Uuid,
        route_id: Uuid,
        job_id: Option<Uuid>,
        pickup_description: Option<&str>,
        address: &str,
    ) -> Result<RouteItem, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let item = sqlx::query_as::<_, RouteItem>(
            r#"
            INSERT INTO route_items (
                organization_id, route_id, job_id, pickup_description, address, position
            )
            VALUES (
                $1, $2, $3, $4, $5,
                (SELECT COALESCE(MAX(position), 0) + 1 FROM route_items WHERE route_id = $2)
            )
            RETURNING *
            "#,
        )
        .bind(organization_id)
        .bind(route_id)
        .bind(job_id)
        .bind(pickup_description)
        .bind(address)
        .fetch_one(executor)
        .await?;

        Ok(item)
    }

    pub async fn list_items(
        &self,
        organization_id: Uuid,
        route_id: Uuid,
    ) -> Result<Vec<RouteItem>, AppError> {
        let items = sqlx::query_as::<_, RouteItem>(
            r#"
            SELECT * FROM route_items
            WHERE organization_id = $1 AND route_id = $2
            ORDER BY position
            "#,
        )
        .bind(organization_id)
        .bind(route_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    // Remove a parada e devolve (rota, posição) para fechar o buraco
    pub async fn delete_item<'e, E>(
        &self,
        executor: E,
        organization_id: Uuid,
        item_id: Uuid,
    ) -> Result<Option<(Uuid, i32)>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let removed = sqlx::query_as::<_, (Uuid, i32)>(
            r#"
            DELETE FROM route_items
            WHERE organization_id = $1 AND id = $2
            RETURNING route_id, position
            "#,
        )
        .bind(organization_id)
        .bind(item_id)
        .fetch_optional(executor)
        .await?;

        Ok(removed)
    }

    // Fecha o buraco deixado pela remoção: quem estava depois anda um passo.
    // A ordem relativa dos sobreviventes não muda.
    pub async fn shift_left<'e, E>(
        &self,
        executor: E,
        route_id: Uuid,
        removed_position: i32,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            "UPDATE route_items SET position = position - 1 WHERE route_id = $1 AND position > $2",
        )
        .bind(route_id)
        .bind(removed_position)
        .execute(executor)
        .await?;

        Ok(())
    }

    pub async fn set_position<'e, E>(
        &self,
        executor: E,
        organization_id: Uuid,
        item_id: Uuid,
        position: i32,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            "UPDATE route_items SET position = $3 WHERE organization_id = $1 AND id = $2",
        )
        .bind(organization_id)
        .bind(item_id)
        .bind(position)
        .execute(executor)
        .await?;

        Ok(())
    }
}
