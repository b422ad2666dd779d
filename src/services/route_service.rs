// src/services/route_service.rs

use std::sync::Arc;

use chrono::NaiveDate;
use sqlx::{Acquire, Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{JobRepository, RouteRepository},
    models::routes::{DeliveryRoute, RouteDetail, RouteItem, RouteShift},
    sync::{ChangeEvent, ChangeOp, Collection, SyncHub},
};

#[derive(Clone)]
pub struct RouteService {
    repo: RouteRepository,
    job_repo: JobRepository,
    hub: Arc<SyncHub>,
}

impl RouteService {
    pub fn new(repo: RouteRepository, job_repo: JobRepository, hub: Arc<SyncHub>) -> Self {
        Self { repo, job_repo, hub }
    }

    /// Coloca um trabalho na rota do motorista. A rota do dia/turno é criada
    /// se não existir: o upsert com chave única absorve a corrida de dois
    /// usuários montando a mesma rota.
    pub async fn add_job_stop<'e, E>(
        &self,
        executor: E,
        organization_id: Uuid,
        driver_id: Uuid,
        route_date: NaiveDate,
        shift: RouteShift,
        job_id: Uuid,
        address: Option<String>,
    ) -> Result<RouteItem, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let job = self
            .job_repo
            .find_by_id(organization_id, job_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Trabalho".into()))?;

        // Resolução de endereço de melhor esforço: sem endereço explícito,
        // a parada sai identificada pelo paciente para o motorista confirmar.
        let address = address.unwrap_or_else(|| match &job.patient_name {
            Some(patient) => format!("Entrega: {}", patient),
            None => "Endereço a confirmar".to_string(),
        });

        let mut tx = executor.begin().await?;

        let route = self
            .repo
            .upsert_route(&mut *tx, organization_id, driver_id, route_date, shift)
            .await?;

        let item = self
            .repo
            .append_item(
                &mut *tx,
                organization_id,
                route.id,
                Some(job_id),
                None,
                &address,
            )
            .await?;

        tx.commit().await?;

        self.hub
            .publish(
                organization_id,
                ChangeEvent::new(Collection::Routes, route.id, ChangeOp::Updated),
            )
            .await;

        Ok(item)
    }

    /// Coleta avulsa (sem trabalho vinculado)
    pub async fn add_pickup_stop<'e, E>(
        &self,
        executor: E,
        organization_id: Uuid,
        driver_id: Uuid,
        route_date: NaiveDate,
        shift: RouteShift,
        description: &str,
        address: &str,
    ) -> Result<RouteItem, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let route = self
            .repo
            .upsert_route(&mut *tx, organization_id, driver_id, route_date, shift)
            .await?;

        let item = self
            .repo
            .append_item(
                &mut *tx,
                organization_id,
                route.id,
                None,
                Some(description),
                address,
            )
            .await?;

        tx.commit().await?;

        self.hub
            .publish(
                organization_id,
                ChangeEvent::new(Collection::Routes, route.id, ChangeOp::Updated),
            )
            .await;

        Ok(item)
    }

    /// Remove a parada e fecha o buraco na sequência, na mesma transação.
    /// Quem sobra mantém a ordem relativa.
    pub async fn remove_stop<'e, E>(
        &self,
        executor: E,
        organization_id: Uuid,
        item_id: Uuid,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let (route_id, position) = self
            .repo
            .delete_item(&mut *tx, organization_id, item_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Parada".into()))?;

        self.repo.shift_left(&mut *tx, route_id, position).await?;

        tx.commit().await?;

        self.hub
            .publish(
                organization_id,
                ChangeEvent::new(Collection::Routes, route_id, ChangeOp::Updated),
            )
            .await;

        Ok(())
    }

    /// Reordenação manual: recebe a lista completa de paradas na nova ordem.
    pub async fn reorder<'e, E>(
        &self,
        executor: E,
        organization_id: Uuid,
        route_id: Uuid,
        ordered_item_ids: &[Uuid],
    ) -> Result<Vec<RouteItem>, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let current = self.repo.list_items(organization_id, route_id).await?;

        if current.len() != ordered_item_ids.len()
            || !current
                .iter()
                .all(|item| ordered_item_ids.contains(&item.id))
        {
            return Err(AppError::BadRequest(
                "A reordenação precisa conter exatamente as paradas da rota.".into(),
            ));
        }

        let mut tx = executor.begin().await?;

        for (index, item_id) in ordered_item_ids.iter().enumerate() {
            self.repo
                .set_position(&mut *tx, organization_id, *item_id, (index + 1) as i32)
                .await?;
        }

        tx.commit().await?;

        self.hub
            .publish(
                organization_id,
                ChangeEvent::new(Collection::Routes, route_id, ChangeOp::Updated),
            )
            .await;

        self.repo.list_items(organization_id, route_id).await
    }

    pub async fn get_detail(
        &self,
        organization_id: Uuid,
        route_id: Uuid,
    ) -> Result<RouteDetail, AppError> {
        let route = self
            .repo
            .find_route(organization_id, route_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Rota".into()))?;

        let items = self.repo.list_items(organization_id, route_id).await?;

        Ok(RouteDetail { route, items })
    }

    pub async fn list(
        &self,
        organization_id: Uuid,
        route_date: NaiveDate,
        driver_id: Option<Uuid>,
    ) -> Result<Vec<DeliveryRoute>, AppError> {
        self.repo
            .list_by_date(organization_id, route_date, driver_id)
            .await
    }
}
