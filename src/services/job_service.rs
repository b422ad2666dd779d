// src/services/job_service.rs

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{Acquire, Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{BillingRepository, JobRepository, UserRepository},
    models::jobs::{Job, JobDetail, JobItem, JobStatus, JobUrgency, NewJobItem},
    sync::{ChangeEvent, ChangeOp, Collection, SyncHub},
};

pub struct CreateJobInput {
    pub client_user_id: Option<Uuid>,
    pub assigned_user_id: Option<Uuid>,
    pub patient_name: Option<String>,
    pub job_type_id: Option<Uuid>,
    pub sector_id: Option<Uuid>,
    pub urgency: JobUrgency,
    pub notes: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub items: Vec<NewJobItem>,
}

pub struct UpdateJobInput {
    pub patient_name: Option<String>,
    pub job_type_id: Option<Uuid>,
    pub sector_id: Option<Uuid>,
    pub assigned_user_id: Option<Uuid>,
    pub urgency: Option<JobUrgency>,
    pub notes: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub chat_enabled: Option<bool>,
}

#[derive(Clone)]
pub struct JobService {
    repo: JobRepository,
    billing_repo: BillingRepository,
    user_repo: UserRepository,
    hub: Arc<SyncHub>,
}

impl JobService {
    pub fn new(
        repo: JobRepository,
        billing_repo: BillingRepository,
        user_repo: UserRepository,
        hub: Arc<SyncHub>,
    ) -> Self {
        Self {
            repo,
            billing_repo,
            user_repo,
            hub,
        }
    }

    // --- CRIAÇÃO ---

    /// Cria o trabalho, os itens e a primeira entrada do histórico numa
    /// transação só; o total já sai consistente com os itens.
    pub async fn create_job<'e, E>(
        &self,
        executor: E,
        organization_id: Uuid,
        actor_id: Uuid,
        input: CreateJobInput,
    ) -> Result<Job, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let job = self
            .repo
            .insert_job(
                &mut *tx,
                organization_id,
                actor_id,
                input.client_user_id,
                input.assigned_user_id,
                input.patient_name.as_deref(),
                input.job_type_id,
                input.sector_id,
                input.urgency,
                input.notes.as_deref(),
                input.due_date,
            )
            .await?;

        for item in &input.items {
            self.repo
                .insert_item(
                    &mut *tx,
                    organization_id,
                    job.id,
                    &item.description,
                    item.quantity,
                    item.unit_price,
                )
                .await?;
        }

        let total = self
            .repo
            .recalculate_total(&mut *tx, organization_id, job.id)
            .await?;

        self.repo
            .insert_history(&mut *tx, organization_id, job.id, actor_id, "created", None)
            .await?;

        tx.commit().await?;

        self.hub
            .publish(
                organization_id,
                ChangeEvent::new(Collection::Jobs, job.id, ChangeOp::Created),
            )
            .await;

        Ok(Job {
            total_value: total,
            ..job
        })
    }

    // --- LEITURA ---

    pub async fn get_detail(
        &self,
        organization_id: Uuid,
        job_id: Uuid,
    ) -> Result<JobDetail, AppError> {
        let job = self
            .repo
            .find_by_id(organization_id, job_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Trabalho".into()))?;

        let items = self.repo.list_items(organization_id, job_id).await?;
        let history = self.repo.list_history(organization_id, job_id).await?;

        Ok(JobDetail { job, items, history })
    }

    pub async fn list(
        &self,
        organization_id: Uuid,
        status: Option<JobStatus>,
        urgency: Option<JobUrgency>,
        client_user_id: Option<Uuid>,
    ) -> Result<Vec<Job>, AppError> {
        self.repo
            .list(organization_id, status, urgency, client_user_id)
            .await
    }

    // --- EDIÇÃO ---

    pub async fn update_job<'e, E>(
        &self,
        executor: E,
        organization_id: Uuid,
        actor_id: Uuid,
        job_id: Uuid,
        input: UpdateJobInput,
    ) -> Result<Job, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let job = self
            .repo
            .update_fields(
                &mut *tx,
                organization_id,
                job_id,
                input.patient_name.as_deref(),
                input.job_type_id,
                input.sector_id,
                input.assigned_user_id,
                input.urgency,
                input.notes.as_deref(),
                input.due_date,
                input.chat_enabled,
            )
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Trabalho".into()))?;

        self.repo
            .insert_history(&mut *tx, organization_id, job_id, actor_id, "updated", None)
            .await?;

        tx.commit().await?;

        self.hub
            .publish(
                organization_id,
                ChangeEvent::new(Collection::Jobs, job_id, ChangeOp::Updated),
            )
            .await;

        Ok(job)
    }

    // Inserção do item e recálculo do total são atômicos
    pub async fn add_item<'e, E>(
        &self,
        executor: E,
        organization_id: Uuid,
        actor_id: Uuid,
        job_id: Uuid,
        item: NewJobItem,
    ) -> Result<JobItem, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let created = self
            .repo
            .insert_item(
                &mut *tx,
                organization_id,
                job_id,
                &item.description,
                item.quantity,
                item.unit_price,
            )
            .await?;

        self.repo
            .recalculate_total(&mut *tx, organization_id, job_id)
            .await?;

        self.repo
            .insert_history(
                &mut *tx,
                organization_id,
                job_id,
                actor_id,
                "items_changed",
                Some(&format!("+ {}", item.description)),
            )
            .await?;

        tx.commit().await?;

        self.hub
            .publish(
                organization_id,
                ChangeEvent::new(Collection::Jobs, job_id, ChangeOp::Updated),
            )
            .await;

        Ok(created)
    }

    pub async fn update_item<'e, E>(
        &self,
        executor: E,
        organization_id: Uuid,
        actor_id: Uuid,
        item_id: Uuid,
        description: Option<&str>,
        quantity: Option<Decimal>,
        unit_price: Option<Decimal>,
    ) -> Result<JobItem, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let item = self
            .repo
            .update_item(
                &mut *tx,
                organization_id,
                item_id,
                description,
                quantity,
                unit_price,
            )
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Item".into()))?;

        self.repo
            .recalculate_total(&mut *tx, organization_id, item.job_id)
            .await?;

        self.repo
            .insert_history(
                &mut *tx,
                organization_id,
                item.job_id,
                actor_id,
                "items_changed",
                Some(&format!("~ {}", item.description)),
            )
            .await?;

        tx.commit().await?;

        self.hub
            .publish(
                organization_id,
                ChangeEvent::new(Collection::Jobs, item.job_id, ChangeOp::Updated),
            )
            .await;

        Ok(item)
    }

    pub async fn remove_item<'e, E>(
        &self,
        executor: E,
        organization_id: Uuid,
        actor_id: Uuid,
        item_id: Uuid,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let job_id = self
            .repo
            .delete_item(&mut *tx, organization_id, item_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Item".into()))?;

        self.repo
            .recalculate_total(&mut *tx, organization_id, job_id)
            .await?;

        self.repo
            .insert_history(
                &mut *tx,
                organization_id,
                job_id,
                actor_id,
                "items_changed",
                Some("- item removido"),
            )
            .await?;

        tx.commit().await?;

        self.hub
            .publish(
                organization_id,
                ChangeEvent::new(Collection::Jobs, job_id, ChangeOp::Updated),
            )
            .await;

        Ok(())
    }

    // --- TRANSIÇÃO ---

    /// Muda o status validando a matriz de transições, registra no histórico
    /// e, na conclusão, gera as comissões do responsável: tudo na mesma
    /// transação. Reabrir NÃO estorna comissões já geradas: o rastro de
    /// dinheiro só cresce.
    pub async fn transition<'e, E>(
        &self,
        executor: E,
        organization_id: Uuid,
        actor_id: Uuid,
        job_id: Uuid,
        new_status: JobStatus,
    ) -> Result<Job, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        // FOR UPDATE: duas transições concorrentes no mesmo trabalho se
        // serializam aqui em vez de aplicar "o último ganha"
        let job = sqlx::query_as::<_, Job>(
            "SELECT * FROM jobs WHERE id = $1 AND organization_id = $2 FOR UPDATE",
        )
        .bind(job_id)
        .bind(organization_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::ResourceNotFound("Trabalho".into()))?;

        if !job.status.can_transition_to(new_status) {
            return Err(AppError::InvalidTransition(format!(
                "{:?} -> {:?}",
                job.status, new_status
            )));
        }

        let updated = self
            .repo
            .update_status(&mut *tx, organization_id, job_id, new_status)
            .await?;

        let action = if job.status == JobStatus::Completed && new_status == JobStatus::InProgress {
            "reopened"
        } else {
            "status_changed"
        };

        self.repo
            .insert_history(
                &mut *tx,
                organization_id,
                job_id,
                actor_id,
                action,
                Some(&format!("{:?} -> {:?}", job.status, new_status)),
            )
            .await?;

        let mut commission_ids = Vec::new();
        if new_status == JobStatus::Completed {
            if let Some(assignee_id) = job.assigned_user_id {
                let assignee = self.user_repo.find_by_id(assignee_id).await?;
                if let Some(assignee) = assignee {
                    if assignee.commission_percent > Decimal::ZERO {
                        let items = sqlx::query_as::<_, JobItem>(
                            "SELECT * FROM job_items WHERE organization_id = $1 AND job_id = $2",
                        )
                        .bind(organization_id)
                        .bind(job_id)
                        .fetch_all(&mut *tx)
                        .await?;

                        for item in items {
                            let amount = (item.line_total() * assignee.commission_percent
                                / Decimal::ONE_HUNDRED)
                                .round_dp(2);

                            let record = self
                                .billing_repo
                                .insert_commission(
                                    &mut *tx,
                                    organization_id,
                                    assignee_id,
                                    job_id,
                                    item.id,
                                    amount,
                                )
                                .await?;
                            commission_ids.push(record.id);
                        }
                    }
                }
            }
        }

        tx.commit().await?;

        self.hub
            .publish(
                organization_id,
                ChangeEvent::new(Collection::Jobs, job_id, ChangeOp::Updated),
            )
            .await;
        for id in commission_ids {
            self.hub
                .publish(
                    organization_id,
                    ChangeEvent::new(Collection::Commissions, id, ChangeOp::Created),
                )
                .await;
        }

        Ok(updated)
    }

    pub async fn delete_job<'e, E>(
        &self,
        executor: E,
        organization_id: Uuid,
        job_id: Uuid,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = self.repo.delete(executor, organization_id, job_id).await?;
        if rows == 0 {
            return Err(AppError::ResourceNotFound("Trabalho".into()));
        }

        self.hub
            .publish(
                organization_id,
                ChangeEvent::new(Collection::Jobs, job_id, ChangeOp::Deleted),
            )
            .await;

        Ok(())
    }
}
