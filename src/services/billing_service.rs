// src/services/billing_service.rs

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{Acquire, Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{BillingRepository, JobRepository, OrganizationRepository, UserRepository},
    models::billing::{BatchStatus, BillingBatch},
    models::jobs::Job,
    models::organization::OrganizationStatus,
    services::payment::PaymentGateway,
    sync::{ChangeEvent, ChangeOp, Collection, SyncHub},
};

/// Soma dos totais dos trabalhos que entram no lote.
pub fn batch_total(jobs: &[Job]) -> Decimal {
    jobs.iter().map(|job| job.total_value).sum()
}

#[derive(Clone)]
pub struct BillingService {
    repo: BillingRepository,
    job_repo: JobRepository,
    org_repo: OrganizationRepository,
    user_repo: UserRepository,
    gateway: Arc<dyn PaymentGateway>,
    hub: Arc<SyncHub>,
    pool: PgPool,
}

impl BillingService {
    pub fn new(
        repo: BillingRepository,
        job_repo: JobRepository,
        org_repo: OrganizationRepository,
        user_repo: UserRepository,
        gateway: Arc<dyn PaymentGateway>,
        hub: Arc<SyncHub>,
        pool: PgPool,
    ) -> Self {
        Self {
            repo,
            job_repo,
            org_repo,
            user_repo,
            gateway,
            hub,
            pool,
        }
    }

    /// Agrupa os trabalhos concluídos e ainda não faturados do cliente no
    /// período. Criar o lote e carimbar os trabalhos é atômico: um trabalho
    /// nunca aparece em dois lotes.
    pub async fn create_batch<'e, E>(
        &self,
        executor: E,
        organization_id: Uuid,
        client_user_id: Uuid,
        period_start: NaiveDate,
        period_end: NaiveDate,
    ) -> Result<BillingBatch, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let client = self
            .user_repo
            .find_by_id(client_user_id)
            .await?
            .ok_or(AppError::UserNotFound)?;
        if client.organization_id != organization_id {
            return Err(AppError::UserNotFound);
        }

        let mut tx = executor.begin().await?;

        let jobs = self
            .job_repo
            .list_completed_unbilled(
                &mut *tx,
                organization_id,
                client_user_id,
                period_start,
                period_end,
            )
            .await?;

        if jobs.is_empty() {
            return Err(AppError::BadRequest(
                "Nenhum trabalho concluído para faturar no período.".into(),
            ));
        }

        let total = batch_total(&jobs);

        let batch = self
            .repo
            .insert_batch(
                &mut *tx,
                organization_id,
                client_user_id,
                period_start,
                period_end,
                total,
            )
            .await?;

        let job_ids: Vec<Uuid> = jobs.iter().map(|job| job.id).collect();
        self.job_repo
            .assign_batch(&mut *tx, organization_id, batch.id, &job_ids)
            .await?;

        tx.commit().await?;

        self.hub
            .publish(
                organization_id,
                ChangeEvent::new(Collection::BillingBatches, batch.id, ChangeOp::Created),
            )
            .await;
        for job_id in job_ids {
            self.hub
                .publish(
                    organization_id,
                    ChangeEvent::new(Collection::Jobs, job_id, ChangeOp::Updated),
                )
                .await;
        }

        Ok(batch)
    }

    pub async fn list_batches(
        &self,
        organization_id: Uuid,
    ) -> Result<Vec<BillingBatch>, AppError> {
        self.repo.list_batches(organization_id).await
    }

    /// Emite o boleto do lote no gateway. Se o gateway falhar, o erro sobe
    /// e o lote permanece OPEN: cobrança "de mentira" não existe.
    pub async fn charge_batch(
        &self,
        organization_id: Uuid,
        batch_id: Uuid,
    ) -> Result<BillingBatch, AppError> {
        let batch = self
            .repo
            .find_batch(&self.pool, organization_id, batch_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Lote de faturamento".into()))?;

        if batch.status != BatchStatus::Open && batch.status != BatchStatus::Failed {
            return Err(AppError::InvalidTransition(format!(
                "{:?} -> Charged",
                batch.status
            )));
        }

        let org = self
            .org_repo
            .find_by_id(organization_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Organização".into()))?;

        let client = self
            .user_repo
            .find_by_id(batch.client_user_id)
            .await?
            .ok_or(AppError::UserNotFound)?;

        let description = format!(
            "Faturamento {}: {} a {}",
            org.name, batch.period_start, batch.period_end
        );

        let charge = self
            .gateway
            .create_boleto(
                &client.full_name,
                &client.email,
                batch.total,
                &description,
                org.boleto_instructions.as_deref(),
            )
            .await?;

        let updated = self
            .repo
            .mark_charged(
                &self.pool,
                organization_id,
                batch_id,
                &charge.boleto_url,
                &charge.id,
            )
            .await?;

        self.hub
            .publish(
                organization_id,
                ChangeEvent::new(Collection::BillingBatches, batch_id, ChangeOp::Updated),
            )
            .await;

        Ok(updated)
    }

    /// Callback do gateway. Eventos desconhecidos são ignorados (o gateway
    /// reenvia o que não confirmarmos, então respondemos 200 sempre).
    pub async fn handle_webhook(
        &self,
        event_type: &str,
        charge_id: Option<&str>,
        subscription_id: Option<&str>,
    ) -> Result<(), AppError> {
        match event_type {
            "charge.paid" | "charge.failed" => {
                let Some(charge_id) = charge_id else {
                    tracing::warn!("webhook {} sem chargeId", event_type);
                    return Ok(());
                };

                let status = if event_type == "charge.paid" {
                    BatchStatus::Paid
                } else {
                    BatchStatus::Failed
                };

                match self.repo.set_status_by_charge(charge_id, status).await? {
                    Some(batch) => {
                        self.hub
                            .publish(
                                batch.organization_id,
                                ChangeEvent::new(
                                    Collection::BillingBatches,
                                    batch.id,
                                    ChangeOp::Updated,
                                ),
                            )
                            .await;
                    }
                    None => tracing::warn!("webhook para cobrança desconhecida {}", charge_id),
                }
            }
            "subscription.paid" => {
                let Some(subscription_id) = subscription_id else {
                    tracing::warn!("webhook subscription.paid sem subscriptionId");
                    return Ok(());
                };

                match self
                    .org_repo
                    .find_by_gateway_subscription(subscription_id)
                    .await?
                {
                    Some(org) => {
                        self.org_repo
                            .set_status(org.id, OrganizationStatus::Active)
                            .await?;
                        tracing::info!("Organização {} ativada via webhook", org.id);
                        self.hub
                            .publish(
                                org.id,
                                ChangeEvent::new(
                                    Collection::Organizations,
                                    org.id,
                                    ChangeOp::Updated,
                                ),
                            )
                            .await;
                    }
                    None => {
                        tracing::warn!("webhook para assinatura desconhecida {}", subscription_id)
                    }
                }
            }
            "subscription.failed" => {
                // A conta continua PENDING: ativação sem pagamento não existe
                tracing::warn!(
                    "Pagamento de assinatura falhou (subscriptionId {:?})",
                    subscription_id
                );
            }
            other => tracing::warn!("evento de webhook desconhecido: {}", other),
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::jobs::{JobStatus, JobUrgency};
    use chrono::Utc;

    fn job_with_total(total: Decimal) -> Job {
        Job {
            id: Uuid::new_v4(),
            organization_id: Uuid::new_v4(),
            client_user_id: None,
            assigned_user_id: None,
            patient_name: None,
            job_type_id: None,
            sector_id: None,
            status: JobStatus::Completed,
            urgency: JobUrgency::Normal,
            total_value: total,
            notes: None,
            chat_enabled: true,
            billing_batch_id: None,
            due_date: None,
            created_by: Uuid::new_v4(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn batch_total_sums_job_totals() {
        let jobs = vec![
            job_with_total(Decimal::new(13000, 2)),
            job_with_total(Decimal::new(25050, 2)),
        ];
        assert_eq!(batch_total(&jobs), Decimal::new(38050, 2));
    }

    #[test]
    fn batch_total_of_nothing_is_zero() {
        assert_eq!(batch_total(&[]), Decimal::ZERO);
    }
}
