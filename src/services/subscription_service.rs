// src/services/subscription_service.rs

use std::sync::Arc;

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{CouponRepository, OrganizationRepository},
    models::auth::User,
    models::organization::Organization,
    services::payment::PaymentGateway,
    sync::{ChangeEvent, ChangeOp, Collection, SyncHub},
};

#[derive(Clone)]
pub struct SubscriptionService {
    org_repo: OrganizationRepository,
    coupon_repo: CouponRepository,
    gateway: Arc<dyn PaymentGateway>,
    hub: Arc<SyncHub>,
    pool: PgPool,
}

impl SubscriptionService {
    pub fn new(
        org_repo: OrganizationRepository,
        coupon_repo: CouponRepository,
        gateway: Arc<dyn PaymentGateway>,
        hub: Arc<SyncHub>,
        pool: PgPool,
    ) -> Self {
        Self {
            org_repo,
            coupon_repo,
            gateway,
            hub,
            pool,
        }
    }

    /// Contrata um plano. A organização fica PENDING até o webhook do
    /// gateway confirmar o primeiro pagamento; falha do gateway sobe como
    /// erro e nada é gravado.
    pub async fn subscribe(
        &self,
        organization_id: Uuid,
        caller: &User,
        plan_id: Uuid,
        coupon_code: Option<&str>,
    ) -> Result<Organization, AppError> {
        let org = self
            .org_repo
            .find_by_id(organization_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Organização".into()))?;

        let plan = self
            .org_repo
            .find_plan(plan_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Plano".into()))?;

        // Valida o cupom antes de falar com o gateway
        let mut price = plan.monthly_price;
        if let Some(code) = coupon_code {
            let coupon = self
                .coupon_repo
                .find_by_code(code)
                .await?
                .ok_or_else(|| AppError::ResourceNotFound("Cupom".into()))?;

            coupon
                .check_valid(Utc::now())
                .map_err(AppError::CouponRejected)?;

            price = coupon.apply(price);
        }

        // Reaproveita o cliente do gateway quando a conta já assinou antes
        let customer_id = match &org.gateway_customer_id {
            Some(id) => id.clone(),
            None => {
                self.gateway
                    .create_customer(&org.name, &caller.email)
                    .await?
                    .id
            }
        };

        let subscription = self
            .gateway
            .create_subscription(&customer_id, &plan.name, price)
            .await?;

        // Consome o uso do cupom só depois do gateway aceitar. Se outro
        // assinante levou o último uso nesse meio-tempo, o desconto já foi
        // dado; registramos e seguimos.
        if let Some(code) = coupon_code {
            if self.coupon_repo.redeem(code).await?.is_none() {
                tracing::warn!("cupom {} esgotou durante a assinatura", code);
            }
        }

        let updated = self
            .org_repo
            .apply_subscription(
                &self.pool,
                organization_id,
                plan.id,
                &customer_id,
                &subscription.id,
            )
            .await?;

        tracing::info!(
            "Organização {} assinou o plano '{}' (aguardando confirmação)",
            organization_id,
            plan.name
        );

        self.hub
            .publish(
                organization_id,
                ChangeEvent::new(Collection::Organizations, organization_id, ChangeOp::Updated),
            )
            .await;

        Ok(updated)
    }
}
