// src/db/organization_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::organization::{DirectoryEntry, Organization, OrganizationKind, OrganizationStatus, Plan},
};

#[derive(Clone)]
pub struct OrganizationRepository {
    pool: PgPool,
}

impl OrganizationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  ORGANIZAÇÕES
    // =========================================================================

    pub async fn create<'e, E>(
        &self,
        executor: E,
        name: &str,
        kind: OrganizationKind,
    ) -> Result<Organization, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let org = sqlx::query_as::<_, Organization>(
            "INSERT INTO organizations (name, kind) VALUES ($1, $2) RETURNING *",
        )
        .bind(name)
        .bind(kind)
        .fetch_one(executor)
        .await?;

        Ok(org)
    }

    // O dono é gravado na mesma transação do registro: exatamente um por conta
    pub async fn set_owner<'e, E>(
        &self,
        executor: E,
        organization_id: Uuid,
        owner_user_id: Uuid,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("UPDATE organizations SET owner_user_id = $2, updated_at = NOW() WHERE id = $1")
            .bind(organization_id)
            .bind(owner_user_id)
            .execute(executor)
            .await?;

        Ok(())
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Organization>, AppError> {
        let org = sqlx::query_as::<_, Organization>("SELECT * FROM organizations WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(org)
    }

    pub async fn update_settings(
        &self,
        organization_id: Uuid,
        billing_day: Option<i32>,
        payment_terms: Option<&str>,
        boleto_instructions: Option<&str>,
        logo_url: Option<&str>,
    ) -> Result<Option<Organization>, AppError> {
        let org = sqlx::query_as::<_, Organization>(
            r#"
            UPDATE organizations
            SET billing_day         = COALESCE($2, billing_day),
                payment_terms       = COALESCE($3, payment_terms),
                boleto_instructions = COALESCE($4, boleto_instructions),
                logo_url            = COALESCE($5, logo_url),
                updated_at          = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(organization_id)
        .bind(billing_day)
        .bind(payment_terms)
        .bind(boleto_instructions)
        .bind(logo_url)
        .fetch_optional(&self.pool)
        .await?;

        Ok(org)
    }

    // Diretório global: laboratórios visíveis para clínicas se conectarem
    pub async fn list_directory(&self) -> Result<Vec<DirectoryEntry>, AppError> {
        let entries = sqlx::query_as::<_, DirectoryEntry>(
            r#"
            SELECT id, name, kind FROM organizations
            WHERE kind = 'LAB' AND status <> 'PENDING'
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    // =========================================================================
    //  ASSINATURA
    // =========================================================================

    pub async fn apply_subscription<'e, E>(
        &self,
        executor: E,
        organization_id: Uuid,
        plan_id: Uuid,
        gateway_customer_id: &str,
        gateway_subscription_id: &str,
    ) -> Result<Organization, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        // Fica PENDING até o webhook do gateway confirmar o pagamento
        let org = sqlx::query_as::<_, Organization>(
            r#"
            UPDATE organizations
            SET plan_id = $2,
                gateway_customer_id = $3,
                gateway_subscription_id = $4,
                status = 'PENDING',
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(organization_id)
        .bind(plan_id)
        .bind(gateway_customer_id)
        .bind(gateway_subscription_id)
        .fetch_one(executor)
        .await?;

        Ok(org)
    }

    pub async fn set_status(
        &self,
        organization_id: Uuid,
        status: OrganizationStatus,
    ) -> Result<Option<Organization>, AppError> {
        let org = sqlx::query_as::<_, Organization>(
            "UPDATE organizations SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(organization_id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await?;

        Ok(org)
    }

    pub async fn find_by_gateway_subscription(
        &self,
        gateway_subscription_id: &str,
    ) -> Result<Option<Organization>, AppError> {
        let org = sqlx::query_as::<_, Organization>(
            "SELECT * FROM organizations WHERE gateway_subscription_id = $1",
        )
        .bind(gateway_subscription_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(org)
    }

    // =========================================================================
    //  PLANOS (coleção global)
    // =========================================================================

    pub async fn create_plan(
        &self,
        name: &str,
        monthly_price: rust_decimal::Decimal,
        max_users: i32,
    ) -> Result<Plan, AppError> {
        let plan = sqlx::query_as::<_, Plan>(
            "INSERT INTO plans (name, monthly_price, max_users) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(name)
        .bind(monthly_price)
        .bind(max_users)
        .fetch_one(&self.pool)
        .await?;

        Ok(plan)
    }

    pub async fn list_plans(&self) -> Result<Vec<Plan>, AppError> {
        let plans =
            sqlx::query_as::<_, Plan>("SELECT * FROM plans ORDER BY monthly_price")
                .fetch_all(&self.pool)
                .await?;

        Ok(plans)
    }

    pub async fn find_plan(&self, id: Uuid) -> Result<Option<Plan>, AppError> {
        let plan = sqlx::query_as::<_, Plan>("SELECT * FROM plans WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(plan)
    }
}
