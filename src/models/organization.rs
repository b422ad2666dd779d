// src/models/organization.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Enums ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "organization_kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrganizationKind {
    Lab,
    Clinic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "organization_status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrganizationStatus {
    Trial,
    Pending,
    Active,
}

// --- Structs ---

// A conta principal (o "tenant"): laboratório ou clínica
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    pub id: Uuid,

    #[schema(example = "Laboratório Sorriso")]
    pub name: String,

    pub kind: OrganizationKind,
    pub status: OrganizationStatus,

    // Exatamente um dono; preenchido na mesma transação do registro
    pub owner_user_id: Option<Uuid>,

    // Sem plano => valem os limites do plano padrão (EffectivePlan::fallback)
    pub plan_id: Option<Uuid>,

    // Configurações financeiras
    #[schema(example = 5)]
    pub billing_day: i32,
    pub payment_terms: Option<String>,
    pub boleto_instructions: Option<String>,
    pub logo_url: Option<String>,

    #[serde(skip_serializing)]
    pub gateway_customer_id: Option<String>,
    #[serde(skip_serializing)]
    pub gateway_subscription_id: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Plano de assinatura (coleção global da plataforma)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    pub id: Uuid,
    #[schema(example = "Profissional")]
    pub name: String,
    #[schema(example = "199.90")]
    pub monthly_price: Decimal,
    #[schema(example = 15)]
    pub max_users: i32,
    pub created_at: DateTime<Utc>,
}

// O plano "em vigor" de uma organização: o plano contratado ou o padrão.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EffectivePlan {
    pub name: String,
    pub monthly_price: Decimal,
    pub max_users: i32,
}

impl EffectivePlan {
    // Limites aplicados a quem nunca assinou (conta em trial)
    pub fn fallback() -> Self {
        Self {
            name: "Essencial".to_string(),
            monthly_price: Decimal::new(9990, 2),
            max_users: 5,
        }
    }

    pub fn from_plan(plan: &Plan) -> Self {
        Self {
            name: plan.name.clone(),
            monthly_price: plan.monthly_price,
            max_users: plan.max_users,
        }
    }
}

// Entrada do diretório global de laboratórios
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryEntry {
    pub id: Uuid,
    pub name: String,
    pub kind: OrganizationKind,
}
