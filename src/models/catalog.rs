// src/models/catalog.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// Tipo de trabalho do catálogo do laboratório (coroa, prótese total...)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JobType {
    pub id: Uuid,
    pub organization_id: Uuid,
    #[schema(example = "Coroa de zircônia")]
    pub name: String,
    #[schema(example = "250.00")]
    pub default_price: Decimal,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

// Setor de produção (gesso, cerâmica, acabamento...)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Sector {
    pub id: Uuid,
    pub organization_id: Uuid,
    #[schema(example = "Cerâmica")]
    pub name: String,
    pub position: i32,
    pub created_at: DateTime<Utc>,
}
