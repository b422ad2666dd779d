// src/models/alerts.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// Aviso interno da organização. O "aviso ativo" de um usuário é o mais
// antigo já agendado que ele ainda não marcou como ciente.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub id: Uuid,
    pub organization_id: Uuid,
    #[schema(example = "Reunião geral às 14h")]
    pub message: String,
    pub scheduled_at: DateTime<Utc>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}
