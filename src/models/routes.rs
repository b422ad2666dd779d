// src/models/routes.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "route_shift", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RouteShift {
    Morning,
    Afternoon,
}

// A rota agrupa as paradas de um motorista num turno/data.
// A chave (organização, data, turno, motorista) é única no banco.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryRoute {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub driver_id: Uuid,
    pub route_date: NaiveDate,
    pub shift: RouteShift,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Uma parada: entrega de um trabalho OU coleta avulsa.
// `position` é sequência densa dentro da rota (1, 2, 3...).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RouteItem {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub route_id: Uuid,
    pub job_id: Option<Uuid>,
    #[schema(example = "Coleta de moldeira na Clínica Azul")]
    pub pickup_description: Option<String>,
    #[schema(example = "Rua das Flores, 123 - Centro")]
    pub address: String,
    #[schema(example = 1)]
    pub position: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RouteDetail {
    #[serde(flatten)]
    pub route: DeliveryRoute,
    pub items: Vec<RouteItem>,
}
