// src/models/jobs.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Enums ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "job_status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    Received,
    InProgress,
    Completed,
    Delivered,
    Cancelled,
}

impl JobStatus {
    /// Matriz de transições do fluxo de produção. Reabrir um trabalho
    /// concluído volta para InProgress; entregue é terminal.
    pub fn can_transition_to(self, next: JobStatus) -> bool {
        use JobStatus::*;
        matches!(
            (self, next),
            (Received, InProgress)
                | (Received, Completed)
                | (Received, Cancelled)
                | (InProgress, Completed)
                | (InProgress, Cancelled)
                | (Completed, Delivered)
                | (Completed, InProgress)
                | (Cancelled, InProgress)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "job_urgency", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobUrgency {
    Normal,
    Urgent,
}

// --- Structs ---

// O trabalho (ordem de serviço do laboratório)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: Uuid,
    pub organization_id: Uuid,

    // O dentista/clínica solicitante (usuário com papel Client)
    pub client_user_id: Option<Uuid>,
    // O colaborador responsável: é dele a comissão na conclusão
    pub assigned_user_id: Option<Uuid>,
    #[schema(example = "Maria da Silva")]
    pub patient_name: Option<String>,

    pub job_type_id: Option<Uuid>,
    pub sector_id: Option<Uuid>,

    pub status: JobStatus,
    pub urgency: JobUrgency,

    // Invariante: sempre igual à soma de quantity * unit_price dos itens
    #[schema(example = "130.00")]
    pub total_value: Decimal,

    pub notes: Option<String>,
    pub chat_enabled: bool,
    pub billing_batch_id: Option<Uuid>,
    pub due_date: Option<NaiveDate>,

    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JobItem {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub job_id: Uuid,

    #[schema(example = "Coroa de porcelana")]
    pub description: String,
    #[schema(example = "2.0")]
    pub quantity: Decimal,
    #[schema(example = "50.00")]
    pub unit_price: Decimal,

    pub created_at: DateTime<Utc>,
}

impl JobItem {
    pub fn line_total(&self) -> Decimal {
        self.quantity * self.unit_price
    }
}

/// Soma dos totais de linha: a fonte da verdade para `Job::total_value`.
pub fn compute_total(items: &[JobItem]) -> Decimal {
    items.iter().map(JobItem::line_total).sum()
}

// Item recém-chegado (criação de trabalho / importação de planilha)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewJobItem {
    #[schema(example = "Coroa de porcelana")]
    pub description: String,
    #[schema(example = "2.0")]
    pub quantity: Decimal,
    #[schema(example = "50.00")]
    pub unit_price: Decimal,
}

// Histórico: somente acrescenta, nunca edita
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JobHistoryEntry {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub job_id: Uuid,
    pub user_id: Uuid,
    #[schema(example = "status_changed")]
    pub action: String,
    pub detail: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JobDetail {
    #[serde(flatten)]
    pub job: Job,
    pub items: Vec<JobItem>,
    pub history: Vec<JobHistoryEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(quantity: i64, unit_price: Decimal) -> JobItem {
        JobItem {
            id: Uuid::new_v4(),
            organization_id: Uuid::new_v4(),
            job_id: Uuid::new_v4(),
            description: "item".to_string(),
            quantity: Decimal::from(quantity),
            unit_price,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn total_is_sum_of_line_totals() {
        // 2 x R$50 + 1 x R$30 => R$130,00
        let items = vec![
            item(2, Decimal::new(5000, 2)),
            item(1, Decimal::new(3000, 2)),
        ];
        assert_eq!(compute_total(&items), Decimal::new(13000, 2));
    }

    #[test]
    fn total_of_no_items_is_zero() {
        assert_eq!(compute_total(&[]), Decimal::ZERO);
    }

    #[test]
    fn fractional_quantities_are_allowed() {
        let items = vec![item(3, Decimal::new(3333, 2))];
        assert_eq!(compute_total(&items), Decimal::new(9999, 2));
    }

    #[test]
    fn reopening_a_completed_job_is_a_valid_transition() {
        assert!(JobStatus::Completed.can_transition_to(JobStatus::InProgress));
    }

    #[test]
    fn delivered_is_terminal() {
        use JobStatus::*;
        for next in [Received, InProgress, Completed, Cancelled] {
            assert!(!Delivered.can_transition_to(next));
        }
    }

    #[test]
    fn cannot_deliver_without_completing() {
        assert!(!JobStatus::InProgress.can_transition_to(JobStatus::Delivered));
        assert!(!JobStatus::Received.can_transition_to(JobStatus::Delivered));
    }
}
