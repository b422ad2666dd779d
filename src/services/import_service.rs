// src/services/import_service.rs
//
// Importador de planilhas: o laboratório cola as linhas da planilha dele e
// o mapeamento de colunas é sugerido por casamento de texto normalizado
// (sem acento, sem pontuação) contra uma tabela de sinônimos pt/en.

use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{CatalogRepository, UserRepository},
    models::jobs::{JobUrgency, NewJobItem},
    services::job_service::{CreateJobInput, JobService},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum ImportField {
    PatientName,
    ClientEmail,
    JobType,
    Quantity,
    UnitPrice,
    DueDate,
    Notes,
}

// A ordem importa: campos anteriores reivindicam a coluna primeiro
const SYNONYMS: &[(ImportField, &[&str])] = &[
    (
        ImportField::PatientName,
        &["paciente", "nomedopaciente", "patient", "patientname"],
    ),
    (
        ImportField::ClientEmail,
        &["cliente", "dentista", "emaildocliente", "clientemail", "email"],
    ),
    (
        ImportField::JobType,
        &["servico", "tipo", "tipodetrabalho", "trabalho", "jobtype", "service"],
    ),
    (
        ImportField::Quantity,
        &["quantidade", "qtd", "qty", "quantity"],
    ),
    (
        ImportField::UnitPrice,
        &["valor", "preco", "precounitario", "valorunitario", "price", "unitprice"],
    ),
    (
        ImportField::DueDate,
        &["entrega", "dataentrega", "prazo", "duedate"],
    ),
    (
        ImportField::Notes,
        &["observacao", "observacoes", "obs", "notes", "notas"],
    ),
];

/// "Preço Unitário" -> "precounitario"
pub fn normalize_header(header: &str) -> String {
    header
        .to_lowercase()
        .chars()
        .filter_map(|c| match c {
            'á' | 'à' | 'â' | 'ã' => Some('a'),
            'é' | 'ê' => Some('e'),
            'í' => Some('i'),
            'ó' | 'ô' | 'õ' => Some('o'),
            'ú' | 'ü' => Some('u'),
            'ç' => Some('c'),
            c if c.is_ascii_alphanumeric() => Some(c),
            _ => None,
        })
        .collect()
}

/// Sugere campo -> índice de coluna. Casamento exato ganha; depois vale
/// "contém". Cada coluna atende no máximo um campo.
pub fn suggest_mapping(headers: &[String]) -> HashMap<ImportField, usize> {
    let normalized: Vec<String> = headers.iter().map(|h| normalize_header(h)).collect();
    let mut mapping: HashMap<ImportField, usize> = HashMap::new();

    for (field, synonyms) in SYNONYMS {
        let exact = normalized
            .iter()
            .position(|header| synonyms.contains(&header.as_str()));

        let found = exact.or_else(|| {
            normalized
                .iter()
                .position(|header| synonyms.iter().any(|s| header.contains(s)))
        });

        if let Some(index) = found {
            if !mapping.values().any(|&taken| taken == index) {
                mapping.insert(*field, index);
            }
        }
    }

    mapping
}

/// Aceita "49,90", "1.234,56" e "R$ 130.00"
pub fn parse_decimal(raw: &str) -> Option<Decimal> {
    let cleaned = raw.trim().trim_start_matches("R$").trim();
    let cleaned = if cleaned.contains(',') {
        cleaned.replace('.', "").replace(',', ".")
    } else {
        cleaned.to_string()
    };
    cleaned.parse().ok()
}

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%d/%m/%Y"))
        .ok()
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImportFailure {
    pub row: usize,
    pub reason: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub created: Vec<Uuid>,
    pub failures: Vec<ImportFailure>,
}

#[derive(Clone)]
pub struct ImportService {
    job_service: JobService,
    catalog_repo: CatalogRepository,
    user_repo: UserRepository,
    pool: PgPool,
}

impl ImportService {
    pub fn new(
        job_service: JobService,
        catalog_repo: CatalogRepository,
        user_repo: UserRepository,
        pool: PgPool,
    ) -> Self {
        Self {
            job_service,
            catalog_repo,
            user_repo,
            pool,
        }
    }

    /// Cria um trabalho por linha. Linha ruim vira falha no relatório e a
    /// importação continua: ninguém quer re-colar a planilha inteira.
    pub async fn import_jobs(
        &self,
        conn: &mut PgConnection,
        organization_id: Uuid,
        actor_id: Uuid,
        mapping: &HashMap<ImportField, usize>,
        rows: &[Vec<String>],
    ) -> Result<ImportReport, AppError> {
        let job_types = self.catalog_repo.list_job_types(organization_id).await?;
        let types_by_name: HashMap<String, &crate::models::catalog::JobType> = job_types
            .iter()
            .map(|t| (normalize_header(&t.name), t))
            .collect();

        let members = self.user_repo.list_by_org(&self.pool, organization_id).await?;
        let members_by_email: HashMap<String, Uuid> = members
            .iter()
            .map(|u| (u.email.to_lowercase(), u.id))
            .collect();

        let mut created = Vec::new();
        let mut failures = Vec::new();

        for (index, row) in rows.iter().enumerate() {
            let get = |field: ImportField| {
                mapping
                    .get(&field)
                    .and_then(|column| row.get(*column))
                    .map(|value| value.trim())
                    .filter(|value| !value.is_empty())
            };

            let patient_name = get(ImportField::PatientName);
            let type_name = get(ImportField::JobType);

            if patient_name.is_none() && type_name.is_none() {
                failures.push(ImportFailure {
                    row: index,
                    reason: "Linha sem paciente nem serviço.".into(),
                });
                continue;
            }

            let job_type = match type_name {
                Some(name) => match types_by_name.get(&normalize_header(name)) {
                    Some(found) => Some(*found),
                    None => {
                        failures.push(ImportFailure {
                            row: index,
                            reason: format!("Tipo de trabalho desconhecido: {}", name),
                        });
                        continue;
                    }
                },
                None => None,
            };

            let client_user_id = match get(ImportField::ClientEmail) {
                Some(email) => match members_by_email.get(&email.to_lowercase()) {
                    Some(id) => Some(*id),
                    None => {
                        failures.push(ImportFailure {
                            row: index,
                            reason: format!("Cliente desconhecido: {}", email),
                        });
                        continue;
                    }
                },
                None => None,
            };

            let quantity = get(ImportField::Quantity)
                .and_then(parse_decimal)
                .unwrap_or(Decimal::ONE);
            let unit_price = get(ImportField::UnitPrice)
                .and_then(parse_decimal)
                .or(job_type.map(|t| t.default_price))
                .unwrap_or(Decimal::ZERO);

            let description = type_name.unwrap_or("Serviço importado").to_string();

            let input = CreateJobInput {
                client_user_id,
                assigned_user_id: None,
                patient_name: patient_name.map(str::to_string),
                job_type_id: job_type.map(|t| t.id),
                sector_id: None,
                urgency: JobUrgency::Normal,
                notes: get(ImportField::Notes).map(str::to_string),
                due_date: get(ImportField::DueDate).and_then(parse_date),
                items: vec![NewJobItem {
                    description,
                    quantity,
                    unit_price,
                }],
            };

            match self
                .job_service
                .create_job(&mut *conn, organization_id, actor_id, input)
                .await
            {
                Ok(job) => created.push(job.id),
                Err(e) => failures.push(ImportFailure {
                    row: index,
                    reason: e.to_string(),
                }),
            }
        }

        Ok(ImportReport { created, failures })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalization_strips_accents_and_punctuation() {
        assert_eq!(normalize_header("Preço Unitário"), "precounitario");
        assert_eq!(normalize_header("  Observações "), "observacoes");
        assert_eq!(normalize_header("Data de Entrega"), "datadeentrega");
    }

    #[test]
    fn maps_typical_brazilian_spreadsheet() {
        let headers: Vec<String> = ["Paciente", "Serviço", "Qtd", "Valor Unitário", "Prazo"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        let mapping = suggest_mapping(&headers);

        assert_eq!(mapping.get(&ImportField::PatientName), Some(&0));
        assert_eq!(mapping.get(&ImportField::JobType), Some(&1));
        assert_eq!(mapping.get(&ImportField::Quantity), Some(&2));
        assert_eq!(mapping.get(&ImportField::UnitPrice), Some(&3));
        assert_eq!(mapping.get(&ImportField::DueDate), Some(&4));
    }

    #[test]
    fn each_column_serves_at_most_one_field() {
        let headers: Vec<String> = ["Valor", "Valor"].iter().map(|s| s.to_string()).collect();
        let mapping = suggest_mapping(&headers);
        // As duas colunas têm o mesmo nome; só a primeira é reivindicada
        assert_eq!(mapping.get(&ImportField::UnitPrice), Some(&0));
        assert_eq!(mapping.len(), 1);
    }

    #[test]
    fn unknown_headers_map_to_nothing() {
        let headers: Vec<String> = ["Foo", "Bar"].iter().map(|s| s.to_string()).collect();
        assert!(suggest_mapping(&headers).is_empty());
    }

    #[test]
    fn parses_brazilian_money_formats() {
        assert_eq!(parse_decimal("49,90"), Some(Decimal::new(4990, 2)));
        assert_eq!(parse_decimal("R$ 1.234,56"), Some(Decimal::new(123456, 2)));
        assert_eq!(parse_decimal("130.00"), Some(Decimal::new(13000, 2)));
        assert_eq!(parse_decimal("abc"), None);
    }

    #[test]
    fn parses_both_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2025, 3, 14).unwrap();
        assert_eq!(parse_date("2025-03-14"), Some(expected));
        assert_eq!(parse_date("14/03/2025"), Some(expected));
        assert_eq!(parse_date("14-03-2025"), None);
    }
}
