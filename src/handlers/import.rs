// src/handlers/import.rs

use std::collections::HashMap;

use axum::{Json, extract::State, response::IntoResponse};
use serde::Deserialize;

use crate::{
    common::{
        db_utils::get_scoped_connection,
        error::{ApiError, AppError},
    },
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        i18n::Locale,
        rbac::{CapJobsWrite, RequireCapability},
        tenancy::OrgContext,
    },
    services::import_service::{self, ImportField},
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestMappingPayload {
    pub headers: Vec<String>,
}

// POST /api/import/mapping: sugere campo -> coluna pelos cabeçalhos
pub async fn suggest_mapping(
    Json(payload): Json<SuggestMappingPayload>,
) -> impl IntoResponse {
    Json(import_service::suggest_mapping(&payload.headers))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportJobsPayload {
    pub mapping: HashMap<ImportField, usize>,
    pub rows: Vec<Vec<String>>,
}

// POST /api/import/jobs: um trabalho por linha; linha ruim vira falha no
// relatório, não aborta a importação
pub async fn import_jobs(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    org: OrgContext,
    _cap: RequireCapability<CapJobsWrite>,
    Json(payload): Json<ImportJobsPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_scoped_connection(&app_state, &org, &user)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    let report = app_state
        .import_service
        .import_jobs(&mut conn, org.0, user.0.id, &payload.mapping, &payload.rows)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale))?;

    Ok(Json(report))
}
