// src/handlers/catalog.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{
        i18n::Locale,
        rbac::{CapCatalogManage, RequireCapability},
        tenancy::OrgContext,
    },
    sync::{ChangeEvent, ChangeOp, Collection},
};

// --- Tipos de trabalho ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateJobTypePayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    #[schema(example = "Coroa de zircônia")]
    pub name: String,

    #[schema(example = "250.00")]
    pub default_price: Option<Decimal>,
}

// POST /api/catalog/job-types
pub async fn create_job_type(
    State(app_state): State<AppState>,
    locale: Locale,
    org: OrgContext,
    _cap: RequireCapability<CapCatalogManage>,
    Json(payload): Json<CreateJobTypePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let job_type = app_state
        .catalog_repo
        .create_job_type(
            org.0,
            &payload.name,
            payload.default_price.unwrap_or(Decimal::ZERO),
        )
        .await
        .map_err(|app_err| app_err.to_api_error(&locale))?;

    app_state
        .sync_hub
        .publish(
            org.0,
            ChangeEvent::new(Collection::JobTypes, job_type.id, ChangeOp::Created),
        )
        .await;

    Ok((StatusCode::CREATED, Json(job_type)))
}

// GET /api/catalog/job-types
pub async fn list_job_types(
    State(app_state): State<AppState>,
    locale: Locale,
    org: OrgContext,
) -> Result<impl IntoResponse, ApiError> {
    let types = app_state
        .catalog_repo
        .list_job_types(org.0)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale))?;

    Ok(Json(types))
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateJobTypePayload {
    pub name: Option<String>,
    pub default_price: Option<Decimal>,
    pub is_active: Option<bool>,
}

// PUT /api/catalog/job-types/{id}
pub async fn update_job_type(
    State(app_state): State<AppState>,
    locale: Locale,
    org: OrgContext,
    _cap: RequireCapability<CapCatalogManage>,
    Path(job_type_id): Path<Uuid>,
    Json(payload): Json<UpdateJobTypePayload>,
) -> Result<impl IntoResponse, ApiError> {
    let job_type = app_state
        .catalog_repo
        .update_job_type(
            org.0,
            job_type_id,
            payload.name.as_deref(),
            payload.default_price,
            payload.is_active,
        )
        .await
        .map_err(|app_err| app_err.to_api_error(&locale))?
        .ok_or_else(|| {
            AppError::ResourceNotFound("Tipo de trabalho".into()).to_api_error(&locale)
        })?;

    app_state
        .sync_hub
        .publish(
            org.0,
            ChangeEvent::new(Collection::JobTypes, job_type_id, ChangeOp::Updated),
        )
        .await;

    Ok(Json(job_type))
}

// --- Setores ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSectorPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    #[schema(example = "Cerâmica")]
    pub name: String,

    #[serde(default)]
    pub position: i32,
}

// POST /api/catalog/sectors
pub async fn create_sector(
    State(app_state): State<AppState>,
    locale: Locale,
    org: OrgContext,
    _cap: RequireCapability<CapCatalogManage>,
    Json(payload): Json<CreateSectorPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let sector = app_state
        .catalog_repo
        .create_sector(org.0, &payload.name, payload.position)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale))?;

    app_state
        .sync_hub
        .publish(
            org.0,
            ChangeEvent::new(Collection::Sectors, sector.id, ChangeOp::Created),
        )
        .await;

    Ok((StatusCode::CREATED, Json(sector)))
}

// GET /api/catalog/sectors
pub async fn list_sectors(
    State(app_state): State<AppState>,
    locale: Locale,
    org: OrgContext,
) -> Result<impl IntoResponse, ApiError> {
    let sectors = app_state
        .catalog_repo
        .list_sectors(org.0)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale))?;

    Ok(Json(sectors))
}
