// src/handlers/jobs.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{
        db_utils::get_scoped_connection,
        error::{ApiError, AppError},
    },
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        i18n::Locale,
        rbac::{CapJobsRead, CapJobsWrite, RequireCapability},
        tenancy::OrgContext,
    },
    models::jobs::{Job, JobDetail, JobItem, JobStatus, JobUrgency, NewJobItem},
    services::job_service::{CreateJobInput, UpdateJobInput},
};

// =============================================================================
//  1. CRIAÇÃO E CONSULTA
// =============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateJobPayload {
    pub client_user_id: Option<Uuid>,
    pub assigned_user_id: Option<Uuid>,

    #[schema(example = "Maria da Silva")]
    pub patient_name: Option<String>,

    pub job_type_id: Option<Uuid>,
    pub sector_id: Option<Uuid>,
    pub urgency: Option<JobUrgency>,
    pub notes: Option<String>,
    pub due_date: Option<NaiveDate>,

    #[validate(length(min = 1, message = "O trabalho precisa de ao menos um item."))]
    pub items: Vec<NewJobItem>,
}

// POST /api/jobs
#[utoipa::path(
    post,
    path = "/api/jobs",
    tag = "Jobs",
    request_body = CreateJobPayload,
    responses(
        (status = 201, description = "Trabalho criado com o total já calculado", body = Job)
    ),
    params(
        ("x-organization-id" = Uuid, Header, description = "ID da Organização")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_job(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    org: OrgContext,
    _cap: RequireCapability<CapJobsWrite>,
    Json(payload): Json<CreateJobPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let mut conn = get_scoped_connection(&app_state, &org, &user)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    let input = CreateJobInput {
        client_user_id: payload.client_user_id,
        assigned_user_id: payload.assigned_user_id,
        patient_name: payload.patient_name,
        job_type_id: payload.job_type_id,
        sector_id: payload.sector_id,
        urgency: payload.urgency.unwrap_or(JobUrgency::Normal),
        notes: payload.notes,
        due_date: payload.due_date,
        items: payload.items,
    };

    let job = app_state
        .job_service
        .create_job(&mut *conn, org.0, user.0.id, input)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(job)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobFilters {
    pub status: Option<JobStatus>,
    pub urgency: Option<JobUrgency>,
    pub client_user_id: Option<Uuid>,
}

// GET /api/jobs
pub async fn list_jobs(
    State(app_state): State<AppState>,
    locale: Locale,
    org: OrgContext,
    _cap: RequireCapability<CapJobsRead>,
    Query(filters): Query<JobFilters>,
) -> Result<impl IntoResponse, ApiError> {
    let jobs = app_state
        .job_service
        .list(org.0, filters.status, filters.urgency, filters.client_user_id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale))?;

    Ok(Json(jobs))
}

// GET /api/jobs/{id}
#[utoipa::path(
    get,
    path = "/api/jobs/{job_id}",
    tag = "Jobs",
    responses(
        (status = 200, description = "Trabalho com itens e histórico", body = JobDetail),
        (status = 404, description = "Trabalho não encontrado")
    ),
    params(
        ("job_id" = Uuid, Path, description = "ID do Trabalho"),
        ("x-organization-id" = Uuid, Header, description = "ID da Organização")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_job(
    State(app_state): State<AppState>,
    locale: Locale,
    org: OrgContext,
    _cap: RequireCapability<CapJobsRead>,
    Path(job_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let detail = app_state
        .job_service
        .get_detail(org.0, job_id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale))?;

    Ok(Json(detail))
}

// =============================================================================
//  2. EDIÇÃO
// =============================================================================

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateJobPayload {
    pub patient_name: Option<String>,
    pub job_type_id: Option<Uuid>,
    pub sector_id: Option<Uuid>,
    pub assigned_user_id: Option<Uuid>,
    pub urgency: Option<JobUrgency>,
    pub notes: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub chat_enabled: Option<bool>,
}

// PUT /api/jobs/{id}
pub async fn update_job(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    org: OrgContext,
    _cap: RequireCapability<CapJobsWrite>,
    Path(job_id): Path<Uuid>,
    Json(payload): Json<UpdateJobPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_scoped_connection(&app_state, &org, &user)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    let input = UpdateJobInput {
        patient_name: payload.patient_name,
        job_type_id: payload.job_type_id,
        sector_id: payload.sector_id,
        assigned_user_id: payload.assigned_user_id,
        urgency: payload.urgency,
        notes: payload.notes,
        due_date: payload.due_date,
        chat_enabled: payload.chat_enabled,
    };

    let job = app_state
        .job_service
        .update_job(&mut *conn, org.0, user.0.id, job_id, input)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale))?;

    Ok(Json(job))
}

// DELETE /api/jobs/{id}
pub async fn delete_job(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    org: OrgContext,
    _cap: RequireCapability<CapJobsWrite>,
    Path(job_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_scoped_connection(&app_state, &org, &user)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    app_state
        .job_service
        .delete_job(&mut *conn, org.0, job_id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale))?;

    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
//  3. ITENS (total sempre consistente)
// =============================================================================

// POST /api/jobs/{id}/items
#[utoipa::path(
    post,
    path = "/api/jobs/{job_id}/items",
    tag = "Jobs",
    request_body = NewJobItem,
    responses(
        (status = 201, description = "Item adicionado; total do trabalho recalculado", body = JobItem)
    ),
    params(
        ("job_id" = Uuid, Path, description = "ID do Trabalho"),
        ("x-organization-id" = Uuid, Header, description = "ID da Organização")
    ),
    security(("api_jwt" = []))
)]
pub async fn add_item(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    org: OrgContext,
    _cap: RequireCapability<CapJobsWrite>,
    Path(job_id): Path<Uuid>,
    Json(payload): Json<NewJobItem>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_scoped_connection(&app_state, &org, &user)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    let item = app_state
        .job_service
        .add_item(&mut *conn, org.0, user.0.id, job_id, payload)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(item)))
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateItemPayload {
    pub description: Option<String>,
    pub quantity: Option<Decimal>,
    pub unit_price: Option<Decimal>,
}

// PUT /api/jobs/items/{id}
pub async fn update_item(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    org: OrgContext,
    _cap: RequireCapability<CapJobsWrite>,
    Path(item_id): Path<Uuid>,
    Json(payload): Json<UpdateItemPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_scoped_connection(&app_state, &org, &user)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    let item = app_state
        .job_service
        .update_item(
            &mut *conn,
            org.0,
            user.0.id,
            item_id,
            payload.description.as_deref(),
            payload.quantity,
            payload.unit_price,
        )
        .await
        .map_err(|app_err| app_err.to_api_error(&locale))?;

    Ok(Json(item))
}

// DELETE /api/jobs/items/{id}
pub async fn delete_item(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    org: OrgContext,
    _cap: RequireCapability<CapJobsWrite>,
    Path(item_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_scoped_connection(&app_state, &org, &user)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    app_state
        .job_service
        .remove_item(&mut *conn, org.0, user.0.id, item_id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale))?;

    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
//  4. TRANSIÇÃO DE STATUS
// =============================================================================

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransitionJobPayload {
    #[schema(example = "Completed")]
    pub new_status: JobStatus,
}

// POST /api/jobs/{id}/transition
#[utoipa::path(
    post,
    path = "/api/jobs/{job_id}/transition",
    tag = "Jobs",
    request_body = TransitionJobPayload,
    responses(
        (status = 200, description = "Status alterado; histórico e comissões atualizados", body = Job),
        (status = 422, description = "Transição não permitida")
    ),
    params(
        ("job_id" = Uuid, Path, description = "ID do Trabalho"),
        ("x-organization-id" = Uuid, Header, description = "ID da Organização")
    ),
    security(("api_jwt" = []))
)]
pub async fn transition_job(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    org: OrgContext,
    _cap: RequireCapability<CapJobsWrite>,
    Path(job_id): Path<Uuid>,
    Json(payload): Json<TransitionJobPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_scoped_connection(&app_state, &org, &user)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    let job = app_state
        .job_service
        .transition(&mut *conn, org.0, user.0.id, job_id, payload.new_status)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale))?;

    Ok(Json(job))
}
