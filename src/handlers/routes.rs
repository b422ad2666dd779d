// src/handlers/routes.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::NaiveDate;
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
        rbac::{CapRoutesManage, RequireCapability},
        tenancy::OrgContext,
    },
    models::routes::{RouteItem, RouteShift},
};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddJobStopPayload {
    pub driver_id: Uuid,
    pub route_date: NaiveDate,
    pub shift: RouteShift,
    pub job_id: Uuid,
    // Sem endereço, a parada sai com a resolução de melhor esforço
    pub address: Option<String>,
}

// POST /api/routes/jobs: coloca um trabalho na rota (cria a rota se preciso)
#[utoipa::path(
    post,
    path = "/api/routes/jobs",
    tag = "Routes",
    request_body = AddJobStopPayload,
    responses(
        (status = 201, description = "Parada adicionada no fim da rota", body = RouteItem),
        (status = 404, description = "Trabalho não encontrado")
    ),
    params(
        ("x-organization-id" = Uuid, Header, description = "ID da Organização")
    ),
    security(("api_jwt" = []))
)]
pub async fn add_job_stop(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    org: OrgContext,
    _cap: RequireCapability<CapRoutesManage>,
    Json(payload): Json<AddJobStopPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_scoped_connection(&app_state, &org, &user)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    let item = app_state
        .route_service
        .add_job_stop(
            &mut *conn,
            org.0,
            payload.driver_id,
            payload.route_date,
            payload.shift,
            payload.job_id,
            payload.address,
        )
        .await
        .map_err(|app_err| app_err.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(item)))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddPickupPayload {
    pub driver_id: Uuid,
    pub route_date: NaiveDate,
    pub shift: RouteShift,

    #[validate(length(min = 1, message = "A descrição da coleta é obrigatória."))]
    pub description: String,

    #[validate(length(min = 1, message = "O endereço da coleta é obrigatório."))]
    pub address: String,
}

// POST /api/routes/pickups: coleta avulsa
pub async fn add_pickup(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    org: OrgContext,
    _cap: RequireCapability<CapRoutesManage>,
    Json(payload): Json<AddPickupPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let mut conn = get_scoped_connection(&app_state, &org, &user)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    let item = app_state
        .route_service
        .add_pickup_stop(
            &mut *conn,
            org.0,
            payload.driver_id,
            payload.route_date,
            payload.shift,
            &payload.description,
            &payload.address,
        )
        .await
        .map_err(|app_err| app_err.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(item)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteFilters {
    pub date: NaiveDate,
    pub driver_id: Option<Uuid>,
}

// GET /api/routes?date=2025-03-14&driverId=...
pub async fn list_routes(
    State(app_state): State<AppState>,
    locale: Locale,
    org: OrgContext,
    _cap: RequireCapability<CapRoutesManage>,
    Query(filters): Query<RouteFilters>,
) -> Result<impl IntoResponse, ApiError> {
    let routes = app_state
        .route_service
        .list(org.0, filters.date, filters.driver_id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale))?;

    Ok(Json(routes))
}

// GET /api/routes/{id}
pub async fn get_route(
    State(app_state): State<AppState>,
    locale: Locale,
    org: OrgContext,
    _cap: RequireCapability<CapRoutesManage>,
    Path(route_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let detail = app_state
        .route_service
        .get_detail(org.0, route_id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale))?;

    Ok(Json(detail))
}

// DELETE /api/routes/items/{id}: remove a parada e fecha o buraco
pub async fn remove_stop(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    org: OrgContext,
    _cap: RequireCapability<CapRoutesManage>,
    Path(item_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_scoped_connection(&app_state, &org, &user)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    app_state
        .route_service
        .remove_stop(&mut *conn, org.0, item_id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale))?;

    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReorderPayload {
    pub item_ids: Vec<Uuid>,
}

// PUT /api/routes/{id}/reorder: nova ordem completa das paradas
pub async fn reorder_route(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    org: OrgContext,
    _cap: RequireCapability<CapRoutesManage>,
    Path(route_id): Path<Uuid>,
    Json(payload): Json<ReorderPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_scoped_connection(&app_state, &org, &user)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    let items = app_state
        .route_service
        .reorder(&mut *conn, org.0, route_id, &payload.item_ids)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale))?;

    Ok(Json(items))
}
