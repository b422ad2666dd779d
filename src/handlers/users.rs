// src/handlers/users.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use rust_decimal::Decimal;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{
        i18n::Locale,
        rbac::{CapUsersManage, RequireCapability},
        tenancy::OrgContext,
    },
    models::auth::{CreateUserPayload, UpdateUserRolePayload},
    sync::{ChangeEvent, ChangeOp, Collection},
};

// POST /api/users: cria um membro na organização
pub async fn create_member(
    State(app_state): State<AppState>,
    locale: Locale,
    org: OrgContext,
    _cap: RequireCapability<CapUsersManage>,
    Json(payload): Json<CreateUserPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let member = app_state
        .auth_service
        .create_member(
            org.0,
            &payload.email,
            &payload.password,
            &payload.full_name,
            payload.role,
            payload.commission_percent.unwrap_or(Decimal::ZERO),
        )
        .await
        .map_err(|app_err| app_err.to_api_error(&locale))?;

    app_state
        .sync_hub
        .publish(org.0, ChangeEvent::new(Collection::Users, member.id, ChangeOp::Created))
        .await;

    Ok((StatusCode::CREATED, Json(member)))
}

// GET /api/users: lista os membros da organização
pub async fn list_members(
    State(app_state): State<AppState>,
    locale: Locale,
    org: OrgContext,
    _cap: RequireCapability<CapUsersManage>,
) -> Result<impl IntoResponse, ApiError> {
    let members = app_state
        .user_repo
        .list_by_org(&app_state.db_pool, org.0)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale))?;

    Ok(Json(members))
}

// PUT /api/users/{id}/role: papel e comissão do membro
pub async fn update_role(
    State(app_state): State<AppState>,
    locale: Locale,
    org: OrgContext,
    _cap: RequireCapability<CapUsersManage>,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<UpdateUserRolePayload>,
) -> Result<impl IntoResponse, ApiError> {
    let member = app_state
        .user_repo
        .update_role(
            &app_state.db_pool,
            org.0,
            user_id,
            payload.role,
            payload.commission_percent,
        )
        .await
        .map_err(|app_err| app_err.to_api_error(&locale))?
        .ok_or_else(|| AppError::UserNotFound.to_api_error(&locale))?;

    app_state
        .sync_hub
        .publish(org.0, ChangeEvent::new(Collection::Users, user_id, ChangeOp::Updated))
        .await;

    Ok(Json(member))
}
