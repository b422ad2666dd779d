// src/handlers/organizations.rs

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{
        i18n::Locale,
        rbac::{CapOrgSettingsManage, CapPlatformManage, RequireCapability},
        tenancy::OrgContext,
    },
    models::organization::EffectivePlan,
    sync::{ChangeEvent, ChangeOp, Collection},
};

// GET /api/organizations/me
pub async fn get_my_organization(
    State(app_state): State<AppState>,
    locale: Locale,
    org: OrgContext,
) -> Result<impl IntoResponse, ApiError> {
    let organization = app_state
        .org_repo
        .find_by_id(org.0)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale))?
        .ok_or_else(|| AppError::ResourceNotFound("Organização".into()).to_api_error(&locale))?;

    Ok(Json(organization))
}

// GET /api/organizations/me/plan: plano em vigor (contratado ou padrão)
pub async fn get_effective_plan(
    State(app_state): State<AppState>,
    locale: Locale,
    org: OrgContext,
) -> Result<impl IntoResponse, ApiError> {
    let organization = app_state
        .org_repo
        .find_by_id(org.0)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale))?
        .ok_or_else(|| AppError::ResourceNotFound("Organização".into()).to_api_error(&locale))?;

    let effective = match organization.plan_id {
        Some(plan_id) => match app_state
            .org_repo
            .find_plan(plan_id)
            .await
            .map_err(|app_err| app_err.to_api_error(&locale))?
        {
            Some(plan) => EffectivePlan::from_plan(&plan),
            // Referência quebrada => valem os limites padrão
            None => EffectivePlan::fallback(),
        },
        None => EffectivePlan::fallback(),
    };

    Ok(Json(effective))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSettingsPayload {
    #[validate(range(min = 1, max = 28, message = "O dia de cobrança deve estar entre 1 e 28."))]
    pub billing_day: Option<i32>,
    pub payment_terms: Option<String>,
    pub boleto_instructions: Option<String>,
    pub logo_url: Option<String>,
}

// PUT /api/organizations/settings
pub async fn update_settings(
    State(app_state): State<AppState>,
    locale: Locale,
    org: OrgContext,
    _cap: RequireCapability<CapOrgSettingsManage>,
    Json(payload): Json<UpdateSettingsPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let organization = app_state
        .org_repo
        .update_settings(
            org.0,
            payload.billing_day,
            payload.payment_terms.as_deref(),
            payload.boleto_instructions.as_deref(),
            payload.logo_url.as_deref(),
        )
        .await
        .map_err(|app_err| app_err.to_api_error(&locale))?
        .ok_or_else(|| AppError::ResourceNotFound("Organização".into()).to_api_error(&locale))?;

    app_state
        .sync_hub
        .publish(
            org.0,
            ChangeEvent::new(Collection::Organizations, org.0, ChangeOp::Updated),
        )
        .await;

    Ok(Json(organization))
}

// GET /api/organizations/directory: laboratórios visíveis (coleção global)
pub async fn directory(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<impl IntoResponse, ApiError> {
    let entries = app_state
        .org_repo
        .list_directory()
        .await
        .map_err(|app_err| app_err.to_api_error(&locale))?;

    Ok(Json(entries))
}

// --- Planos (coleção global) ---

// GET /api/plans
pub async fn list_plans(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<impl IntoResponse, ApiError> {
    let plans = app_state
        .org_repo
        .list_plans()
        .await
        .map_err(|app_err| app_err.to_api_error(&locale))?;

    Ok(Json(plans))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePlanPayload {
    #[validate(length(min = 1, message = "O nome do plano é obrigatório."))]
    pub name: String,
    pub monthly_price: Decimal,
    #[validate(range(min = 1, message = "O plano precisa permitir ao menos um usuário."))]
    pub max_users: i32,
}

// POST /api/plans: só o super-admin da plataforma
pub async fn create_plan(
    State(app_state): State<AppState>,
    locale: Locale,
    _cap: RequireCapability<CapPlatformManage>,
    Json(payload): Json<CreatePlanPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let plan = app_state
        .org_repo
        .create_plan(&payload.name, payload.monthly_price, payload.max_users)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(plan)))
}
