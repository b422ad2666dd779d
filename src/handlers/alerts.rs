// src/handlers/alerts.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        i18n::Locale,
        rbac::{CapAlertsManage, RequireCapability},
        tenancy::OrgContext,
    },
    models::alerts::Alert,
    sync::{ChangeEvent, ChangeOp, Collection},
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAlertPayload {
    #[validate(length(min = 1, message = "A mensagem do aviso é obrigatória."))]
    #[schema(example = "Reunião geral às 14h")]
    pub message: String,

    pub scheduled_at: DateTime<Utc>,
}

// POST /api/alerts
pub async fn create_alert(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    org: OrgContext,
    _cap: RequireCapability<CapAlertsManage>,
    Json(payload): Json<CreateAlertPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let alert = app_state
        .alert_repo
        .insert(org.0, &payload.message, payload.scheduled_at, user.0.id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale))?;

    app_state
        .sync_hub
        .publish(
            org.0,
            ChangeEvent::new(Collection::Alerts, alert.id, ChangeOp::Created),
        )
        .await;

    Ok((StatusCode::CREATED, Json(alert)))
}

// GET /api/alerts
pub async fn list_alerts(
    State(app_state): State<AppState>,
    locale: Locale,
    org: OrgContext,
) -> Result<impl IntoResponse, ApiError> {
    let alerts = app_state
        .alert_repo
        .list(org.0)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale))?;

    Ok(Json(alerts))
}

// GET /api/alerts/active: o aviso mais antigo já agendado que este usuário
// ainda não marcou como ciente; 204 quando não há nenhum
#[utoipa::path(
    get,
    path = "/api/alerts/active",
    tag = "Alerts",
    responses(
        (status = 200, description = "Aviso ativo para o usuário", body = Alert),
        (status = 204, description = "Nenhum aviso pendente")
    ),
    params(
        ("x-organization-id" = Uuid, Header, description = "ID da Organização")
    ),
    security(("api_jwt" = []))
)]
pub async fn active_alert(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    org: OrgContext,
) -> Result<impl IntoResponse, ApiError> {
    let alert = app_state
        .alert_repo
        .active_for_user(org.0, user.0.id, Utc::now())
        .await
        .map_err(|app_err| app_err.to_api_error(&locale))?;

    match alert {
        Some(alert) => Ok(Json(alert).into_response()),
        None => Ok(StatusCode::NO_CONTENT.into_response()),
    }
}

// POST /api/alerts/{id}/ack: idempotente: repetir não duplica a leitura
pub async fn acknowledge_alert(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    org: OrgContext,
    Path(alert_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    // Garante que o aviso pertence à organização da requisição
    app_state
        .alert_repo
        .find_by_id(org.0, alert_id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale))?
        .ok_or_else(|| AppError::ResourceNotFound("Aviso".into()).to_api_error(&locale))?;

    app_state
        .alert_repo
        .acknowledge(alert_id, user.0.id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale))?;

    Ok(StatusCode::NO_CONTENT)
}
