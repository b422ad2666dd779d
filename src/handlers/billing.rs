// src/handlers/billing.rs

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

use crate::{
    common::{
        db_utils::get_scoped_connection,
        error::{ApiError, AppError},
    },
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        i18n::Locale,
        rbac::{CapBillingManage, CapCommissionsManage, CapOrgSettingsManage, RequireCapability},
        tenancy::OrgContext,
    },
    models::billing::{BillingBatch, CommissionStatus},
    sync::{ChangeEvent, ChangeOp, Collection},
};

// =============================================================================
//  1. LOTES DE FATURAMENTO
// =============================================================================

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBatchPayload {
    pub client_user_id: Uuid,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
}

// POST /api/billing/batches
#[utoipa::path(
    post,
    path = "/api/billing/batches",
    tag = "Billing",
    request_body = CreateBatchPayload,
    responses(
        (status = 201, description = "Lote criado com os trabalhos do período", body = BillingBatch),
        (status = 400, description = "Nenhum trabalho a faturar")
    ),
    params(
        ("x-organization-id" = Uuid, Header, description = "ID da Organização")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_batch(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    org: OrgContext,
    _cap: RequireCapability<CapBillingManage>,
    Json(payload): Json<CreateBatchPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_scoped_connection(&app_state, &org, &user)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    let batch = app_state
        .billing_service
        .create_batch(
            &mut *conn,
            org.0,
            payload.client_user_id,
            payload.period_start,
            payload.period_end,
        )
        .await
        .map_err(|app_err| app_err.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(batch)))
}

// GET /api/billing/batches
pub async fn list_batches(
    State(app_state): State<AppState>,
    locale: Locale,
    org: OrgContext,
    _cap: RequireCapability<CapBillingManage>,
) -> Result<impl IntoResponse, ApiError> {
    let batches = app_state
        .billing_service
        .list_batches(org.0)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale))?;

    Ok(Json(batches))
}

// POST /api/billing/batches/{id}/charge: emite o boleto no gateway
#[utoipa::path(
    post,
    path = "/api/billing/batches/{batch_id}/charge",
    tag = "Billing",
    responses(
        (status = 200, description = "Boleto emitido", body = BillingBatch),
        (status = 502, description = "Gateway indisponível: o lote permanece aberto")
    ),
    params(
        ("batch_id" = Uuid, Path, description = "ID do Lote"),
        ("x-organization-id" = Uuid, Header, description = "ID da Organização")
    ),
    security(("api_jwt" = []))
)]
pub async fn charge_batch(
    State(app_state): State<AppState>,
    locale: Locale,
    org: OrgContext,
    _cap: RequireCapability<CapBillingManage>,
    Path(batch_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let batch = app_state
        .billing_service
        .charge_batch(org.0, batch_id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale))?;

    Ok(Json(batch))
}

// =============================================================================
//  2. WEBHOOK DO GATEWAY (rota pública, sem tenant)
// =============================================================================

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WebhookPayload {
    #[schema(example = "charge.paid")]
    pub event: String,
    pub charge_id: Option<String>,
    pub subscription_id: Option<String>,
}

// POST /api/webhooks/gateway
pub async fn webhook(
    State(app_state): State<AppState>,
    Json(payload): Json<WebhookPayload>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .billing_service
        .handle_webhook(
            &payload.event,
            payload.charge_id.as_deref(),
            payload.subscription_id.as_deref(),
        )
        .await
        .map_err(|app_err| app_err.to_api_error(&Locale::default()))?;

    Ok(StatusCode::OK)
}

// =============================================================================
//  3. ASSINATURA DA PLATAFORMA
// =============================================================================

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubscribePayload {
    pub plan_id: Uuid,
    #[schema(example = "BEMVINDO20")]
    pub coupon_code: Option<String>,
}

// POST /api/subscriptions: a conta fica PENDING até o webhook confirmar
pub async fn subscribe(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    org: OrgContext,
    _cap: RequireCapability<CapOrgSettingsManage>,
    Json(payload): Json<SubscribePayload>,
) -> Result<impl IntoResponse, ApiError> {
    let organization = app_state
        .subscription_service
        .subscribe(
            org.0,
            &user.0,
            payload.plan_id,
            payload.coupon_code.as_deref(),
        )
        .await
        .map_err(|app_err| app_err.to_api_error(&locale))?;

    Ok(Json(organization))
}

// =============================================================================
//  4. COMISSÕES
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommissionFilters {
    pub user_id: Option<Uuid>,
    pub status: Option<CommissionStatus>,
}

// GET /api/commissions: quem não gerencia comissões só enxerga as próprias
pub async fn list_commissions(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    org: OrgContext,
    Query(filters): Query<CommissionFilters>,
) -> Result<impl IntoResponse, ApiError> {
    let can_manage = user
        .0
        .role
        .can(crate::middleware::rbac::Capability::CommissionsManage);

    let user_filter = if can_manage {
        filters.user_id
    } else {
        Some(user.0.id)
    };

    let records = app_state
        .billing_repo
        .list_commissions(&app_state.db_pool, org.0, user_filter, filters.status)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale))?;

    Ok(Json(records))
}

// POST /api/commissions/{id}/pay
pub async fn pay_commission(
    State(app_state): State<AppState>,
    locale: Locale,
    org: OrgContext,
    _cap: RequireCapability<CapCommissionsManage>,
    Path(record_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let record = app_state
        .billing_repo
        .mark_commission_paid(&app_state.db_pool, org.0, record_id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale))?
        .ok_or_else(|| {
            AppError::ResourceNotFound("Comissão pendente".into()).to_api_error(&locale)
        })?;

    app_state
        .sync_hub
        .publish(
            org.0,
            ChangeEvent::new(Collection::Commissions, record_id, ChangeOp::Updated),
        )
        .await;

    Ok(Json(record))
}
