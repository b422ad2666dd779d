// src/handlers/coupons.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{
        i18n::Locale,
        rbac::{CapPlatformManage, RequireCapability},
    },
    models::billing::{Coupon, DiscountKind},
};

// GET /api/coupons/{code}/validate: nunca devolve cupom esgotado ou vencido
#[utoipa::path(
    get,
    path = "/api/coupons/{code}/validate",
    tag = "Coupons",
    responses(
        (status = 200, description = "Cupom válido", body = Coupon),
        (status = 404, description = "Cupom não existe"),
        (status = 422, description = "Cupom esgotado, vencido ou desativado")
    ),
    params(
        ("code" = String, Path, description = "Código do cupom")
    ),
    security(("api_jwt" = []))
)]
pub async fn validate_coupon(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(code): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let coupon = app_state
        .coupon_repo
        .find_by_code(&code)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale))?
        .ok_or_else(|| AppError::ResourceNotFound("Cupom".into()).to_api_error(&locale))?;

    coupon
        .check_valid(Utc::now())
        .map_err(|rejection| AppError::CouponRejected(rejection).to_api_error(&locale))?;

    Ok(Json(coupon))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCouponPayload {
    #[validate(length(min = 3, message = "O código deve ter ao menos 3 caracteres."))]
    #[schema(example = "BEMVINDO20")]
    pub code: String,

    pub kind: DiscountKind,

    #[schema(example = "20.00")]
    pub value: Decimal,

    #[validate(range(min = 1, message = "O cupom precisa de ao menos um uso."))]
    pub max_uses: i32,

    pub valid_from: DateTime<Utc>,
    pub valid_until: DateTime<Utc>,
}

// POST /api/coupons: só a plataforma cria cupons
pub async fn create_coupon(
    State(app_state): State<AppState>,
    locale: Locale,
    _cap: RequireCapability<CapPlatformManage>,
    Json(payload): Json<CreateCouponPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    if payload.valid_until <= payload.valid_from {
        return Err(AppError::BadRequest(
            "A validade final precisa ser posterior à inicial.".into(),
        )
        .to_api_error(&locale));
    }

    let coupon = app_state
        .coupon_repo
        .create(
            &payload.code,
            payload.kind,
            payload.value,
            payload.max_uses,
            payload.valid_from,
            payload.valid_until,
        )
        .await
        .map_err(|app_err| app_err.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(coupon)))
}

// GET /api/coupons
pub async fn list_coupons(
    State(app_state): State<AppState>,
    locale: Locale,
    _cap: RequireCapability<CapPlatformManage>,
) -> Result<impl IntoResponse, ApiError> {
    let coupons = app_state
        .coupon_repo
        .list()
        .await
        .map_err(|app_err| app_err.to_api_error(&locale))?;

    Ok(Json(coupons))
}

// DELETE /api/coupons/{code}: desativa (nunca apagamos histórico de uso)
pub async fn deactivate_coupon(
    State(app_state): State<AppState>,
    locale: Locale,
    _cap: RequireCapability<CapPlatformManage>,
    Path(code): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .coupon_repo
        .deactivate(&code)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale))?
        .ok_or_else(|| AppError::ResourceNotFound("Cupom".into()).to_api_error(&locale))?;

    Ok(StatusCode::NO_CONTENT)
}
