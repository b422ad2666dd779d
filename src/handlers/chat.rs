// src/handlers/chat.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
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
        rbac::{CapChatParticipate, RequireCapability},
        tenancy::OrgContext,
    },
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MessagePayload {
    #[validate(length(min = 1, message = "A mensagem não pode ser vazia."))]
    pub body: String,
}

// POST /api/jobs/{id}/messages
pub async fn post_message(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    org: OrgContext,
    _cap: RequireCapability<CapChatParticipate>,
    Path(job_id): Path<Uuid>,
    Json(payload): Json<MessagePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let message = app_state
        .chat_service
        .post_message(org.0, user.0.id, job_id, &payload.body)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(message)))
}

// GET /api/jobs/{id}/messages: ordenadas por criação
pub async fn list_messages(
    State(app_state): State<AppState>,
    locale: Locale,
    org: OrgContext,
    _cap: RequireCapability<CapChatParticipate>,
    Path(job_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let messages = app_state
        .chat_service
        .list(org.0, job_id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale))?;

    Ok(Json(messages))
}

// PUT /api/messages/{id}: só o autor
pub async fn edit_message(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    org: OrgContext,
    _cap: RequireCapability<CapChatParticipate>,
    Path(message_id): Path<Uuid>,
    Json(payload): Json<MessagePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let message = app_state
        .chat_service
        .edit_message(org.0, user.0.id, message_id, &payload.body)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale))?;

    Ok(Json(message))
}

// DELETE /api/messages/{id}: soft-delete, só o autor
pub async fn delete_message(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    org: OrgContext,
    _cap: RequireCapability<CapChatParticipate>,
    Path(message_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .chat_service
        .delete_message(org.0, user.0.id, message_id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale))?;

    Ok(StatusCode::NO_CONTENT)
}
