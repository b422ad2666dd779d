// src/handlers/patients.rs

use axum::{
    Json,
    extract::{Path, Query, State},
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
        i18n::Locale,
        rbac::{CapPatientsManage, RequireCapability},
        tenancy::OrgContext,
    },
    sync::{ChangeEvent, ChangeOp, Collection},
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePatientPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub full_name: String,
    pub document: Option<String>,
    pub phone: Option<String>,
    pub notes: Option<String>,
}

// POST /api/patients
pub async fn create_patient(
    State(app_state): State<AppState>,
    locale: Locale,
    org: OrgContext,
    _cap: RequireCapability<CapPatientsManage>,
    Json(payload): Json<CreatePatientPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let patient = app_state
        .patient_repo
        .create(
            org.0,
            &payload.full_name,
            payload.document.as_deref(),
            payload.phone.as_deref(),
            payload.notes.as_deref(),
        )
        .await
        .map_err(|app_err| app_err.to_api_error(&locale))?;

    app_state
        .sync_hub
        .publish(
            org.0,
            ChangeEvent::new(Collection::Patients, patient.id, ChangeOp::Created),
        )
        .await;

    Ok((StatusCode::CREATED, Json(patient)))
}

// GET /api/patients
pub async fn list_patients(
    State(app_state): State<AppState>,
    locale: Locale,
    org: OrgContext,
) -> Result<impl IntoResponse, ApiError> {
    let patients = app_state
        .patient_repo
        .list(org.0)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale))?;

    Ok(Json(patients))
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePatientPayload {
    pub full_name: Option<String>,
    pub document: Option<String>,
    pub phone: Option<String>,
    pub notes: Option<String>,
}

// PUT /api/patients/{id}
pub async fn update_patient(
    State(app_state): State<AppState>,
    locale: Locale,
    org: OrgContext,
    _cap: RequireCapability<CapPatientsManage>,
    Path(patient_id): Path<Uuid>,
    Json(payload): Json<UpdatePatientPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let patient = app_state
        .patient_repo
        .update(
            org.0,
            patient_id,
            payload.full_name.as_deref(),
            payload.document.as_deref(),
            payload.phone.as_deref(),
            payload.notes.as_deref(),
        )
        .await
        .map_err(|app_err| app_err.to_api_error(&locale))?
        .ok_or_else(|| AppError::ResourceNotFound("Paciente".into()).to_api_error(&locale))?;

    app_state
        .sync_hub
        .publish(
            org.0,
            ChangeEvent::new(Collection::Patients, patient_id, ChangeOp::Updated),
        )
        .await;

    Ok(Json(patient))
}

// DELETE /api/patients/{id}
pub async fn delete_patient(
    State(app_state): State<AppState>,
    locale: Locale,
    org: OrgContext,
    _cap: RequireCapability<CapPatientsManage>,
    Path(patient_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let rows = app_state
        .patient_repo
        .delete(org.0, patient_id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale))?;

    if rows == 0 {
        return Err(AppError::ResourceNotFound("Paciente".into()).to_api_error(&locale));
    }

    app_state
        .sync_hub
        .publish(
            org.0,
            ChangeEvent::new(Collection::Patients, patient_id, ChangeOp::Deleted),
        )
        .await;

    Ok(StatusCode::NO_CONTENT)
}

// --- Agendamentos ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAppointmentPayload {
    pub patient_id: Uuid,
    pub scheduled_at: DateTime<Utc>,

    #[validate(length(min = 1, message = "A descrição é obrigatória."))]
    pub description: String,
}

// POST /api/appointments
pub async fn create_appointment(
    State(app_state): State<AppState>,
    locale: Locale,
    org: OrgContext,
    _cap: RequireCapability<CapPatientsManage>,
    Json(payload): Json<CreateAppointmentPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let appointment = app_state
        .patient_repo
        .create_appointment(
            org.0,
            payload.patient_id,
            payload.scheduled_at,
            &payload.description,
        )
        .await
        .map_err(|app_err| app_err.to_api_error(&locale))?;

    app_state
        .sync_hub
        .publish(
            org.0,
            ChangeEvent::new(Collection::Appointments, appointment.id, ChangeOp::Created),
        )
        .await;

    Ok((StatusCode::CREATED, Json(appointment)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentFilters {
    pub patient_id: Option<Uuid>,
}

// GET /api/appointments
pub async fn list_appointments(
    State(app_state): State<AppState>,
    locale: Locale,
    org: OrgContext,
    Query(filters): Query<AppointmentFilters>,
) -> Result<impl IntoResponse, ApiError> {
    let appointments = app_state
        .patient_repo
        .list_appointments(org.0, filters.patient_id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale))?;

    Ok(Json(appointments))
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SetDonePayload {
    pub is_done: bool,
}

// PUT /api/appointments/{id}/done
pub async fn set_appointment_done(
    State(app_state): State<AppState>,
    locale: Locale,
    org: OrgContext,
    _cap: RequireCapability<CapPatientsManage>,
    Path(appointment_id): Path<Uuid>,
    Json(payload): Json<SetDonePayload>,
) -> Result<impl IntoResponse, ApiError> {
    let appointment = app_state
        .patient_repo
        .set_appointment_done(org.0, appointment_id, payload.is_done)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale))?
        .ok_or_else(|| AppError::ResourceNotFound("Agendamento".into()).to_api_error(&locale))?;

    app_state
        .sync_hub
        .publish(
            org.0,
            ChangeEvent::new(Collection::Appointments, appointment_id, ChangeOp::Updated),
        )
        .await;

    Ok(Json(appointment))
}
