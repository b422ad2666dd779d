// src/docs.rs

use axum::{Json, response::IntoResponse};
use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::get_me,

        // --- Jobs ---
        handlers::jobs::create_job,
        handlers::jobs::get_job,
        handlers::jobs::add_item,
        handlers::jobs::transition_job,

        // --- Routes ---
        handlers::routes::add_job_stop,

        // --- Billing ---
        handlers::billing::create_batch,
        handlers::billing::charge_batch,

        // --- Coupons ---
        handlers::coupons::validate_coupon,

        // --- Alerts ---
        handlers::alerts::active_alert,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::Role,
            models::auth::User,
            models::auth::RegisterPayload,
            models::auth::LoginPayload,
            models::auth::AuthResponse,
            models::auth::CreateUserPayload,
            models::auth::UpdateUserRolePayload,

            // --- Organizations ---
            models::organization::OrganizationKind,
            models::organization::OrganizationStatus,
            models::organization::Organization,
            models::organization::Plan,
            models::organization::EffectivePlan,
            models::organization::DirectoryEntry,

            // --- Jobs ---
            models::jobs::JobStatus,
            models::jobs::JobUrgency,
            models::jobs::Job,
            models::jobs::JobItem,
            models::jobs::NewJobItem,
            models::jobs::JobHistoryEntry,
            models::jobs::JobDetail,

            // --- Routes ---
            models::routes::RouteShift,
            models::routes::DeliveryRoute,
            models::routes::RouteItem,
            models::routes::RouteDetail,

            // --- Billing ---
            models::billing::BatchStatus,
            models::billing::CommissionStatus,
            models::billing::DiscountKind,
            models::billing::BillingBatch,
            models::billing::CommissionRecord,
            models::billing::Coupon,

            // --- Catalog / Patients ---
            models::catalog::JobType,
            models::catalog::Sector,
            models::patients::Patient,
            models::patients::Appointment,

            // --- Chat / Alerts ---
            models::chat::ChatMessage,
            models::alerts::Alert,

            // --- Sync ---
            crate::sync::Collection,
            crate::sync::ChangeOp,
            crate::sync::ChangeEvent,

            // --- Payloads ---
            handlers::jobs::CreateJobPayload,
            handlers::jobs::UpdateJobPayload,
            handlers::jobs::UpdateItemPayload,
            handlers::jobs::TransitionJobPayload,
            handlers::routes::AddJobStopPayload,
            handlers::routes::AddPickupPayload,
            handlers::routes::ReorderPayload,
            handlers::billing::CreateBatchPayload,
            handlers::billing::WebhookPayload,
            handlers::billing::SubscribePayload,
            handlers::coupons::CreateCouponPayload,
            handlers::organizations::UpdateSettingsPayload,
            handlers::organizations::CreatePlanPayload,
            handlers::catalog::CreateJobTypePayload,
            handlers::catalog::UpdateJobTypePayload,
            handlers::catalog::CreateSectorPayload,
            handlers::patients::CreatePatientPayload,
            handlers::patients::UpdatePatientPayload,
            handlers::patients::CreateAppointmentPayload,
            handlers::patients::SetDonePayload,
            handlers::chat::MessagePayload,
            handlers::alerts::CreateAlertPayload,
        )
    ),
    tags(
        (name = "Auth", description = "Autenticação e Registro"),
        (name = "Users", description = "Membros da Organização"),
        (name = "Jobs", description = "Ordens de Serviço do Laboratório"),
        (name = "Routes", description = "Rotas de Entrega e Coleta"),
        (name = "Billing", description = "Faturamento, Boletos e Comissões"),
        (name = "Coupons", description = "Cupons da Plataforma"),
        (name = "Alerts", description = "Avisos Internos")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}

// GET /api/docs/openapi.json: o documento cru; sem shell de UI embutida
pub async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}
