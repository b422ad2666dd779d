// src/middleware/tenancy.rs

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
};
use uuid::Uuid;

use crate::common::error::ApiError;
use crate::models::auth::{Role, User};

// O nome do nosso cabeçalho HTTP customizado
const ORG_ID_HEADER: &str = "x-organization-id";

// O extrator de tenant. Armazena o UUID da organização que o usuário quer
// acessar, já conferido contra o vínculo do próprio usuário.
#[derive(Debug, Clone)]
pub struct OrgContext(pub Uuid);

impl<S> FromRequestParts<S> for OrgContext
where
    S: Send + Sync,
{
    // Usamos ApiError como rejeição, pois ele já implementa IntoResponse
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        let header_value = parts.headers.get(ORG_ID_HEADER).ok_or(ApiError {
            status: StatusCode::BAD_REQUEST,
            error: "O cabeçalho X-Organization-ID é obrigatório.".to_string(),
            details: None,
        })?;

        let value_str = header_value.to_str().map_err(|_| ApiError {
            status: StatusCode::BAD_REQUEST,
            error: "Cabeçalho X-Organization-ID contém caracteres inválidos.".to_string(),
            details: None,
        })?;

        let org_id = Uuid::parse_str(value_str).map_err(|_| ApiError {
            status: StatusCode::BAD_REQUEST,
            error: "Cabeçalho X-Organization-ID inválido (não é um UUID).".to_string(),
            details: None,
        })?;

        // O auth_guard já rodou; o usuário está nos extensions.
        let user = parts.extensions.get::<User>().ok_or(ApiError {
            status: StatusCode::UNAUTHORIZED,
            error: "Usuário não autenticado.".to_string(),
            details: None,
        })?;

        // Cada usuário pertence a exatamente uma organização; só o
        // super-admin da plataforma cruza tenants.
        if user.role != Role::SuperAdmin && user.organization_id != org_id {
            return Err(ApiError {
                status: StatusCode::FORBIDDEN,
                error: "Você não faz parte desta organização.".to_string(),
                details: None,
            });
        }

        Ok(OrgContext(org_id))
    }
}
