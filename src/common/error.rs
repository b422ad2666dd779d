use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::common::i18n::{self, MessageKey};
use crate::middleware::i18n::Locale;
use crate::models::billing::CouponRejection;

// Nosso tipo de erro de domínio, com `thiserror` para melhor ergonomia.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("E-mail já existe")]
    EmailAlreadyExists,

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Usuário não encontrado")]
    UserNotFound,

    #[error("Recurso não encontrado: {0}")]
    ResourceNotFound(String),

    #[error("Permissão negada: {0}")]
    PermissionDenied(String),

    #[error("Violação de unicidade: {0}")]
    UniqueConstraintViolation(String),

    #[error("Cupom recusado")]
    CouponRejected(CouponRejection),

    #[error("Requisição inválida: {0}")]
    BadRequest(String),

    #[error("Transição de status inválida: {0}")]
    InvalidTransition(String),

    #[error("Limite do plano atingido")]
    PlanLimitReached,

    #[error("Falha no gateway de pagamento: {0}")]
    PaymentGateway(String),

    // Variante para erros de banco de dados (sqlx)
    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado
    // `anyhow::Error` é ótimo para capturar o contexto do erro.
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

// O erro já no formato HTTP: status + mensagem no idioma do cliente.
// É o tipo de rejeição dos handlers e extratores.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub details: Option<serde_json::Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => json!({ "error": self.error, "details": details }),
            None => json!({ "error": self.error }),
        };
        (self.status, Json(body)).into_response()
    }
}

impl AppError {
    pub fn to_api_error(self, locale: &Locale) -> ApiError {
        let lang = locale.0.as_str();

        match self {
            // Retorna todos os detalhes da validação, campo a campo.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                ApiError {
                    status: StatusCode::BAD_REQUEST,
                    error: i18n::message(lang, MessageKey::Validation).to_string(),
                    details: serde_json::to_value(details).ok(),
                }
            }
            AppError::EmailAlreadyExists => ApiError {
                status: StatusCode::CONFLICT,
                error: i18n::message(lang, MessageKey::EmailAlreadyExists).to_string(),
                details: None,
            },
            AppError::InvalidCredentials => ApiError {
                status: StatusCode::UNAUTHORIZED,
                error: i18n::message(lang, MessageKey::InvalidCredentials).to_string(),
                details: None,
            },
            AppError::InvalidToken => ApiError {
                status: StatusCode::UNAUTHORIZED,
                error: i18n::message(lang, MessageKey::InvalidToken).to_string(),
                details: None,
            },
            AppError::UserNotFound => ApiError {
                status: StatusCode::NOT_FOUND,
                error: i18n::message(lang, MessageKey::UserNotFound).to_string(),
                details: None,
            },
            AppError::ResourceNotFound(resource) => ApiError {
                status: StatusCode::NOT_FOUND,
                error: i18n::message(lang, MessageKey::ResourceNotFound).to_string(),
                details: Some(json!({ "resource": resource })),
            },
            AppError::PermissionDenied(capability) => ApiError {
                status: StatusCode::FORBIDDEN,
                error: i18n::message(lang, MessageKey::PermissionDenied).to_string(),
                details: Some(json!({ "capability": capability })),
            },
            // A mensagem já vem pronta do repositório ("Já existe um ...")
            AppError::UniqueConstraintViolation(message) => ApiError {
                status: StatusCode::CONFLICT,
                error: message,
                details: None,
            },
            AppError::CouponRejected(rejection) => {
                let key = match rejection {
                    CouponRejection::Exhausted => MessageKey::CouponExhausted,
                    CouponRejection::NotYetValid => MessageKey::CouponNotYetValid,
                    CouponRejection::Expired => MessageKey::CouponExpired,
                    CouponRejection::Inactive => MessageKey::CouponInactive,
                };
                ApiError {
                    status: StatusCode::UNPROCESSABLE_ENTITY,
                    error: i18n::message(lang, key).to_string(),
                    details: None,
                }
            }
            // A mensagem já vem pronta do chamador
            AppError::BadRequest(message) => ApiError {
                status: StatusCode::BAD_REQUEST,
                error: message,
                details: None,
            },
            AppError::InvalidTransition(transition) => ApiError {
                status: StatusCode::UNPROCESSABLE_ENTITY,
                error: i18n::message(lang, MessageKey::InvalidTransition).to_string(),
                details: Some(json!({ "transition": transition })),
            },
            AppError::PlanLimitReached => ApiError {
                status: StatusCode::UNPROCESSABLE_ENTITY,
                error: i18n::message(lang, MessageKey::PlanLimit).to_string(),
                details: None,
            },
            AppError::PaymentGateway(cause) => {
                tracing::error!("Falha no gateway de pagamento: {}", cause);
                ApiError {
                    status: StatusCode::BAD_GATEWAY,
                    error: i18n::message(lang, MessageKey::PaymentGateway).to_string(),
                    details: None,
                }
            }
            // Todos os outros erros (DatabaseError, InternalServerError...) viram 500.
            // O `tracing` loga a mensagem detalhada que `thiserror` nos deu.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                ApiError {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    error: i18n::message(lang, MessageKey::Internal).to_string(),
                    details: None,
                }
            }
        }
    }
}

// Nos middlewares ainda não há `Locale` extraído; respondemos no idioma padrão.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.to_api_error(&Locale::default()).into_response()
    }
}
