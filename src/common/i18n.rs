// src/common/i18n.rs

// Catálogo estático de mensagens de erro. O produto nasceu em português;
// "en" cobre integrações que mandam Accept-Language.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKey {
    Validation,
    EmailAlreadyExists,
    InvalidCredentials,
    InvalidToken,
    UserNotFound,
    ResourceNotFound,
    PermissionDenied,
    CouponExhausted,
    CouponNotYetValid,
    CouponExpired,
    CouponInactive,
    InvalidTransition,
    PlanLimit,
    PaymentGateway,
    Internal,
}

pub fn message(lang: &str, key: MessageKey) -> &'static str {
    let pt = lang == "pt";
    match key {
        MessageKey::Validation => {
            if pt { "Um ou mais campos são inválidos." } else { "One or more fields are invalid." }
        }
        MessageKey::EmailAlreadyExists => {
            if pt { "Este e-mail já está em uso." } else { "This e-mail is already in use." }
        }
        MessageKey::InvalidCredentials => {
            if pt { "E-mail ou senha inválidos." } else { "Invalid e-mail or password." }
        }
        MessageKey::InvalidToken => {
            if pt { "Token de autenticação inválido ou ausente." } else { "Missing or invalid authentication token." }
        }
        MessageKey::UserNotFound => {
            if pt { "Usuário não encontrado." } else { "User not found." }
        }
        MessageKey::ResourceNotFound => {
            if pt { "Recurso não encontrado." } else { "Resource not found." }
        }
        MessageKey::PermissionDenied => {
            if pt { "Você não tem permissão para realizar esta ação." } else { "You do not have permission to perform this action." }
        }
        MessageKey::CouponExhausted => {
            if pt { "Este cupom já atingiu o limite de usos." } else { "This coupon has reached its usage limit." }
        }
        MessageKey::CouponNotYetValid => {
            if pt { "Este cupom ainda não está valendo." } else { "This coupon is not valid yet." }
        }
        MessageKey::CouponExpired => {
            if pt { "Este cupom está vencido." } else { "This coupon has expired." }
        }
        MessageKey::CouponInactive => {
            if pt { "Este cupom foi desativado." } else { "This coupon has been deactivated." }
        }
        MessageKey::InvalidTransition => {
            if pt { "Esta mudança de status não é permitida." } else { "This status change is not allowed." }
        }
        MessageKey::PlanLimit => {
            if pt { "O seu plano atual não permite esta operação. Faça upgrade." } else { "Your current plan does not allow this operation. Upgrade to continue." }
        }
        MessageKey::PaymentGateway => {
            if pt { "Não foi possível concluir a operação com o gateway de pagamento. Tente novamente." } else { "The payment gateway could not complete the operation. Try again." }
        }
        MessageKey::Internal => {
            if pt { "Ocorreu um erro inesperado." } else { "An unexpected error occurred." }
        }
    }
}
