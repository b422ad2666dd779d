// src/middleware/rbac.rs

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
};
use std::marker::PhantomData;

use crate::{common::error::ApiError, models::auth::{Role, User}};

/// As capacidades do sistema. A checagem acontece aqui, no servidor -
/// esconder botão no frontend não é controle de acesso.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    JobsRead,
    JobsWrite,
    RoutesManage,
    BillingManage,
    CommissionsManage,
    UsersManage,
    CatalogManage,
    PatientsManage,
    AlertsManage,
    ChatParticipate,
    OrgSettingsManage,
    // Coleções globais da plataforma (planos, cupons)
    PlatformManage,
}

impl Capability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::JobsRead => "jobs:read",
            Capability::JobsWrite => "jobs:write",
            Capability::RoutesManage => "routes:manage",
            Capability::BillingManage => "billing:manage",
            Capability::CommissionsManage => "commissions:manage",
            Capability::UsersManage => "users:manage",
            Capability::CatalogManage => "catalog:manage",
            Capability::PatientsManage => "patients:manage",
            Capability::AlertsManage => "alerts:manage",
            Capability::ChatParticipate => "chat:participate",
            Capability::OrgSettingsManage => "org:settings",
            Capability::PlatformManage => "platform:manage",
        }
    }
}

// Tabela fixa papel -> capacidades. Um papel novo entra aqui e em nenhum
// outro lugar.
impl Role {
    pub fn capabilities(&self) -> &'static [Capability] {
        use Capability::*;
        match self {
            Role::SuperAdmin => &[
                JobsRead, JobsWrite, RoutesManage, BillingManage, CommissionsManage,
                UsersManage, CatalogManage, PatientsManage, AlertsManage,
                ChatParticipate, OrgSettingsManage, PlatformManage,
            ],
            Role::Admin => &[
                JobsRead, JobsWrite, RoutesManage, BillingManage, CommissionsManage,
                UsersManage, CatalogManage, PatientsManage, AlertsManage,
                ChatParticipate, OrgSettingsManage,
            ],
            Role::Manager => &[
                JobsRead, JobsWrite, RoutesManage, CommissionsManage, CatalogManage,
                PatientsManage, AlertsManage, ChatParticipate,
            ],
            Role::Collaborator => &[JobsRead, JobsWrite, ChatParticipate],
            Role::Client => &[JobsRead, ChatParticipate],
        }
    }

    pub fn can(&self, capability: Capability) -> bool {
        self.capabilities().contains(&capability)
    }
}

/// 1. O Trait que define o que é uma Capacidade exigida
pub trait CapabilityDef: Send + Sync + 'static {
    fn capability() -> Capability;
}

/// 2. O Extractor (Guardião)
pub struct RequireCapability<T>(pub PhantomData<T>);

// 3. Implementação do FromRequestParts
impl<T, S> FromRequestParts<S> for RequireCapability<T>
where
    T: CapabilityDef,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // A. Extrai Usuário (o auth_guard já o colocou nos extensions)
        let user = parts.extensions.get::<User>().ok_or(ApiError {
            status: StatusCode::UNAUTHORIZED,
            error: "Usuário não autenticado".into(),
            details: None,
        })?;

        // B. Consulta a tabela estática de capacidades do papel
        let required = T::capability();

        if !user.role.can(required) {
            return Err(ApiError {
                status: StatusCode::FORBIDDEN,
                error: format!(
                    "Você precisa da permissão '{}' para realizar esta ação.",
                    required.as_str()
                ),
                details: None,
            });
        }

        Ok(RequireCapability(PhantomData))
    }
}

// ---
// DEFINIÇÃO DAS CAPACIDADES (TIPOS)
// ---

macro_rules! capability_marker {
    ($name:ident, $cap:ident) => {
        pub struct $name;
        impl CapabilityDef for $name {
            fn capability() -> Capability {
                Capability::$cap
            }
        }
    };
}

capability_marker!(CapJobsRead, JobsRead);
capability_marker!(CapJobsWrite, JobsWrite);
capability_marker!(CapRoutesManage, RoutesManage);
capability_marker!(CapBillingManage, BillingManage);
capability_marker!(CapCommissionsManage, CommissionsManage);
capability_marker!(CapUsersManage, UsersManage);
capability_marker!(CapCatalogManage, CatalogManage);
capability_marker!(CapPatientsManage, PatientsManage);
capability_marker!(CapAlertsManage, AlertsManage);
capability_marker!(CapChatParticipate, ChatParticipate);
capability_marker!(CapOrgSettingsManage, OrgSettingsManage);
capability_marker!(CapPlatformManage, PlatformManage);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_manages_billing_but_not_platform() {
        assert!(Role::Admin.can(Capability::BillingManage));
        assert!(!Role::Admin.can(Capability::PlatformManage));
    }

    #[test]
    fn client_only_reads_and_chats() {
        assert!(Role::Client.can(Capability::JobsRead));
        assert!(Role::Client.can(Capability::ChatParticipate));
        assert!(!Role::Client.can(Capability::JobsWrite));
        assert!(!Role::Client.can(Capability::BillingManage));
        assert!(!Role::Client.can(Capability::UsersManage));
    }

    #[test]
    fn collaborator_writes_jobs_but_does_not_manage_routes() {
        assert!(Role::Collaborator.can(Capability::JobsWrite));
        assert!(!Role::Collaborator.can(Capability::RoutesManage));
    }

    #[test]
    fn super_admin_has_every_capability() {
        use Capability::*;
        for cap in [
            JobsRead, JobsWrite, RoutesManage, BillingManage, CommissionsManage,
            UsersManage, CatalogManage, PatientsManage, AlertsManage,
            ChatParticipate, OrgSettingsManage, PlatformManage,
        ] {
            assert!(Role::SuperAdmin.can(cap), "faltou {:?}", cap);
        }
    }
}
