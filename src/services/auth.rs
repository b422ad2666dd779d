// src/services/auth.rs

use bcrypt::{hash, verify};
use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{OrganizationRepository, UserRepository},
    models::auth::{Claims, Role, User},
    models::organization::{EffectivePlan, OrganizationKind},
};

#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    org_repo: OrganizationRepository,
    jwt_secret: String,
    pool: PgPool,
}

impl AuthService {
    pub fn new(
        user_repo: UserRepository,
        org_repo: OrganizationRepository,
        jwt_secret: String,
        pool: PgPool,
    ) -> Self {
        Self {
            user_repo,
            org_repo,
            jwt_secret,
            pool,
        }
    }

    /// Registro: cria a organização E o usuário dono numa transação só.
    /// Se qualquer passo falhar, nada fica pela metade.
    pub async fn register_owner(
        &self,
        organization_name: &str,
        organization_kind: OrganizationKind,
        email: &str,
        password: &str,
        full_name: &str,
    ) -> Result<String, AppError> {
        // 1. Hashing (fora da transação, não toca no banco)
        let password_clone = password.to_owned();
        let hashed_password =
            tokio::task::spawn_blocking(move || hash(&password_clone, bcrypt::DEFAULT_COST))
                .await
                .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;

        // --- INÍCIO DA TRANSAÇÃO ---
        let mut tx = self.pool.begin().await?;

        // 2. Cria a organização
        let org = self
            .org_repo
            .create(&mut *tx, organization_name, organization_kind)
            .await?;

        // 3. Cria o usuário dono (papel Admin)
        let owner = self
            .user_repo
            .create_user(
                &mut *tx,
                org.id,
                email,
                &hashed_password,
                full_name,
                Role::Admin,
                Decimal::ZERO,
            )
            .await?; // Se falhar aqui, a organização criada acima é desfeita!

        // 4. Grava o vínculo de dono na mesma transação
        self.org_repo.set_owner(&mut *tx, org.id, owner.id).await?;

        tx.commit().await?;
        // --- FIM DA TRANSAÇÃO ---

        tracing::info!("Organização '{}' registrada ({})", org.name, org.id);

        issue_token(owner.id, &self.jwt_secret)
    }

    /// Cria um membro adicional, respeitando o limite de usuários do plano.
    pub async fn create_member(
        &self,
        organization_id: Uuid,
        email: &str,
        password: &str,
        full_name: &str,
        role: Role,
        commission_percent: Decimal,
    ) -> Result<User, AppError> {
        let org = self
            .org_repo
            .find_by_id(organization_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Organização".into()))?;

        let plan = match org.plan_id {
            Some(plan_id) => match self.org_repo.find_plan(plan_id).await? {
                Some(p) => EffectivePlan::from_plan(&p),
                None => EffectivePlan::fallback(),
            },
            None => EffectivePlan::fallback(),
        };

        let current = self.user_repo.count_by_org(&self.pool, organization_id).await?;
        if current >= plan.max_users as i64 {
            return Err(AppError::PlanLimitReached);
        }

        let password_clone = password.to_owned();
        let hashed_password =
            tokio::task::spawn_blocking(move || hash(&password_clone, bcrypt::DEFAULT_COST))
                .await
                .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;

        self.user_repo
            .create_user(
                &self.pool,
                organization_id,
                email,
                &hashed_password,
                full_name,
                role,
                commission_percent,
            )
            .await
    }

    pub async fn login_user(&self, email: &str, password: &str) -> Result<String, AppError> {
        let user = self
            .user_repo
            .find_by_email(email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        if !user.is_active {
            return Err(AppError::InvalidCredentials);
        }

        let password_clone = password.to_owned();
        let password_hash_clone = user.password_hash.clone();

        // Executa a verificação em um thread separado
        let is_password_valid =
            tokio::task::spawn_blocking(move || verify(&password_clone, &password_hash_clone))
                .await
                .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;

        if !is_password_valid {
            return Err(AppError::InvalidCredentials);
        }

        issue_token(user.id, &self.jwt_secret)
    }

    pub async fn validate_token(&self, token: &str) -> Result<User, AppError> {
        let user_id = decode_token(token, &self.jwt_secret)?;

        self.user_repo
            .find_by_id(user_id)
            .await?
            .ok_or(AppError::UserNotFound)
    }
}

// ---
// Emissão e validação do JWT (funções livres: não dependem do banco)
// ---

pub fn issue_token(user_id: Uuid, jwt_secret: &str) -> Result<String, AppError> {
    let now = Utc::now();
    let expires_at = now + chrono::Duration::days(7);

    let claims = Claims {
        sub: user_id,
        exp: expires_at.timestamp() as usize,
        iat: now.timestamp() as usize,
    };

    Ok(encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_secret.as_ref()),
    )?)
}

pub fn decode_token(token: &str, jwt_secret: &str) -> Result<Uuid, AppError> {
    let validation = Validation::default();
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(jwt_secret.as_ref()),
        &validation,
    )
    .map_err(|_| AppError::InvalidToken)?;

    Ok(token_data.claims.sub)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_round_trip() {
        let user_id = Uuid::new_v4();
        let token = issue_token(user_id, "segredo-de-teste").unwrap();
        assert_eq!(decode_token(&token, "segredo-de-teste").unwrap(), user_id);
    }

    #[test]
    fn token_with_wrong_secret_is_rejected() {
        let token = issue_token(Uuid::new_v4(), "segredo-a").unwrap();
        assert!(matches!(
            decode_token(&token, "segredo-b"),
            Err(AppError::InvalidToken)
        ));
    }

    #[test]
    fn garbage_token_is_rejected() {
        assert!(matches!(
            decode_token("nao-e-um-jwt", "segredo"),
            Err(AppError::InvalidToken)
        ));
    }
}
