// src/config.rs

use std::sync::Arc;
use std::{env, time::Duration};

use sqlx::{PgPool, postgres::PgPoolOptions};

use crate::db::{
    AlertRepository, BillingRepository, CatalogRepository, ChatRepository, CouponRepository,
    JobRepository, OrganizationRepository, PatientRepository, RouteRepository, UserRepository,
};
use crate::services::{
    auth::AuthService,
    billing_service::BillingService,
    chat_service::ChatService,
    import_service::ImportService,
    job_service::JobService,
    payment::{HttpPaymentGateway, PaymentGateway},
    route_service::RouteService,
    subscription_service::SubscriptionService,
};
use crate::sync::SyncHub;

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub jwt_secret: String,
    pub sync_hub: Arc<SyncHub>,

    // Serviços (regras de negócio)
    pub auth_service: AuthService,
    pub job_service: JobService,
    pub route_service: RouteService,
    pub billing_service: BillingService,
    pub subscription_service: SubscriptionService,
    pub chat_service: ChatService,
    pub import_service: ImportService,

    // Repositórios acessados direto pelos handlers de CRUD simples
    pub user_repo: UserRepository,
    pub org_repo: OrganizationRepository,
    pub catalog_repo: CatalogRepository,
    pub patient_repo: PatientRepository,
    pub coupon_repo: CouponRepository,
    pub billing_repo: BillingRepository,
    pub alert_repo: AlertRepository,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL deve ser definida");
        let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET deve ser definido");

        // Sem as variáveis do gateway a aplicação sobe, mas cobranças reais
        // vão falhar: útil em desenvolvimento local.
        let gateway_base_url = env::var("GATEWAY_BASE_URL").unwrap_or_else(|_| {
            tracing::warn!("GATEWAY_BASE_URL ausente; usando o sandbox local");
            "http://localhost:8181".to_string()
        });
        let gateway_api_key = env::var("GATEWAY_API_KEY").unwrap_or_default();

        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        // --- Monta o gráfico de dependências ---
        let user_repo = UserRepository::new(db_pool.clone());
        let org_repo = OrganizationRepository::new(db_pool.clone());
        let catalog_repo = CatalogRepository::new(db_pool.clone());
        let patient_repo = PatientRepository::new(db_pool.clone());
        let job_repo = JobRepository::new(db_pool.clone());
        let route_repo = RouteRepository::new(db_pool.clone());
        let billing_repo = BillingRepository::new(db_pool.clone());
        let coupon_repo = CouponRepository::new(db_pool.clone());
        let chat_repo = ChatRepository::new(db_pool.clone());
        let alert_repo = AlertRepository::new(db_pool.clone());

        let sync_hub = Arc::new(SyncHub::new());
        let gateway: Arc<dyn PaymentGateway> =
            Arc::new(HttpPaymentGateway::new(gateway_base_url, gateway_api_key));

        let auth_service = AuthService::new(
            user_repo.clone(),
            org_repo.clone(),
            jwt_secret.clone(),
            db_pool.clone(),
        );
        let job_service = JobService::new(
            job_repo.clone(),
            billing_repo.clone(),
            user_repo.clone(),
            sync_hub.clone(),
        );
        let route_service =
            RouteService::new(route_repo, job_repo.clone(), sync_hub.clone());
        let billing_service = BillingService::new(
            billing_repo.clone(),
            job_repo.clone(),
            org_repo.clone(),
            user_repo.clone(),
            gateway.clone(),
            sync_hub.clone(),
            db_pool.clone(),
        );
        let subscription_service = SubscriptionService::new(
            org_repo.clone(),
            coupon_repo.clone(),
            gateway,
            sync_hub.clone(),
            db_pool.clone(),
        );
        let chat_service = ChatService::new(chat_repo, job_repo, sync_hub.clone());
        let import_service = ImportService::new(
            job_service.clone(),
            catalog_repo.clone(),
            user_repo.clone(),
            db_pool.clone(),
        );

        Ok(Self {
            db_pool,
            jwt_secret,
            sync_hub,
            auth_service,
            job_service,
            route_service,
            billing_service,
            subscription_service,
            chat_service,
            import_service,
            user_repo,
            org_repo,
            catalog_repo,
            patient_repo,
            coupon_repo,
            billing_repo,
            alert_repo,
        })
    }
}
