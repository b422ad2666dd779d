// src/main.rs

use axum::{
    Router,
    middleware as axum_middleware,
    routing::{delete, get, post, put},
};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;
mod sync;

use crate::config::AppState;
use crate::middleware::auth::auth_guard;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_target(false)
        .compact()
        .init();

    // .expect() é bom aqui: se a configuração falhar, a aplicação não deve iniciar.
    let app_state = AppState::new()
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    // Roda as migrações do SQLx na inicialização
    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .expect("Falha ao rodar as migrações do banco de dados.");

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    // Rotas de autenticação (públicas)
    let auth_routes = Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login));

    let user_routes = Router::new()
        .route("/me", get(handlers::auth::get_me))
        .route(
            "/",
            post(handlers::users::create_member).get(handlers::users::list_members),
        )
        .route("/{id}/role", put(handlers::users::update_role));

    let organization_routes = Router::new()
        .route("/me", get(handlers::organizations::get_my_organization))
        .route("/me/plan", get(handlers::organizations::get_effective_plan))
        .route("/settings", put(handlers::organizations::update_settings))
        .route("/directory", get(handlers::organizations::directory));

    let catalog_routes = Router::new()
        .route(
            "/job-types",
            post(handlers::catalog::create_job_type).get(handlers::catalog::list_job_types),
        )
        .route("/job-types/{id}", put(handlers::catalog::update_job_type))
        .route(
            "/sectors",
            post(handlers::catalog::create_sector).get(handlers::catalog::list_sectors),
        );

    let patient_routes = Router::new()
        .route(
            "/",
            post(handlers::patients::create_patient).get(handlers::patients::list_patients),
        )
        .route(
            "/{id}",
            put(handlers::patients::update_patient).delete(handlers::patients::delete_patient),
        );

    let appointment_routes = Router::new()
        .route(
            "/",
            post(handlers::patients::create_appointment)
                .get(handlers::patients::list_appointments),
        )
        .route("/{id}/done", put(handlers::patients::set_appointment_done));

    let job_routes = Router::new()
        .route(
            "/",
            post(handlers::jobs::create_job).get(handlers::jobs::list_jobs),
        )
        .route(
            "/{id}",
            get(handlers::jobs::get_job)
                .put(handlers::jobs::update_job)
                .delete(handlers::jobs::delete_job),
        )
        .route("/{id}/items", post(handlers::jobs::add_item))
        .route(
            "/items/{id}",
            put(handlers::jobs::update_item).delete(handlers::jobs::delete_item),
        )
        .route("/{id}/transition", post(handlers::jobs::transition_job))
        .route(
            "/{id}/messages",
            post(handlers::chat::post_message).get(handlers::chat::list_messages),
        );

    let message_routes = Router::new().route(
        "/{id}",
        put(handlers::chat::edit_message).delete(handlers::chat::delete_message),
    );

    let route_routes = Router::new()
        .route("/", get(handlers::routes::list_routes))
        .route("/jobs", post(handlers::routes::add_job_stop))
        .route("/pickups", post(handlers::routes::add_pickup))
        .route("/{id}", get(handlers::routes::get_route))
        .route("/{id}/reorder", put(handlers::routes::reorder_route))
        .route("/items/{id}", delete(handlers::routes::remove_stop));

    let billing_routes = Router::new()
        .route(
            "/batches",
            post(handlers::billing::create_batch).get(handlers::billing::list_batches),
        )
        .route("/batches/{id}/charge", post(handlers::billing::charge_batch));

    let commission_routes = Router::new()
        .route("/", get(handlers::billing::list_commissions))
        .route("/{id}/pay", post(handlers::billing::pay_commission));

    let alert_routes = Router::new()
        .route(
            "/",
            post(handlers::alerts::create_alert).get(handlers::alerts::list_alerts),
        )
        .route("/active", get(handlers::alerts::active_alert))
        .route("/{id}/ack", post(handlers::alerts::acknowledge_alert));

    let coupon_routes = Router::new()
        .route(
            "/",
            post(handlers::coupons::create_coupon).get(handlers::coupons::list_coupons),
        )
        .route("/{code}/validate", get(handlers::coupons::validate_coupon))
        .route("/{code}", delete(handlers::coupons::deactivate_coupon));

    let plan_routes = Router::new().route(
        "/",
        get(handlers::organizations::list_plans).post(handlers::organizations::create_plan),
    );

    let subscription_routes = Router::new().route("/", post(handlers::billing::subscribe));

    let sync_routes = Router::new().route("/stream", get(handlers::sync::stream_changes));

    let import_routes = Router::new()
        .route("/mapping", post(handlers::import::suggest_mapping))
        .route("/jobs", post(handlers::import::import_jobs));

    // Tudo aqui dentro exige Bearer token
    let protected_routes = Router::new()
        .nest("/api/users", user_routes)
        .nest("/api/organizations", organization_routes)
        .nest("/api/catalog", catalog_routes)
        .nest("/api/patients", patient_routes)
        .nest("/api/appointments", appointment_routes)
        .nest("/api/jobs", job_routes)
        .nest("/api/messages", message_routes)
        .nest("/api/routes", route_routes)
        .nest("/api/billing", billing_routes)
        .nest("/api/commissions", commission_routes)
        .nest("/api/alerts", alert_routes)
        .nest("/api/coupons", coupon_routes)
        .nest("/api/plans", plan_routes)
        .nest("/api/subscriptions", subscription_routes)
        .nest("/api/sync", sync_routes)
        .nest("/api/import", import_routes)
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Combina tudo no router principal.
    // O webhook do gateway fica fora do guard: quem chama é o gateway.
    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .route("/api/docs/openapi.json", get(docs::openapi_json))
        .route("/api/webhooks/gateway", post(handlers::billing::webhook))
        .nest("/api/auth", auth_routes)
        .merge(protected_routes)
        .with_state(app_state);

    // Inicia o servidor
    let addr = "0.0.0.0:3000";
    let listener = TcpListener::bind(addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr().unwrap());
    axum::serve(listener, app)
        .await
        .expect("Erro no servidor Axum");
}
