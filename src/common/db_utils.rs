use crate::common::error::AppError;
use crate::config::AppState;
use crate::middleware::auth::AuthenticatedUser;
use crate::middleware::tenancy::OrgContext;

// ---
// Helper RLS: A "Chave" para o Banco de Dados
// ---
/// Adquire uma conexão da pool e define as variáveis RLS (a "chave").
/// Toda query que rodar nessa conexão enxerga apenas as linhas da
/// organização da requisição.
pub(crate) async fn get_scoped_connection(
    app_state: &AppState,
    org: &OrgContext,
    user: &AuthenticatedUser,
) -> Result<sqlx::pool::PoolConnection<sqlx::Postgres>, AppError> {
    // 1. Adquire conexão
    // O operador '?' converte automaticamente sqlx::Error -> AppError::DatabaseError
    let mut conn = app_state.db_pool.acquire().await?;

    // 2. Define a organização
    // is_local = false: vale para a sessão inteira; a próxima requisição que
    // reutilizar a conexão redefine antes de qualquer query.
    sqlx::query("SELECT set_config('app.organization_id', $1, false)")
        .bind(org.0.to_string())
        .execute(&mut *conn)
        .await?;

    // 3. Define o usuário
    sqlx::query("SELECT set_config('app.user_id', $1, false)")
        .bind(user.0.id.to_string())
        .execute(&mut *conn)
        .await?;

    Ok(conn)
}
