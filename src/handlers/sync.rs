// src/handlers/sync.rs

use std::convert::Infallible;

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use tokio_stream::{Stream, StreamExt, wrappers::BroadcastStream};

use crate::{
    config::AppState,
    middleware::{auth::AuthenticatedUser, tenancy::OrgContext},
};

// GET /api/sync/stream: o feed de mudanças da organização, via SSE.
// O cliente mantém o espelho local: a cada evento, re-busca a coleção
// afetada. Quem ficar para trás perde a janela e recomeça do snapshot.
pub async fn stream_changes(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    org: OrgContext,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let receiver = app_state.sync_hub.subscribe(org.0).await;

    tracing::debug!(
        "usuário {} entrou no feed da organização {}",
        user.0.id,
        org.0
    );

    let stream = BroadcastStream::new(receiver).filter_map(|result| match result {
        Ok(change) => Event::default()
            .event(change.collection.as_str())
            .json_data(&change)
            .ok()
            .map(Ok),
        // Assinante lento: descarta o que perdeu e segue do próximo evento
        Err(_) => None,
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
