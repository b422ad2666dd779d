// src/sync/mod.rs
//
// O feed de mudanças por organização. Cada mutação confirmada publica um
// ChangeEvent no canal do tenant; os clientes consomem via SSE e re-buscam
// a coleção afetada. O canal nasce sob demanda e é recolhido quando o
// último assinante desconecta: assinar de novo nunca vaza canal antigo.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use tokio::sync::{RwLock, broadcast};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum Collection {
    Jobs,
    JobTypes,
    Sectors,
    Users,
    Alerts,
    Patients,
    Appointments,
    Routes,
    ChatMessages,
    Commissions,
    BillingBatches,
    Organizations,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Jobs => "jobs",
            Collection::JobTypes => "jobTypes",
            Collection::Sectors => "sectors",
            Collection::Users => "users",
            Collection::Alerts => "alerts",
            Collection::Patients => "patients",
            Collection::Appointments => "appointments",
            Collection::Routes => "routes",
            Collection::ChatMessages => "chatMessages",
            Collection::Commissions => "commissions",
            Collection::BillingBatches => "billingBatches",
            Collection::Organizations => "organizations",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum ChangeOp {
    Created,
    Updated,
    Deleted,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangeEvent {
    pub collection: Collection,
    pub entity_id: Uuid,
    pub op: ChangeOp,
    pub at: DateTime<Utc>,
}

impl ChangeEvent {
    pub fn new(collection: Collection, entity_id: Uuid, op: ChangeOp) -> Self {
        Self {
            collection,
            entity_id,
            op,
            at: Utc::now(),
        }
    }
}

// Assinantes lentos perdem a janela e re-buscam o snapshot; não seguramos
// histórico além disso.
const CHANNEL_CAPACITY: usize = 256;

pub struct SyncHub {
    channels: RwLock<HashMap<Uuid, broadcast::Sender<ChangeEvent>>>,
}

impl SyncHub {
    pub fn new() -> Self {
        Self {
            channels: RwLock::new(HashMap::new()),
        }
    }

    /// Entra no feed da organização. Reaproveita o canal existente: assinar
    /// duas vezes (troca de tenant, reconexão) nunca duplica nem vaza canais.
    pub async fn subscribe(&self, organization_id: Uuid) -> broadcast::Receiver<ChangeEvent> {
        let mut channels = self.channels.write().await;
        let sender = channels
            .entry(organization_id)
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0);
        sender.subscribe()
    }

    /// Publica um evento para a organização. Sem assinantes o evento é
    /// descartado e o canal recolhido; publicar nunca falha para o chamador.
    pub async fn publish(&self, organization_id: Uuid, event: ChangeEvent) {
        let sender = {
            let channels = self.channels.read().await;
            channels.get(&organization_id).cloned()
        };

        let Some(sender) = sender else {
            return;
        };

        if sender.send(event).is_err() {
            // Todos os receivers já caíram; remove o canal órfão.
            let mut channels = self.channels.write().await;
            if channels
                .get(&organization_id)
                .is_some_and(|s| s.receiver_count() == 0)
            {
                channels.remove(&organization_id);
                tracing::debug!(
                    "feed da organização {} recolhido (sem assinantes)",
                    organization_id
                );
            }
        }
    }

    pub async fn channel_count(&self) -> usize {
        self.channels.read().await.len()
    }
}

impl Default for SyncHub {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscriber_receives_published_event() {
        let hub = SyncHub::new();
        let org = Uuid::new_v4();

        let mut rx = hub.subscribe(org).await;
        let job_id = Uuid::new_v4();
        hub.publish(org, ChangeEvent::new(Collection::Jobs, job_id, ChangeOp::Created))
            .await;

        let event = rx.recv().await.expect("evento deveria chegar");
        assert_eq!(event.collection, Collection::Jobs);
        assert_eq!(event.entity_id, job_id);
        assert_eq!(event.op, ChangeOp::Created);
    }

    #[tokio::test]
    async fn organizations_are_isolated() {
        let hub = SyncHub::new();
        let org_a = Uuid::new_v4();
        let org_b = Uuid::new_v4();

        let mut rx_a = hub.subscribe(org_a).await;
        let mut rx_b = hub.subscribe(org_b).await;

        hub.publish(
            org_a,
            ChangeEvent::new(Collection::Alerts, Uuid::new_v4(), ChangeOp::Created),
        )
        .await;

        assert!(rx_a.try_recv().is_ok());
        assert!(rx_b.try_recv().is_err(), "org B não pode ver eventos da org A");
    }

    #[tokio::test]
    async fn resubscribing_reuses_the_channel() {
        let hub = SyncHub::new();
        let org = Uuid::new_v4();

        let mut rx1 = hub.subscribe(org).await;
        let mut rx2 = hub.subscribe(org).await;
        assert_eq!(hub.channel_count().await, 1);

        hub.publish(
            org,
            ChangeEvent::new(Collection::Routes, Uuid::new_v4(), ChangeOp::Updated),
        )
        .await;

        assert!(rx1.try_recv().is_ok());
        assert!(rx2.try_recv().is_ok());
    }

    #[tokio::test]
    async fn orphan_channel_is_reclaimed_on_publish() {
        let hub = SyncHub::new();
        let org = Uuid::new_v4();

        let rx = hub.subscribe(org).await;
        drop(rx);
        assert_eq!(hub.channel_count().await, 1);

        hub.publish(
            org,
            ChangeEvent::new(Collection::Jobs, Uuid::new_v4(), ChangeOp::Deleted),
        )
        .await;
        assert_eq!(hub.channel_count().await, 0);
    }

    #[tokio::test]
    async fn publishing_to_unknown_organization_is_a_noop() {
        let hub = SyncHub::new();
        hub.publish(
            Uuid::new_v4(),
            ChangeEvent::new(Collection::Jobs, Uuid::new_v4(), ChangeOp::Created),
        )
        .await;
        assert_eq!(hub.channel_count().await, 0);
    }
}
