// src/services/chat_service.rs

use std::sync::Arc;

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{ChatRepository, JobRepository},
    models::chat::ChatMessage,
    sync::{ChangeEvent, ChangeOp, Collection, SyncHub},
};

#[derive(Clone)]
pub struct ChatService {
    repo: ChatRepository,
    job_repo: JobRepository,
    hub: Arc<SyncHub>,
}

impl ChatService {
    pub fn new(repo: ChatRepository, job_repo: JobRepository, hub: Arc<SyncHub>) -> Self {
        Self { repo, job_repo, hub }
    }

    pub async fn post_message(
        &self,
        organization_id: Uuid,
        sender_id: Uuid,
        job_id: Uuid,
        body: &str,
    ) -> Result<ChatMessage, AppError> {
        let job = self
            .job_repo
            .find_by_id(organization_id, job_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Trabalho".into()))?;

        if !job.chat_enabled {
            return Err(AppError::BadRequest(
                "O chat está desabilitado neste trabalho.".into(),
            ));
        }

        let message = self
            .repo
            .insert(organization_id, job_id, sender_id, body)
            .await?;

        self.hub
            .publish(
                organization_id,
                ChangeEvent::new(Collection::ChatMessages, message.id, ChangeOp::Created),
            )
            .await;

        Ok(message)
    }

    pub async fn list(
        &self,
        organization_id: Uuid,
        job_id: Uuid,
    ) -> Result<Vec<ChatMessage>, AppError> {
        self.repo.list_by_job(organization_id, job_id).await
    }

    // Só o autor edita a própria mensagem
    pub async fn edit_message(
        &self,
        organization_id: Uuid,
        actor_id: Uuid,
        message_id: Uuid,
        body: &str,
    ) -> Result<ChatMessage, AppError> {
        let existing = self
            .repo
            .find_by_id(organization_id, message_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Mensagem".into()))?;

        if existing.sender_id != actor_id {
            return Err(AppError::PermissionDenied("chat:edit".into()));
        }

        let message = self
            .repo
            .edit(organization_id, message_id, body)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Mensagem".into()))?;

        self.hub
            .publish(
                organization_id,
                ChangeEvent::new(Collection::ChatMessages, message_id, ChangeOp::Updated),
            )
            .await;

        Ok(message)
    }

    // Soft-delete: a linha fica para manter a ordem da conversa
    pub async fn delete_message(
        &self,
        organization_id: Uuid,
        actor_id: Uuid,
        message_id: Uuid,
    ) -> Result<(), AppError> {
        let existing = self
            .repo
            .find_by_id(organization_id, message_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Mensagem".into()))?;

        if existing.sender_id != actor_id {
            return Err(AppError::PermissionDenied("chat:delete".into()));
        }

        self.repo
            .soft_delete(organization_id, message_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Mensagem".into()))?;

        self.hub
            .publish(
                organization_id,
                ChangeEvent::new(Collection::ChatMessages, message_id, ChangeOp::Deleted),
            )
            .await;

        Ok(())
    }
}
