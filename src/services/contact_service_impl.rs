//! `SeaORM` implementation of the `ContactService` trait.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

use crate::db::Store;
use crate::models::lead::{Lead, LeadSummary};
use crate::services::contact_service::{ContactError, ContactService, ContactSubmission};
use crate::services::notifications::NotificationQueue;

pub struct SeaOrmContactService {
    store: Store,
    notifications: Arc<NotificationQueue>,
}

impl SeaOrmContactService {
    #[must_use]
    pub const fn new(store: Store, notifications: Arc<NotificationQueue>) -> Self {
        Self {
            store,
            notifications,
        }
    }
}

#[async_trait]
impl ContactService for SeaOrmContactService {
    async fn submit(&self, submission: ContactSubmission) -> Result<LeadSummary, ContactError> {
        let new_lead = submission.validate()?;

        let lead = self.store.create_lead(new_lead).await?;
        info!(lead_id = lead.id, email = %lead.email, "Contact submission saved");

        let summary = LeadSummary::from(&lead);
        self.notifications.enqueue(lead);

        Ok(summary)
    }

    async fn list_all(&self) -> Result<Vec<Lead>, ContactError> {
        Ok(self.store.list_leads().await?)
    }

    async fn get_by_id(&self, id: i32) -> Result<Lead, ContactError> {
        self.store
            .get_lead(id)
            .await?
            .ok_or(ContactError::NotFound)
    }

    async fn delete(&self, id: i32) -> Result<bool, ContactError> {
        let deleted = self.store.delete_lead(id).await?;
        if deleted {
            info!(lead_id = id, "Contact deleted");
        }
        Ok(deleted)
    }

    async fn mark_read(&self, id: i32) -> Result<bool, ContactError> {
        Ok(self.store.mark_lead_read(id).await?)
    }
}
