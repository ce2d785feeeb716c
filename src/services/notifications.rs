//! Background delivery of new-lead notifications.
//!
//! Submissions enqueue the persisted lead and return immediately. A single
//! worker pulls leads off a bounded channel and spawns one delivery task per
//! lead, so a slow SMTP relay never holds up a request and a panic inside a
//! delivery only loses that delivery.

use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::{JoinError, JoinHandle, JoinSet};
use tracing::{debug, error, info, warn};

use crate::clients::mailer::{MailTransport, OutboundMail};
use crate::models::lead::Lead;
use crate::services::lead_mail::LeadTemplates;

const SHUTDOWN_GRACE: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnqueueOutcome {
    Queued,
    /// Queue at capacity; the notification was dropped.
    Full,
    /// Queue already shut down; the notification was dropped.
    Closed,
}

pub struct NotificationQueue {
    sender: Mutex<Option<mpsc::Sender<Lead>>>,
    worker: tokio::sync::Mutex<Option<JoinHandle<()>>>,
}

impl NotificationQueue {
    /// Spawns the worker on the current runtime.
    #[must_use]
    pub fn start(
        transport: Arc<dyn MailTransport>,
        templates: LeadTemplates,
        capacity: usize,
    ) -> Self {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let worker = tokio::spawn(run_worker(rx, transport, Arc::new(templates)));

        Self {
            sender: Mutex::new(Some(tx)),
            worker: tokio::sync::Mutex::new(Some(worker)),
        }
    }

    /// Never blocks. The caller has already persisted the lead, so a dropped
    /// notification is only logged.
    pub fn enqueue(&self, lead: Lead) -> EnqueueOutcome {
        let sender = self
            .sender
            .lock()
            .ok()
            .and_then(|guard| guard.as_ref().cloned());

        let Some(sender) = sender else {
            warn!(lead_id = lead.id, "Notification queue closed, dropping notification");
            record_enqueue("closed");
            return EnqueueOutcome::Closed;
        };

        let lead_id = lead.id;
        match sender.try_send(lead) {
            Ok(()) => {
                debug!(lead_id, "Queued lead notification");
                record_enqueue("queued");
                EnqueueOutcome::Queued
            }
            Err(TrySendError::Full(_)) => {
                warn!(lead_id, "Notification queue full, dropping notification");
                record_enqueue("full");
                EnqueueOutcome::Full
            }
            Err(TrySendError::Closed(_)) => {
                warn!(lead_id, "Notification worker stopped, dropping notification");
                record_enqueue("closed");
                EnqueueOutcome::Closed
            }
        }
    }

    /// Stops accepting work and waits for queued and in-flight deliveries.
    pub async fn shutdown(&self) {
        if let Ok(mut guard) = self.sender.lock() {
            guard.take();
        }

        let Some(worker) = self.worker.lock().await.take() else {
            return;
        };

        info!("Draining notification queue");
        match tokio::time::timeout(SHUTDOWN_GRACE, worker).await {
            Ok(Ok(())) => info!("Notification queue drained"),
            Ok(Err(e)) => error!(error = %e, "Notification worker terminated abnormally"),
            Err(_) => warn!(
                "Notification queue did not drain within {}s",
                SHUTDOWN_GRACE.as_secs()
            ),
        }
    }
}

fn record_enqueue(outcome: &'static str) {
    metrics::counter!("lead_notifications_enqueued_total", "outcome" => outcome).increment(1);
}

async fn run_worker(
    mut rx: mpsc::Receiver<Lead>,
    transport: Arc<dyn MailTransport>,
    templates: Arc<LeadTemplates>,
) {
    let mut deliveries = JoinSet::new();

    loop {
        tokio::select! {
            next = rx.recv() => match next {
                Some(lead) => {
                    deliveries.spawn(deliver(lead, Arc::clone(&transport), Arc::clone(&templates)));
                }
                None => break,
            },
            Some(result) = deliveries.join_next(), if !deliveries.is_empty() => {
                log_join(result);
            }
        }
    }

    while let Some(result) = deliveries.join_next().await {
        log_join(result);
    }

    debug!("Notification worker stopped");
}

fn log_join(result: Result<(), JoinError>) {
    if let Err(e) = result {
        error!(error = %e, "Notification delivery task failed");
    }
}

/// Admin notification and submitter confirmation are independent.
async fn deliver(lead: Lead, transport: Arc<dyn MailTransport>, templates: Arc<LeadTemplates>) {
    let admin = templates.admin_notification(&lead);
    let confirmation = templates.confirmation(&lead);

    tokio::join!(
        send_one(transport.as_ref(), "admin", lead.id, &admin),
        send_one(transport.as_ref(), "confirmation", lead.id, &confirmation),
    );
}

async fn send_one(transport: &dyn MailTransport, kind: &'static str, lead_id: i32, mail: &OutboundMail) {
    match transport.send(mail).await {
        Ok(()) => {
            metrics::counter!("lead_notifications_total", "kind" => kind, "outcome" => "sent")
                .increment(1);
        }
        Err(e) => {
            metrics::counter!("lead_notifications_total", "kind" => kind, "outcome" => "failed")
                .increment(1);
            error!(lead_id, kind, to = %mail.to, error = %e, "Failed to send lead notification");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::mailer::MailError;
    use crate::config::MailConfig;
    use async_trait::async_trait;

    #[derive(Default)]
    struct Recorder {
        sent: Mutex<Vec<OutboundMail>>,
    }

    #[async_trait]
    impl MailTransport for Recorder {
        async fn send(&self, mail: &OutboundMail) -> Result<(), MailError> {
            self.sent.lock().unwrap().push(mail.clone());
            Ok(())
        }
    }

    struct Panicking;

    #[async_trait]
    impl MailTransport for Panicking {
        async fn send(&self, _mail: &OutboundMail) -> Result<(), MailError> {
            panic!("relay exploded");
        }
    }

    fn lead(id: i32) -> Lead {
        Lead {
            id,
            name: "Ravi".to_string(),
            email: "ravi@example.com".to_string(),
            phone: None,
            subject: None,
            message: "Quote please".to_string(),
            is_read: false,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    fn templates() -> LeadTemplates {
        LeadTemplates::new("Shop", &MailConfig::default())
    }

    #[tokio::test]
    async fn test_shutdown_drains_queued_leads() {
        let recorder = Arc::new(Recorder::default());
        let queue = NotificationQueue::start(recorder.clone(), templates(), 8);

        assert_eq!(queue.enqueue(lead(1)), EnqueueOutcome::Queued);
        assert_eq!(queue.enqueue(lead(2)), EnqueueOutcome::Queued);
        queue.shutdown().await;

        assert_eq!(recorder.sent.lock().unwrap().len(), 4);
        assert_eq!(queue.enqueue(lead(3)), EnqueueOutcome::Closed);
    }

    #[tokio::test]
    async fn test_panicking_transport_does_not_kill_worker() {
        let queue = NotificationQueue::start(Arc::new(Panicking), templates(), 8);

        assert_eq!(queue.enqueue(lead(1)), EnqueueOutcome::Queued);
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(queue.enqueue(lead(2)), EnqueueOutcome::Queued);

        queue.shutdown().await;
    }
}
