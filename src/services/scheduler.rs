use chrono::{DateTime, Local};
use futures_util::future::join_all;
use tokio::sync::mpsc;

use super::conversation::ConversationRequest;
use crate::repositories::users::UserRepository;
use crate::utils::time::current_hhmm;

/// Scans for users whose configured reminder time matches the current
/// minute and pushes them into the conversation service. Idempotency
/// against duplicate ticks lives in the per-user notified marks, which the
/// conversation handler re-checks under the identity lock.
pub struct ReminderScheduler {
    repository: UserRepository,
    conversation_channel: mpsc::Sender<ConversationRequest>,
}

impl ReminderScheduler {
    pub fn new(
        repository: UserRepository,
        conversation_channel: mpsc::Sender<ConversationRequest>,
    ) -> Self {
        Self {
            repository,
            conversation_channel,
        }
    }

    pub fn start(self) {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(std::time::Duration::from_secs(60));

            loop {
                interval.tick().await;

                match self.tick(Local::now()).await {
                    Ok(queued) => {
                        if queued > 0 {
                            log::info!("Scheduler: queued {} reminder(s).", queued);
                        }
                    }
                    Err(e) => {
                        log::error!("Scheduler: tick failed: {}", e);
                    }
                }
            }
        });
    }

    async fn tick(&self, now: DateTime<Local>) -> Result<usize, anyhow::Error> {
        let current_time = current_hhmm(now);
        let today = now.date_naive();

        let mut due = Vec::new();
        for identity in self.repository.find_due_morning(&current_time, today).await? {
            due.push(ConversationRequest::MorningReminder { identity });
        }
        for identity in self.repository.find_due_evening(&current_time, today).await? {
            due.push(ConversationRequest::EveningReminder { identity });
        }

        let queued = due.len();
        join_all(due.into_iter().map(|request| self.notify(request))).await;
        Ok(queued)
    }

    // One user's queueing failure must not starve the rest of the batch.
    async fn notify(&self, request: ConversationRequest) {
        let identity = match &request {
            ConversationRequest::MorningReminder { identity }
            | ConversationRequest::EveningReminder { identity } => identity.clone(),
            ConversationRequest::Inbound { identity, .. } => identity.clone(),
        };

        if let Err(e) = self.conversation_channel.send(request).await {
            log::error!("Scheduler: could not queue reminder for {}: {}", identity, e);
        }
    }
}
