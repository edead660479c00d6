use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use sqlx::PgPool;
use tokio::sync::{mpsc, oneshot, Mutex};

use super::messenger::MessengerRequest;
use super::{RequestHandler, Service, ServiceError};
use crate::repositories::assistant::TextGenerator;
use crate::repositories::users::UserRepository;
use crate::router::{Router, RouterOutcome};

pub enum ConversationRequest {
    Inbound {
        identity: String,
        body: String,
        response: oneshot::Sender<Result<(), ServiceError>>,
    },
    MorningReminder {
        identity: String,
    },
    EveningReminder {
        identity: String,
    },
}

#[derive(Clone)]
pub struct ConversationRequestHandler {
    repository: UserRepository,
    messenger_channel: mpsc::Sender<MessengerRequest>,
    router: Arc<Router>,
    // One mutex per identity: a scheduler tick and an inbound reply racing
    // for the same record must not interleave their read-modify-save.
    locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
}

impl ConversationRequestHandler {
    pub fn new(
        sql_conn: PgPool,
        default_morning_time: String,
        default_evening_time: String,
        messenger_channel: mpsc::Sender<MessengerRequest>,
        assistant: Arc<dyn TextGenerator>,
        assistant_timeout: Duration,
    ) -> Self {
        let repository = UserRepository::new(sql_conn, default_morning_time, default_evening_time);
        let router = Arc::new(Router::new(assistant, assistant_timeout));

        ConversationRequestHandler {
            repository,
            messenger_channel,
            router,
            locks: Arc::new(DashMap::new()),
        }
    }

    fn identity_lock(&self, identity: &str) -> Arc<Mutex<()>> {
        self.locks
            .entry(identity.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    async fn handle_inbound(&self, identity: &str, body: &str) -> Result<(), ServiceError> {
        let lock = self.identity_lock(identity);
        let guard = lock.lock().await;

        let (mut user, log) = self
            .repository
            .load_or_create(identity)
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))?;

        let now = chrono::Local::now();
        let outcome = self
            .router
            .handle_message(&mut user, &log, body, now.date_naive(), now.time())
            .await;

        self.repository
            .save_turn(&user, outcome.patch.as_ref(), outcome.clear_log)
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))?;

        drop(guard);
        self.deliver(identity, outcome).await;
        Ok(())
    }

    async fn handle_morning_reminder(&self, identity: &str) -> Result<(), ServiceError> {
        let lock = self.identity_lock(identity);
        let guard = lock.lock().await;

        let (mut user, _log) = self
            .repository
            .load_or_create(identity)
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))?;

        let today = chrono::Local::now().date_naive();
        if let Some(outcome) = self.router.morning_reminder(&mut user, today) {
            self.repository
                .save_turn(&user, None, false)
                .await
                .map_err(|e| ServiceError::Database(e.to_string()))?;

            drop(guard);
            self.deliver(identity, outcome).await;
        }
        Ok(())
    }

    async fn handle_evening_reminder(&self, identity: &str) -> Result<(), ServiceError> {
        let lock = self.identity_lock(identity);
        let guard = lock.lock().await;

        let (mut user, _log) = self
            .repository
            .load_or_create(identity)
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))?;

        let today = chrono::Local::now().date_naive();
        if let Some(outcome) = self.router.evening_reminder(&mut user, today) {
            self.repository
                .save_turn(&user, None, false)
                .await
                .map_err(|e| ServiceError::Database(e.to_string()))?;

            drop(guard);
            self.deliver(identity, outcome).await;
        }
        Ok(())
    }

    async fn deliver(&self, identity: &str, outcome: RouterOutcome) {
        for body in outcome.replies {
            let request = MessengerRequest::SendText {
                to: identity.to_string(),
                body,
            };
            if let Err(e) = self.messenger_channel.send(request).await {
                let error = ServiceError::Communication("Messenger".to_string(), e.to_string());
                log::error!("Conversation: outbound for {} dropped: {}", identity, error);
            }
        }
    }
}

#[async_trait]
impl RequestHandler<ConversationRequest> for ConversationRequestHandler {
    async fn handle_request(&self, request: ConversationRequest) {
        match request {
            ConversationRequest::Inbound {
                identity,
                body,
                response,
            } => {
                let result = self.handle_inbound(&identity, &body).await;
                if let Err(e) = &result {
                    log::error!("Conversation: inbound from {} failed: {}", identity, e);
                }
                let _ = response.send(result);
            }
            ConversationRequest::MorningReminder { identity } => {
                if let Err(e) = self.handle_morning_reminder(&identity).await {
                    log::error!("Conversation: morning reminder for {} failed: {}", identity, e);
                }
            }
            ConversationRequest::EveningReminder { identity } => {
                if let Err(e) = self.handle_evening_reminder(&identity).await {
                    log::error!("Conversation: evening reminder for {} failed: {}", identity, e);
                }
            }
        }
    }
}

pub struct ConversationService;

impl ConversationService {
    pub fn new() -> Self {
        ConversationService {}
    }
}

#[async_trait]
impl Service<ConversationRequest, ConversationRequestHandler> for ConversationService {}
