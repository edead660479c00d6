use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

use crate::repositories::assistant::{AssistantApi, DisabledAssistant, TextGenerator};
use crate::repositories::users::UserRepository;
use crate::settings::Settings;

mod conversation;
mod http;
mod messenger;
mod scheduler;

#[derive(Debug, thiserror::Error)]
enum ServiceError {
    #[error("Database error: {0}")]
    Database(String),
    #[error("Communication error: {0} - {1}")]
    Communication(String, String),
}

#[async_trait]
pub trait RequestHandler<T>: Send + Sync + 'static
where
    T: Send + 'static,
{
    async fn handle_request(&self, request: T);
}

#[async_trait]
pub trait Service<T, H>: Send + Sync + 'static
where
    T: Send + 'static,
    H: RequestHandler<T> + Clone + Send,
{
    async fn run(&mut self, handler: H, receiver: &mut mpsc::Receiver<T>) {
        while let Some(request) = receiver.recv().await {
            let handler = handler.clone();

            tokio::spawn(async move {
                handler.handle_request(request).await;
            });
        }
    }
}

pub async fn start_services(pool: PgPool, settings: Settings) -> Result<(), anyhow::Error> {
    let (conversation_tx, mut conversation_rx) = mpsc::channel(512);
    let (messenger_tx, mut messenger_rx) = mpsc::channel(512);

    let mut conversation_service = conversation::ConversationService::new();
    let mut messenger_service = messenger::MessengerService::new();

    let assistant: Arc<dyn TextGenerator> = if settings.assistant.enabled {
        log::info!("Assistant augmentation enabled ({}).", settings.assistant.model);
        Arc::new(AssistantApi::new(
            settings.assistant.url.clone(),
            settings.assistant.auth_token.clone(),
            settings.assistant.model.clone(),
        ))
    } else {
        log::info!("Assistant augmentation disabled.");
        Arc::new(DisabledAssistant)
    };

    println!("[*] Starting messenger service.");
    let messenger_url = settings.whatsapp.url.clone();
    let messenger_auth_token = settings.whatsapp.auth_token.clone();
    tokio::spawn(async move {
        messenger_service
            .run(
                messenger::MessengerRequestHandler::new(messenger_url, messenger_auth_token),
                &mut messenger_rx,
            )
            .await;
    });

    println!("[*] Starting conversation service.");
    let conversation_pool = pool.clone();
    let conversation_messenger_tx = messenger_tx.clone();
    let default_morning = settings.reminders.default_morning_time.clone();
    let default_evening = settings.reminders.default_evening_time.clone();
    let assistant_timeout = Duration::from_millis(settings.assistant.timeout_ms);
    tokio::spawn(async move {
        conversation_service
            .run(
                conversation::ConversationRequestHandler::new(
                    conversation_pool,
                    default_morning,
                    default_evening,
                    conversation_messenger_tx,
                    assistant,
                    assistant_timeout,
                ),
                &mut conversation_rx,
            )
            .await;
    });

    log::info!("Starting reminder scheduler.");
    let scheduler_repository = UserRepository::new(
        pool.clone(),
        settings.reminders.default_morning_time.clone(),
        settings.reminders.default_evening_time.clone(),
    );
    scheduler::ReminderScheduler::new(scheduler_repository, conversation_tx.clone()).start();

    println!("[*] Starting HTTP server.");
    http::start_http_server(
        settings.server.host,
        settings.server.port,
        settings.whatsapp.verify_token,
        settings.whatsapp.app_secret,
        conversation_tx,
    )
    .await?;

    Ok(())
}
