use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{RequestHandler, Service};
use crate::repositories::whatsapp::WhatsAppApi;

pub enum MessengerRequest {
    SendText { to: String, body: String },
}

#[derive(Clone)]
pub struct MessengerRequestHandler {
    api: Arc<WhatsAppApi>,
}

impl MessengerRequestHandler {
    pub fn new(url: String, auth_token: String) -> Self {
        let api = Arc::new(WhatsAppApi::new(url, auth_token));

        MessengerRequestHandler { api }
    }
}

#[async_trait]
impl RequestHandler<MessengerRequest> for MessengerRequestHandler {
    async fn handle_request(&self, request: MessengerRequest) {
        match request {
            MessengerRequest::SendText { to, body } => {
                // A failed send is logged and dropped; it never aborts the
                // conversation or a reminder batch.
                if let Err(e) = self.api.send_text(&to, &body).await {
                    log::error!("Messenger: failed to send to {}: {}", to, e);
                }
            }
        }
    }
}

pub struct MessengerService;

impl MessengerService {
    pub fn new() -> Self {
        MessengerService {}
    }
}

#[async_trait]
impl Service<MessengerRequest, MessengerRequestHandler> for MessengerService {
    // Sends are processed in order rather than spawned, so a multi-part
    // reply reaches the recipient in the sequence the router produced.
    async fn run(
        &mut self,
        handler: MessengerRequestHandler,
        receiver: &mut mpsc::Receiver<MessengerRequest>,
    ) {
        while let Some(request) = receiver.recv().await {
            handler.handle_request(request).await;
        }
    }
}
