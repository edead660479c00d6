use serde::Deserialize;

/// Inbound event posted to the webhook by the messaging gateway.
#[derive(Clone, Debug, Deserialize)]
pub struct InboundMessage {
    pub from: String,
    pub body: String,
}
