use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use hmac::{Hmac, Mac};
use serde::Deserialize;
use serde_json::json;
use sha2::Sha256;
use tokio::sync::{mpsc, oneshot};
use tower_http::trace::TraceLayer;

use super::conversation::ConversationRequest;
use crate::models::messaging::InboundMessage;

#[derive(Clone)]
struct AppState {
    conversation_channel: mpsc::Sender<ConversationRequest>,
    verify_token: String,
    app_secret: Option<String>,
}

#[derive(Deserialize)]
struct VerifyParams {
    #[serde(rename = "hub.mode")]
    mode: String,
    #[serde(rename = "hub.verify_token")]
    verify_token: String,
    #[serde(rename = "hub.challenge")]
    challenge: String,
}

/// Gateway subscription handshake: echo the challenge when the token
/// matches.
async fn verify_webhook(
    State(state): State<AppState>,
    Query(params): Query<VerifyParams>,
) -> impl IntoResponse {
    if params.mode == "subscribe" && params.verify_token == state.verify_token {
        (StatusCode::OK, params.challenge)
    } else {
        (StatusCode::FORBIDDEN, String::new())
    }
}

async fn receive_message(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    if let Some(secret) = &state.app_secret {
        if !signature_valid(secret, &headers, &body) {
            return (
                StatusCode::UNAUTHORIZED,
                Json(json!({"description": "Invalid signature."})),
            );
        }
    }

    let message: InboundMessage = match serde_json::from_slice(&body) {
        Ok(message) => message,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({"description": format!("Malformed payload: {}", e)})),
            );
        }
    };

    let (conversation_tx, conversation_rx) = oneshot::channel();

    let send_result = state
        .conversation_channel
        .send(ConversationRequest::Inbound {
            identity: message.from,
            body: message.body,
            response: conversation_tx,
        })
        .await;

    if let Err(e) = send_result {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"description": format!("Failed to process request: {}", e)})),
        );
    }

    // A 500 here makes the gateway redeliver; the conversation step is
    // idempotent against that.
    match conversation_rx.await {
        Ok(Ok(())) => (StatusCode::OK, Json(json!({"status": "received"}))),
        Ok(Err(_service_error)) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"description": "Internal server error."})),
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"description": format!("Failed to receive response: {}", e)})),
        ),
    }
}

fn signature_valid(secret: &str, headers: &HeaderMap, body: &[u8]) -> bool {
    let Some(header) = headers
        .get("x-hub-signature-256")
        .and_then(|value| value.to_str().ok())
    else {
        return false;
    };
    let Some(expected) = header.strip_prefix("sha256=") else {
        return false;
    };
    let Ok(mut mac) = Hmac::<Sha256>::new_from_slice(secret.as_bytes()) else {
        return false;
    };

    mac.update(body);
    hex::encode(mac.finalize().into_bytes()) == expected.to_lowercase()
}

pub async fn start_http_server(
    host: String,
    port: u16,
    verify_token: String,
    app_secret: Option<String>,
    conversation_channel: mpsc::Sender<ConversationRequest>,
) -> Result<(), anyhow::Error> {
    let app_state = AppState {
        conversation_channel,
        verify_token,
        app_secret,
    };

    let app = Router::new()
        .route("/webhook", post(receive_message).get(verify_webhook))
        .route("/health", get(|| async { "OK" }))
        .with_state(app_state)
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(format!("{}:{}", host, port)).await?;
    println!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn signed_headers(secret: &str, body: &[u8]) -> HeaderMap {
        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(body);
        let signature = format!("sha256={}", hex::encode(mac.finalize().into_bytes()));

        let mut headers = HeaderMap::new();
        headers.insert(
            "x-hub-signature-256",
            HeaderValue::from_str(&signature).unwrap(),
        );
        headers
    }

    #[test]
    fn accepts_a_correctly_signed_body() {
        let body = br#"{"from":"+15550100","body":"yes"}"#;
        let headers = signed_headers("top-secret", body);
        assert!(signature_valid("top-secret", &headers, body));
    }

    #[test]
    fn rejects_a_tampered_body() {
        let body = br#"{"from":"+15550100","body":"yes"}"#;
        let headers = signed_headers("top-secret", body);
        assert!(!signature_valid("top-secret", &headers, b"something else"));
    }

    #[test]
    fn rejects_a_missing_or_malformed_header() {
        let body = b"payload";
        assert!(!signature_valid("top-secret", &HeaderMap::new(), body));

        let mut headers = HeaderMap::new();
        headers.insert(
            "x-hub-signature-256",
            HeaderValue::from_static("md5=abcdef"),
        );
        assert!(!signature_valid("top-secret", &headers, body));
    }
}
