use anyhow::bail;
use reqwest;
use serde_json::json;

/// Outbound text transport. Delivery is fire-and-forget from the caller's
/// perspective; a non-2xx answer is an error for the log, nothing more.
pub struct WhatsAppApi {
    url: String,
    auth_token: String,
    client: reqwest::Client,
}

impl WhatsAppApi {
    pub fn new(url: String, auth_token: String) -> Self {
        Self {
            url,
            auth_token,
            client: reqwest::Client::new(),
        }
    }

    pub async fn send_text(&self, to: &str, body: &str) -> Result<(), anyhow::Error> {
        let payload = json!({
            "messaging_product": "whatsapp",
            "recipient_type": "individual",
            "to": to,
            "type": "text",
            "text": {
                "preview_url": false,
                "body": body
            }
        });

        let response = self
            .client
            .post(format!("{}/messages", self.url))
            .bearer_auth(&self.auth_token)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            bail!("WhatsApp: send rejected with {}: {}", status, detail);
        }

        Ok(())
    }
}
