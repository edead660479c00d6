use anyhow::bail;
use async_trait::async_trait;
use reqwest;
use serde_json::json;

/// Capability for the optional one-sentence augmentation at the end of a
/// dialogue. Injected into the router so tests can substitute a stub; a
/// local fallback always exists on the calling side.
#[async_trait]
pub trait TextGenerator: Send + Sync + 'static {
    async fn generate_short_text(
        &self,
        prompt: &str,
        context: &str,
    ) -> Result<String, anyhow::Error>;
}

pub struct AssistantApi {
    url: String,
    auth_token: String,
    model: String,
    client: reqwest::Client,
}

impl AssistantApi {
    pub fn new(url: String, auth_token: String, model: String) -> Self {
        Self {
            url,
            auth_token,
            model,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl TextGenerator for AssistantApi {
    async fn generate_short_text(
        &self,
        prompt: &str,
        context: &str,
    ) -> Result<String, anyhow::Error> {
        let payload = json!({
            "model": self.model,
            "max_tokens": 80,
            "messages": [
                { "role": "system", "content": prompt },
                { "role": "user", "content": context }
            ]
        });

        let response = self
            .client
            .post(format!("{}/v1/chat/completions", self.url))
            .bearer_auth(&self.auth_token)
            .json(&payload)
            .send()
            .await?
            .error_for_status()?;

        let body: serde_json::Value = response.json().await?;
        match body
            .pointer("/choices/0/message/content")
            .and_then(|content| content.as_str())
        {
            Some(text) => Ok(text.trim().to_string()),
            None => bail!("Assistant: bad response format."),
        }
    }
}

/// Stand-in when augmentation is switched off; every call falls back.
pub struct DisabledAssistant;

#[async_trait]
impl TextGenerator for DisabledAssistant {
    async fn generate_short_text(
        &self,
        _prompt: &str,
        _context: &str,
    ) -> Result<String, anyhow::Error> {
        bail!("Assistant augmentation is disabled.")
    }
}
