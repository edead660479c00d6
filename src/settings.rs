use config::{Config, ConfigError, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Postgres {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize)]
pub struct WhatsApp {
    pub url: String,
    pub auth_token: String,
    pub verify_token: String,
    pub app_secret: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Assistant {
    pub enabled: bool,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub auth_token: String,
    #[serde(default = "default_assistant_model")]
    pub model: String,
    #[serde(default = "default_assistant_timeout_ms")]
    pub timeout_ms: u64,
}

#[derive(Debug, Deserialize)]
pub struct Reminders {
    pub default_morning_time: String,
    pub default_evening_time: String,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub postgres: Postgres,
    pub server: Server,
    pub whatsapp: WhatsApp,
    pub assistant: Assistant,
    pub reminders: Reminders,
}

fn default_assistant_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_assistant_timeout_ms() -> u64 {
    3000
}

impl Settings {
    pub fn new(path: &str) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name(path))
            .build()?;

        config.try_deserialize()
    }
}
