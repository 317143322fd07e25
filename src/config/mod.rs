//! Configuration management
//!
//! Settings come from an optional TOML file (`orderline.toml`, or the path in
//! `ORDERLINE_CONFIG`) overlaid by `ORDERLINE__SECTION__KEY` environment
//! variables. Every field has a default, so an empty environment still boots.

use crate::domain::tenant::{TenantConfig, DEFAULT_VOICE};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub realtime: RealtimeConfig,
    pub telephony: TelephonyConfig,
    pub database: DatabaseConfig,
    /// Static tenants for the in-memory directory
    pub tenants: Vec<TenantEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Public host name the telephony provider reaches us on
    pub public_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            public_url: "localhost:8080".to_string(),
        }
    }
}

/// Upstream speech-realtime provider settings
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RealtimeConfig {
    pub url: String,
    pub api_key: Option<String>,
    /// Voice used when the tenant has none
    pub voice: String,
    /// Audio format for both directions, fixed for the call
    pub audio_format: String,
    pub transcription_model: String,
    pub vad: VadConfig,
    /// Upper bound on order persistence and notification per tool call
    pub tool_timeout_ms: u64,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            url: "wss://api.openai.com/v1/realtime?model=gpt-4o-realtime-preview-2024-10-01"
                .to_string(),
            api_key: None,
            voice: DEFAULT_VOICE.to_string(),
            audio_format: "pcm16".to_string(),
            transcription_model: "whisper-1".to_string(),
            vad: VadConfig::default(),
            tool_timeout_ms: 5000,
        }
    }
}

impl RealtimeConfig {
    pub fn tool_timeout(&self) -> Duration {
        Duration::from_millis(self.tool_timeout_ms)
    }
}

// API key stays out of logs
impl std::fmt::Debug for RealtimeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealtimeConfig")
            .field("url", &self.url)
            .field("api_key", &self.api_key.as_ref().map(|_| "****"))
            .field("voice", &self.voice)
            .field("audio_format", &self.audio_format)
            .field("transcription_model", &self.transcription_model)
            .field("vad", &self.vad)
            .field("tool_timeout_ms", &self.tool_timeout_ms)
            .finish()
    }
}

/// Server-side voice activity detection
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VadConfig {
    pub enabled: bool,
    pub threshold: f32,
    pub prefix_padding_ms: u32,
    pub silence_duration_ms: u32,
}

impl Default for VadConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            threshold: 0.5,
            prefix_padding_ms: 300,
            silence_duration_ms: 500,
        }
    }
}

/// Parameters advertised to the telephony provider in the answer webhook
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelephonyConfig {
    pub content_type: String,
}

impl Default for TelephonyConfig {
    fn default() -> Self {
        Self {
            content_type: "audio/l16;rate=16000".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Postgres URL; the in-memory stores are used when unset
    pub url: Option<String>,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: 10,
        }
    }
}

/// Tenant declared in the configuration file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenantEntry {
    pub phone_number: String,
    #[serde(default)]
    pub system_prompt: Option<String>,
    #[serde(default)]
    pub menu: Option<String>,
    #[serde(default)]
    pub voice: Option<String>,
    #[serde(default = "default_agent_enabled")]
    pub agent_enabled: bool,
}

fn default_agent_enabled() -> bool {
    true
}

impl TenantEntry {
    pub fn to_tenant_config(&self) -> TenantConfig {
        TenantConfig {
            system_prompt: self.system_prompt.clone(),
            menu: self.menu.clone(),
            voice: self.voice.clone(),
            agent_enabled: self.agent_enabled,
        }
    }
}

impl Config {
    /// Load from file and environment
    pub fn load() -> Result<Self, config::ConfigError> {
        let path = std::env::var("ORDERLINE_CONFIG").unwrap_or_else(|_| "orderline".to_string());

        let mut loaded: Config = config::Config::builder()
            .add_source(config::File::with_name(&path).required(false))
            .add_source(
                config::Environment::with_prefix("ORDERLINE")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        if loaded.realtime.api_key.is_none() {
            loaded.realtime.api_key = std::env::var("OPENAI_API_KEY").ok();
        }

        Ok(loaded)
    }
}
