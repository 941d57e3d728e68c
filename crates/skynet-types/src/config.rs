//! Application configuration types for SkyNet.
//!
//! `AppConfig` represents the optional `config.toml` in the data directory.
//! Every field has a default, so an empty file (or no file) is valid.

use serde::{Deserialize, Deserializer, Serialize};

/// Hard ceiling on generated tokens per reply.
pub const MAX_COMPLETION_TOKENS: u32 = 500;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub generation: GenerationProfiles,
}

/// Listener settings for `skynet serve`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Sampling settings for each deployment shape.
///
/// Durable chats and ephemeral sessions historically used different
/// temperatures; both are fixed per deployment, never per request. A profile
/// section only overrides the keys it names.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationProfiles {
    #[serde(default = "GenerationConfig::chats", deserialize_with = "chats_profile")]
    pub chats: GenerationConfig,
    #[serde(
        default = "GenerationConfig::sessions",
        deserialize_with = "sessions_profile"
    )]
    pub sessions: GenerationConfig,
}

/// A `[generation.*]` section as written, before profile defaults apply.
#[derive(Debug, Deserialize)]
struct GenerationOverrides {
    model: Option<String>,
    max_tokens: Option<u32>,
    temperature: Option<f64>,
}

impl GenerationOverrides {
    fn apply(self, base: GenerationConfig) -> GenerationConfig {
        GenerationConfig {
            model: self.model.unwrap_or(base.model),
            max_tokens: self.max_tokens.unwrap_or(base.max_tokens),
            temperature: self.temperature.unwrap_or(base.temperature),
        }
    }
}

fn chats_profile<'de, D: Deserializer<'de>>(d: D) -> Result<GenerationConfig, D::Error> {
    GenerationOverrides::deserialize(d).map(|o| o.apply(GenerationConfig::chats()))
}

fn sessions_profile<'de, D: Deserializer<'de>>(d: D) -> Result<GenerationConfig, D::Error> {
    GenerationOverrides::deserialize(d).map(|o| o.apply(GenerationConfig::sessions()))
}

impl Default for GenerationProfiles {
    fn default() -> Self {
        Self {
            chats: GenerationConfig::chats(),
            sessions: GenerationConfig::sessions(),
        }
    }
}

/// Model, completion budget and temperature for outbound calls.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationConfig {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f64,
}

fn default_model() -> String {
    "gpt-4o".to_string()
}

fn default_max_tokens() -> u32 {
    MAX_COMPLETION_TOKENS
}

impl GenerationConfig {
    /// Defaults for durable chats.
    pub fn chats() -> Self {
        Self {
            model: default_model(),
            max_tokens: default_max_tokens(),
            temperature: 0.8,
        }
    }

    /// Defaults for ephemeral sessions.
    pub fn sessions() -> Self {
        Self {
            model: default_model(),
            max_tokens: default_max_tokens(),
            temperature: 0.7,
        }
    }

    /// Completion budget with the global ceiling applied.
    pub fn effective_max_tokens(&self) -> u32 {
        self.max_tokens.min(MAX_COMPLETION_TOKENS)
    }
}
