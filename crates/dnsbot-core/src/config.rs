//! Configuration types for the DNS bot
//!
//! This module defines all configuration structures used throughout the crate.

use serde::{Deserialize, Serialize};

/// Main bot configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BotConfig {
    /// DNS provider configuration
    pub provider: ProviderConfig,

    /// Registry store configuration
    #[serde(default)]
    pub registry: RegistryConfig,

    /// Chat access restrictions
    #[serde(default)]
    pub access: AccessConfig,

    /// Optional engine settings
    #[serde(default)]
    pub engine: EngineConfig,
}

impl BotConfig {
    /// Create a configuration for the given provider with defaults elsewhere
    pub fn new(provider: ProviderConfig) -> Self {
        Self {
            provider,
            registry: RegistryConfig::default(),
            access: AccessConfig::default(),
            engine: EngineConfig::default(),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        self.provider.validate()?;
        self.registry.validate()?;
        self.engine.validate()?;
        Ok(())
    }
}

/// DNS provider configuration
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProviderConfig {
    /// Cloudflare provider
    ///
    /// Authenticates with `api_token` (bearer) or with the legacy
    /// `api_key` + `email` pair.
    Cloudflare {
        #[serde(default)]
        api_token: Option<String>,
        #[serde(default)]
        api_key: Option<String>,
        #[serde(default)]
        email: Option<String>,
        /// Override for the API base URL
        #[serde(default)]
        base_url: Option<String>,
        /// Per-request timeout in seconds
        #[serde(default = "default_http_timeout_secs")]
        http_timeout_secs: u64,
    },

    /// Custom provider
    Custom {
        /// Factory name to use
        factory: String,
        /// Custom configuration data
        config: serde_json::Value,
    },
}

impl ProviderConfig {
    /// Cloudflare configuration authenticated with an API token
    pub fn cloudflare_token(api_token: impl Into<String>) -> Self {
        ProviderConfig::Cloudflare {
            api_token: Some(api_token.into()),
            api_key: None,
            email: None,
            base_url: None,
            http_timeout_secs: default_http_timeout_secs(),
        }
    }

    /// Validate the provider configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            ProviderConfig::Cloudflare {
                api_token,
                api_key,
                email,
                http_timeout_secs,
                ..
            } => {
                let has_token = api_token.as_deref().is_some_and(|t| !t.is_empty());
                let has_key_pair = api_key.as_deref().is_some_and(|k| !k.is_empty())
                    && email.as_deref().is_some_and(|e| !e.is_empty());

                if !has_token && !has_key_pair {
                    return Err(crate::Error::config(
                        "Cloudflare requires an API token or an API key and email",
                    ));
                }
                if *http_timeout_secs == 0 {
                    return Err(crate::Error::config("Cloudflare HTTP timeout must be > 0"));
                }
                Ok(())
            }
            ProviderConfig::Custom { factory, config } => {
                if factory.is_empty() {
                    return Err(crate::Error::config(
                        "Custom provider factory cannot be empty",
                    ));
                }
                if config.is_null() {
                    return Err(crate::Error::config(
                        "Custom provider config cannot be null",
                    ));
                }
                Ok(())
            }
        }
    }

    /// Get the provider type name
    pub fn type_name(&self) -> &str {
        match self {
            ProviderConfig::Cloudflare { .. } => "cloudflare",
            ProviderConfig::Custom { factory, .. } => factory,
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        ProviderConfig::Cloudflare {
            api_token: None,
            api_key: None,
            email: None,
            base_url: None,
            http_timeout_secs: default_http_timeout_secs(),
        }
    }
}

// Credentials stay out of logs.
impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderConfig::Cloudflare {
                api_token,
                api_key,
                email,
                base_url,
                http_timeout_secs,
            } => f
                .debug_struct("Cloudflare")
                .field("api_token", &api_token.as_ref().map(|_| "<REDACTED>"))
                .field("api_key", &api_key.as_ref().map(|_| "<REDACTED>"))
                .field("email", email)
                .field("base_url", base_url)
                .field("http_timeout_secs", http_timeout_secs)
                .finish(),
            ProviderConfig::Custom { factory, .. } => f
                .debug_struct("Custom")
                .field("factory", factory)
                .finish_non_exhaustive(),
        }
    }
}

/// Registry store configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RegistryConfig {
    /// JSON file store
    File {
        /// Path to the registry file
        path: String,
    },

    /// In-memory store (not persistent)
    #[default]
    Memory,
}

impl RegistryConfig {
    /// Validate the registry configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            RegistryConfig::File { path } if path.trim().is_empty() => {
                Err(crate::Error::config("Registry file path cannot be empty"))
            }
            _ => Ok(()),
        }
    }

    /// Get the store type name
    pub fn type_name(&self) -> &'static str {
        match self {
            RegistryConfig::File { .. } => "file",
            RegistryConfig::Memory => "memory",
        }
    }
}

/// Chat access restrictions
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccessConfig {
    /// Only this group chat (plus private chats) may use the bot
    #[serde(default)]
    pub allowed_chat_id: Option<i64>,
}

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Capacity of the engine event channel
    ///
    /// When full, new events are dropped with a warning log.
    ///
    /// Default: 1000 events
    #[serde(default = "default_event_channel_capacity")]
    pub event_channel_capacity: usize,
}

impl EngineConfig {
    /// Validate the engine configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.event_channel_capacity == 0 {
            return Err(crate::Error::config("Event channel capacity must be > 0"));
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            event_channel_capacity: default_event_channel_capacity(),
        }
    }
}

/// Per-request timeout used when none is configured
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

fn default_http_timeout_secs() -> u64 {
    DEFAULT_HTTP_TIMEOUT_SECS
}

fn default_event_channel_capacity() -> usize {
    1000
}
