//! Error types for the DNS bot
//!
//! Every failure a command can hit is one of these variants. The command
//! boundary turns them into reply text, so none of them is fatal.

use thiserror::Error;

/// Result type alias for DNS bot operations
pub type Result<T> = std::result::Result<T, Error>;

/// Failure reported by a DNS provider
///
/// Produced only at the provider client boundary. Upstream code never looks
/// at transport-specific error shapes, only at this.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{}{}", .message, code_suffix(.code))]
pub struct ProviderError {
    /// Human-readable message, taken from the provider envelope when present
    pub message: String,
    /// Provider error code, if the provider sent one
    pub code: Option<i64>,
}

impl ProviderError {
    /// Create an error without a provider code (transport failures, malformed responses)
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
        }
    }

    /// Create an error carrying the provider's own error code
    pub fn with_code(code: i64, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: Some(code),
        }
    }
}

fn code_suffix(code: &Option<i64>) -> String {
    code.map(|code| format!(" (code {})", code)).unwrap_or_default()
}

/// Core error type for the DNS bot
#[derive(Error, Debug)]
pub enum Error {
    /// Domain is not in the local registry
    #[error("Domain {0} not found")]
    DomainNotFound(String),

    /// No live record matched the supplied name/type
    #[error("DNS record not found: {0}")]
    RecordNotFound(String),

    /// Command was executed with fewer arguments than it needs
    #[error("Not enough parameters: {0}")]
    InsufficientArguments(String),

    /// Remote call failed or returned a malformed success
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Malformed domain name, empty required field, etc.
    #[error("Invalid input: {0}")]
    Validation(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Registry store errors
    #[error("Registry error: {0}")]
    Registry(String),

    /// Message transport errors
    #[error("Transport error: {0}")]
    Transport(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a "domain not found" error
    pub fn domain_not_found(domain: impl Into<String>) -> Self {
        Self::DomainNotFound(domain.into())
    }

    /// Create a "record not found" error
    pub fn record_not_found(msg: impl Into<String>) -> Self {
        Self::RecordNotFound(msg.into())
    }

    /// Create an insufficient arguments error
    pub fn insufficient_arguments(usage: impl Into<String>) -> Self {
        Self::InsufficientArguments(usage.into())
    }

    /// Create a provider error without a provider code
    pub fn provider(msg: impl Into<String>) -> Self {
        Self::Provider(ProviderError::new(msg))
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a registry store error
    pub fn registry(msg: impl Into<String>) -> Self {
        Self::Registry(msg.into())
    }

    /// Create a transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}
