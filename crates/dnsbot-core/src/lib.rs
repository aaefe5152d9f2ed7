// # dnsbot-core
//
// Core library for the chat-driven DNS management bot.
//
// ## Architecture Overview
//
// - **DnsProvider**: Trait for zone and record operations against a provider API
// - **RegistryStore**: Trait for the domain registry and authorized users
// - **MessageSource / ReplySink**: Chat transport seams
// - **resolver**: Maps human-typed record references onto live records
// - **command**: Argument parsing, DNS command handlers and reply texts
// - **BotEngine**: Message loop (access control → command → reply)
// - **ProviderRegistry**: Plugin-based registry for providers and stores
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Core logic is separate from implementations
// 2. **Plugin-Based**: Providers are registered dynamically, no hard-coded if-else
// 3. **Library-First**: All core functionality can be used as a library

pub mod access;
pub mod command;
pub mod config;
pub mod engine;
pub mod error;
pub mod registry;
pub mod resolver;
pub mod store;
pub mod traits;

// Re-export core types for convenience
pub use access::{AccessDecision, AccessPolicy};
pub use command::{BotCommand, CommandRouter};
pub use config::{AccessConfig, BotConfig, EngineConfig, ProviderConfig, RegistryConfig};
pub use engine::{BotEngine, EngineEvent};
pub use error::{Error, ProviderError, Result};
pub use registry::ProviderRegistry;
pub use resolver::RecordIdentifier;
pub use store::{FileRegistryStore, MemoryRegistryStore};
pub use traits::{DnsProvider, MessageSource, RecordPayload, RegistryStore, ReplySink};
