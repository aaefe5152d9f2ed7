//! Plugin-based provider registry
//!
//! The registry maps provider and registry-store type names to factories,
//! so the daemon builds its collaborators from configuration without
//! hardcoded if-else chains.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use dnsbot_core::ProviderRegistry;
//! use dnsbot_core::config::ProviderConfig;
//!
//! let registry = ProviderRegistry::with_builtin_stores();
//! dnsbot_provider_cloudflare::register(&registry);
//!
//! let provider = registry.create_provider(&ProviderConfig::cloudflare_token("token"))?;
//! ```

use crate::config::{ProviderConfig, RegistryConfig};
use crate::error::{Error, Result};
use crate::store::{FileRegistryStoreFactory, MemoryRegistryStoreFactory};
use crate::traits::{DnsProvider, DnsProviderFactory, RegistryStore, RegistryStoreFactory};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Provider registry for plugin-based construction
///
/// ## Thread Safety
///
/// The registry uses interior mutability with RwLock, allowing concurrent
/// reads and exclusive writes.
#[derive(Default)]
pub struct ProviderRegistry {
    /// Registered DNS provider factories
    providers: RwLock<HashMap<String, Box<dyn DnsProviderFactory>>>,

    /// Registered registry store factories
    stores: RwLock<HashMap<String, Arc<dyn RegistryStoreFactory>>>,
}

impl ProviderRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the memory and file stores already registered
    pub fn with_builtin_stores() -> Self {
        let registry = Self::new();
        registry.register_store("memory", Box::new(MemoryRegistryStoreFactory));
        registry.register_store("file", Box::new(FileRegistryStoreFactory));
        registry
    }

    /// Register a DNS provider factory
    ///
    /// # Parameters
    ///
    /// - `name`: Provider type name (e.g., "cloudflare")
    /// - `factory`: Factory object for creating provider instances
    pub fn register_provider(&self, name: impl Into<String>, factory: Box<dyn DnsProviderFactory>) {
        let name = name.into();
        let mut providers = self
            .providers
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        providers.insert(name, factory);
    }

    /// Register a registry store factory
    ///
    /// # Parameters
    ///
    /// - `name`: Store type name (e.g., "file", "memory")
    /// - `factory`: Factory object for creating store instances
    pub fn register_store(&self, name: impl Into<String>, factory: Box<dyn RegistryStoreFactory>) {
        let name = name.into();
        let mut stores = self
            .stores
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        stores.insert(name, Arc::from(factory));
    }

    /// Create a DNS provider from configuration
    ///
    /// # Returns
    ///
    /// - `Ok(Box<dyn DnsProvider>)`: Created provider instance
    /// - `Err(Error)`: If provider type is not registered or creation fails
    pub fn create_provider(&self, config: &ProviderConfig) -> Result<Box<dyn DnsProvider>> {
        config.validate()?;

        let provider_type = config.type_name();
        let providers = self
            .providers
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let factory = providers
            .get(provider_type)
            .ok_or_else(|| Error::config(format!("Unknown provider type: {}", provider_type)))?;

        factory.create(config)
    }

    /// Create a registry store from configuration
    ///
    /// # Returns
    ///
    /// - `Ok(Box<dyn RegistryStore>)`: Created store instance
    /// - `Err(Error)`: If store type is not registered or creation fails
    pub async fn create_store(&self, config: &RegistryConfig) -> Result<Box<dyn RegistryStore>> {
        config.validate()?;

        let store_type = config.type_name();
        let factory = {
            let stores = self
                .stores
                .read()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            stores
                .get(store_type)
                .ok_or_else(|| Error::config(format!("Unknown registry store type: {}", store_type)))?
                .clone()
        };

        // Lock released before the async create
        factory.create(config).await
    }

    /// List all registered provider types
    pub fn list_providers(&self) -> Vec<String> {
        let providers = self
            .providers
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        providers.keys().cloned().collect()
    }

    /// Check if a provider type is registered
    pub fn has_provider(&self, name: &str) -> bool {
        let providers = self
            .providers
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        providers.contains_key(name)
    }

    /// Check if a registry store type is registered
    pub fn has_store(&self, name: &str) -> bool {
        let stores = self
            .stores
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        stores.contains_key(name)
    }
}
