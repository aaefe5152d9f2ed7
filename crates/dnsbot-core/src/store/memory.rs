// # Memory Registry Store
//
// In-memory implementation of RegistryStore.
//
// ## Purpose
//
// A fast store that does not persist across restarts. Used by tests and by
// deployments that seed the registry at startup.
//
// ## Crash Behavior
//
// - All registrations and users are lost on restart
// - No recovery possible (state is in-memory only)

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::RegistryData;
use crate::Error;
use crate::config::RegistryConfig;
use crate::traits::registry_store::{
    AuthorizedUser, DomainRegistration, RegistryStore, RegistryStoreFactory,
};

/// In-memory registry store
///
/// # Example
///
/// ```rust,no_run
/// use dnsbot_core::store::MemoryRegistryStore;
/// use dnsbot_core::traits::{DomainRegistration, RegistryStore};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = MemoryRegistryStore::new();
///     store.insert_domain(DomainRegistration::new("example.com", "Z1")).await?;
///
///     let domain = store.find_domain("Example.com").await?;
///     assert_eq!(domain.map(|d| d.zone_id), Some("Z1".to_string()));
///
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryRegistryStore {
    inner: Arc<RwLock<RegistryData>>,
}

impl MemoryRegistryStore {
    /// Create a new empty memory store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered domains
    pub async fn domain_count(&self) -> usize {
        self.inner.read().await.domains.len()
    }

    /// Number of known users
    pub async fn user_count(&self) -> usize {
        self.inner.read().await.users.len()
    }
}

#[async_trait]
impl RegistryStore for MemoryRegistryStore {
    async fn find_domain(&self, domain_name: &str) -> Result<Option<DomainRegistration>, Error> {
        Ok(self.inner.read().await.find_domain(domain_name))
    }

    async fn insert_domain(&self, registration: DomainRegistration) -> Result<(), Error> {
        self.inner.write().await.insert_domain(registration)
    }

    async fn list_domains(&self) -> Result<Vec<DomainRegistration>, Error> {
        Ok(self.inner.read().await.list_domains())
    }

    async fn find_active_user_by_telegram_id(
        &self,
        telegram_id: i64,
    ) -> Result<Option<AuthorizedUser>, Error> {
        Ok(self
            .inner
            .read()
            .await
            .find_active_user_by_telegram_id(telegram_id))
    }

    async fn find_active_user_by_username(
        &self,
        username: &str,
    ) -> Result<Option<AuthorizedUser>, Error> {
        Ok(self.inner.read().await.find_active_user_by_username(username))
    }

    async fn bind_telegram_id(&self, username: &str, telegram_id: i64) -> Result<(), Error> {
        self.inner
            .write()
            .await
            .bind_telegram_id(username, telegram_id)
    }

    async fn upsert_user(&self, user: AuthorizedUser) -> Result<(), Error> {
        self.inner.write().await.upsert_user(user);
        Ok(())
    }

    async fn flush(&self) -> Result<(), Error> {
        // Nothing buffered
        Ok(())
    }
}

/// Factory for the in-memory store
pub struct MemoryRegistryStoreFactory;

#[async_trait]
impl RegistryStoreFactory for MemoryRegistryStoreFactory {
    async fn create(&self, config: &RegistryConfig) -> Result<Box<dyn RegistryStore>, Error> {
        match config {
            RegistryConfig::Memory => Ok(Box::new(MemoryRegistryStore::new())),
            _ => Err(Error::config("Invalid config for memory registry store")),
        }
    }
}
