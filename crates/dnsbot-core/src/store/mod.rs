// # Registry Store Implementations
//
// This module provides implementations of the RegistryStore trait for
// different persistence strategies. Both keep the same in-memory document
// (`RegistryData`); the file store additionally writes it to disk.

pub mod file;
pub mod memory;

pub use file::{FileRegistryStore, FileRegistryStoreFactory};
pub use memory::{MemoryRegistryStore, MemoryRegistryStoreFactory};

use std::collections::HashMap;

use crate::Error;
use crate::traits::registry_store::{
    AuthorizedUser, DomainRegistration, normalize_domain, normalize_username, sort_newest_first,
};

/// The registry document shared by all stores
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub(crate) struct RegistryData {
    #[serde(default)]
    pub(crate) domains: HashMap<String, DomainRegistration>,
    #[serde(default)]
    pub(crate) users: HashMap<String, AuthorizedUser>,
}

impl RegistryData {
    pub(crate) fn find_domain(&self, domain_name: &str) -> Option<DomainRegistration> {
        self.domains.get(&normalize_domain(domain_name)).cloned()
    }

    pub(crate) fn insert_domain(&mut self, registration: DomainRegistration) -> Result<(), Error> {
        let key = normalize_domain(&registration.domain_name);
        if self.domains.contains_key(&key) {
            return Err(Error::registry(format!("Domain {} is already registered", key)));
        }
        self.domains.insert(
            key.clone(),
            DomainRegistration {
                domain_name: key,
                ..registration
            },
        );
        Ok(())
    }

    pub(crate) fn list_domains(&self) -> Vec<DomainRegistration> {
        let mut domains: Vec<_> = self.domains.values().cloned().collect();
        sort_newest_first(&mut domains);
        domains
    }

    pub(crate) fn find_active_user_by_telegram_id(&self, telegram_id: i64) -> Option<AuthorizedUser> {
        self.users
            .values()
            .find(|u| u.is_active && u.telegram_id == Some(telegram_id))
            .cloned()
    }

    pub(crate) fn find_active_user_by_username(&self, username: &str) -> Option<AuthorizedUser> {
        self.users
            .get(&normalize_username(username))
            .filter(|u| u.is_active)
            .cloned()
    }

    pub(crate) fn bind_telegram_id(&mut self, username: &str, telegram_id: i64) -> Result<(), Error> {
        let key = normalize_username(username);
        let user = self
            .users
            .get_mut(&key)
            .ok_or_else(|| Error::registry(format!("User {} not found", key)))?;
        user.telegram_id = Some(telegram_id);
        Ok(())
    }

    pub(crate) fn upsert_user(&mut self, user: AuthorizedUser) {
        let key = normalize_username(&user.username);
        self.users.insert(
            key.clone(),
            AuthorizedUser {
                username: key,
                ..user
            },
        );
    }
}
