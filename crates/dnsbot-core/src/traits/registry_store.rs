// # Registry Store Trait
//
// Defines the interface for the persisted registry of domains and
// authorized users.
//
// ## Purpose
//
// The registry binds each managed domain name to its provider zone and
// records which chat users may talk to the bot. Commands only read domains;
// the access check may bind a user's chat id on first contact.
//
// ## Implementations
//
// - In-memory: `MemoryRegistryStore`
// - JSON file with atomic writes: `FileRegistryStore`

use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Local binding of a domain name to a provider zone
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DomainRegistration {
    /// Lowercase domain name (unique in the registry)
    pub domain_name: String,
    /// Provider zone identifier
    pub zone_id: String,
    /// Name servers assigned at registration time
    #[serde(default)]
    pub name_servers: Vec<String>,
    /// When the domain was registered
    pub created_at: DateTime<Utc>,
}

impl DomainRegistration {
    /// Create a registration stamped with the current time
    ///
    /// The domain name is normalized (trimmed, lowercased).
    pub fn new(domain_name: &str, zone_id: impl Into<String>) -> Self {
        Self {
            domain_name: normalize_domain(domain_name),
            zone_id: zone_id.into(),
            name_servers: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Attach the zone's name servers
    pub fn with_name_servers(mut self, name_servers: Vec<String>) -> Self {
        self.name_servers = name_servers;
        self
    }
}

/// A chat user allowed to use the bot
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AuthorizedUser {
    /// Lowercase username (unique in the registry)
    pub username: String,
    /// Chat platform user id, bound on first contact
    #[serde(default)]
    pub telegram_id: Option<i64>,
    /// Inactive users are treated as unknown
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl AuthorizedUser {
    /// Create an active user with no bound chat id
    pub fn new(username: &str) -> Self {
        Self {
            username: normalize_username(username),
            telegram_id: None,
            is_active: true,
            first_name: None,
            last_name: None,
            created_at: Utc::now(),
        }
    }

    /// Bind a chat user id
    pub fn with_telegram_id(mut self, telegram_id: i64) -> Self {
        self.telegram_id = Some(telegram_id);
        self
    }

    /// Mark the user inactive
    pub fn deactivated(mut self) -> Self {
        self.is_active = false;
        self
    }
}

fn default_active() -> bool {
    true
}

/// Normalize a domain name for registry lookups (trim, lowercase)
pub fn normalize_domain(domain_name: &str) -> String {
    domain_name.trim().to_lowercase()
}

/// Normalize a username for registry lookups (trim, lowercase, no leading `@`)
pub fn normalize_username(username: &str) -> String {
    username.trim().trim_start_matches('@').to_lowercase()
}

/// Trait for registry store implementations
///
/// Each method is an atomic single-document read or write. Implementations
/// must be thread-safe and usable across async tasks.
#[async_trait]
pub trait RegistryStore: Send + Sync {
    /// Look up a domain by its normalized name
    ///
    /// # Returns
    ///
    /// - `Ok(Some(DomainRegistration))`: The registration
    /// - `Ok(None)`: Domain not registered
    /// - `Err(Error)`: Storage error
    async fn find_domain(
        &self,
        domain_name: &str,
    ) -> Result<Option<DomainRegistration>, crate::Error>;

    /// Insert a new registration
    ///
    /// Fails with a registry error if the domain name is already present.
    async fn insert_domain(&self, registration: DomainRegistration) -> Result<(), crate::Error>;

    /// List all registrations, newest first
    async fn list_domains(&self) -> Result<Vec<DomainRegistration>, crate::Error>;

    /// Find an active user by bound chat id
    async fn find_active_user_by_telegram_id(
        &self,
        telegram_id: i64,
    ) -> Result<Option<AuthorizedUser>, crate::Error>;

    /// Find an active user by normalized username
    async fn find_active_user_by_username(
        &self,
        username: &str,
    ) -> Result<Option<AuthorizedUser>, crate::Error>;

    /// Bind a chat id to an existing user
    async fn bind_telegram_id(&self, username: &str, telegram_id: i64)
    -> Result<(), crate::Error>;

    /// Insert or replace a user, keyed by username
    async fn upsert_user(&self, user: AuthorizedUser) -> Result<(), crate::Error>;

    /// Persist any pending changes
    async fn flush(&self) -> Result<(), crate::Error>;
}

/// Helper trait for constructing registry stores from configuration
#[async_trait]
pub trait RegistryStoreFactory: Send + Sync {
    /// Create a RegistryStore instance from configuration
    async fn create(
        &self,
        config: &crate::config::RegistryConfig,
    ) -> Result<Box<dyn RegistryStore>, crate::Error>;
}

/// Newest-first ordering shared by store implementations
pub(crate) fn sort_newest_first(domains: &mut [DomainRegistration]) {
    domains.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| a.domain_name.cmp(&b.domain_name))
    });
}
