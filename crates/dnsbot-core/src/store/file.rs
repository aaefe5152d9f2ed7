// # File Registry Store
//
// File-based implementation of RegistryStore with crash recovery.
//
// ## Crash Recovery
//
// - Atomic writes: write-then-rename
// - Automatic backup: keeps a .backup of the last known good file
// - Recovery: falls back to the backup if the main file does not parse
//
// ## File Format
//
// ```json
// {
//   "version": "1.0",
//   "domains": {
//     "example.com": {
//       "domain_name": "example.com",
//       "zone_id": "023e105f4ecef8ad9ca31a8372d0c353",
//       "name_servers": ["ada.ns.cloudflare.com"],
//       "created_at": "2025-01-09T12:00:00Z"
//     }
//   },
//   "users": {
//     "alice": {
//       "username": "alice",
//       "telegram_id": 12345,
//       "is_active": true,
//       "created_at": "2025-01-09T12:00:00Z"
//     }
//   }
// }
// ```

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;

use super::RegistryData;
use crate::Error;
use crate::config::RegistryConfig;
use crate::traits::registry_store::{
    AuthorizedUser, DomainRegistration, RegistryStore, RegistryStoreFactory,
};

/// Registry file format version
const REGISTRY_FILE_VERSION: &str = "1.0";

/// File-based registry store with crash recovery
///
/// Every mutation is written through to disk before the call returns.
///
/// # Example
///
/// ```rust,no_run
/// use dnsbot_core::store::FileRegistryStore;
/// use dnsbot_core::traits::{DomainRegistration, RegistryStore};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = FileRegistryStore::new("/var/lib/dnsbot/registry.json").await?;
///     store.insert_domain(DomainRegistration::new("example.com", "Z1")).await?;
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct FileRegistryStore {
    path: PathBuf,
    state: Arc<RwLock<FileState>>,
}

#[derive(Debug)]
struct FileState {
    data: RegistryData,
    dirty: bool,
}

/// Serializable registry file format
#[derive(Debug, serde::Serialize, serde::Deserialize)]
struct RegistryFileFormat {
    version: String,
    #[serde(flatten)]
    data: RegistryData,
}

impl FileRegistryStore {
    /// Create or load a file registry store
    ///
    /// This will:
    /// 1. Create parent directories if needed
    /// 2. Load the existing file
    /// 3. Fall back to the backup if the file is corrupted
    /// 4. Start empty if neither can be read
    pub async fn new<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent).await.map_err(|e| {
                Error::config(format!(
                    "Failed to create registry directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let data = Self::load_with_recovery(&path).await?;

        Ok(Self {
            path,
            state: Arc::new(RwLock::new(FileState { data, dirty: false })),
        })
    }

    async fn load_with_recovery(path: &Path) -> Result<RegistryData, Error> {
        match Self::load(path).await {
            Ok(data) => {
                tracing::debug!(
                    "Loaded registry: {} domain(s), {} user(s)",
                    data.domains.len(),
                    data.users.len()
                );
                Ok(data)
            }
            Err(Error::Json(e)) => {
                tracing::warn!(
                    "Registry file appears corrupted: {}. Attempting recovery from backup.",
                    e
                );

                let backup_path = Self::backup_path(path);
                if !backup_path.exists() {
                    tracing::warn!("No backup file found. Starting with empty registry.");
                    return Ok(RegistryData::default());
                }

                match Self::load(&backup_path).await {
                    Ok(data) => {
                        tracing::info!(
                            "Recovered registry from backup: {} domain(s)",
                            data.domains.len()
                        );
                        if let Err(restore_err) = fs::copy(&backup_path, path).await {
                            tracing::error!(
                                "Failed to restore registry file from backup: {}",
                                restore_err
                            );
                        }
                        Ok(data)
                    }
                    Err(backup_err) => {
                        tracing::error!(
                            "Backup also unreadable: {}. Starting with empty registry.",
                            backup_err
                        );
                        Ok(RegistryData::default())
                    }
                }
            }
            Err(e) => Err(e),
        }
    }

    async fn load(path: &Path) -> Result<RegistryData, Error> {
        if !path.exists() {
            tracing::debug!("Registry file does not exist: {}", path.display());
            return Ok(RegistryData::default());
        }

        let content = fs::read_to_string(path).await.map_err(|e| {
            Error::registry(format!(
                "Failed to read registry file {}: {}",
                path.display(),
                e
            ))
        })?;

        let file: RegistryFileFormat = serde_json::from_str(&content)?;

        if file.version != REGISTRY_FILE_VERSION {
            tracing::warn!(
                "Registry file version mismatch: expected {}, got {}. Attempting to load anyway.",
                REGISTRY_FILE_VERSION,
                file.version
            );
        }

        Ok(file.data)
    }

    /// Write the registry atomically
    async fn write_state(&self) -> Result<(), Error> {
        let json = {
            let state_guard = self.state.read().await;
            let file = RegistryFileFormat {
                version: REGISTRY_FILE_VERSION.to_string(),
                data: state_guard.data.clone(),
            };
            serde_json::to_string_pretty(&file)?
        };

        let temp_path = self.temp_path();
        {
            let mut file = fs::File::create(&temp_path).await.map_err(|e| {
                Error::registry(format!(
                    "Failed to create temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;
            file.write_all(json.as_bytes()).await.map_err(|e| {
                Error::registry(format!(
                    "Failed to write temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;
            file.flush().await.map_err(|e| {
                Error::registry(format!(
                    "Failed to flush temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;
        }

        if self.path.exists()
            && let Err(e) = fs::copy(&self.path, Self::backup_path(&self.path)).await
        {
            tracing::warn!("Failed to create registry backup: {}", e);
        }

        fs::rename(&temp_path, &self.path).await.map_err(|e| {
            Error::registry(format!(
                "Failed to rename {} to {}: {}",
                temp_path.display(),
                self.path.display(),
                e
            ))
        })?;

        self.state.write().await.dirty = false;
        tracing::trace!("Registry written to {}", self.path.display());
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut temp = self.path.clone();
        temp.set_extension("tmp");
        temp
    }

    fn backup_path(path: &Path) -> PathBuf {
        let mut backup = path.to_path_buf();
        backup.set_extension("backup");
        backup
    }

    /// Apply a mutation and write it through
    async fn mutate<F>(&self, f: F) -> Result<(), Error>
    where
        F: FnOnce(&mut RegistryData) -> Result<(), Error> + Send,
    {
        {
            let mut state_guard = self.state.write().await;
            f(&mut state_guard.data)?;
            state_guard.dirty = true;
        }
        self.write_state().await
    }
}

#[async_trait]
impl RegistryStore for FileRegistryStore {
    async fn find_domain(&self, domain_name: &str) -> Result<Option<DomainRegistration>, Error> {
        Ok(self.state.read().await.data.find_domain(domain_name))
    }

    async fn insert_domain(&self, registration: DomainRegistration) -> Result<(), Error> {
        self.mutate(|data| data.insert_domain(registration)).await
    }

    async fn list_domains(&self) -> Result<Vec<DomainRegistration>, Error> {
        Ok(self.state.read().await.data.list_domains())
    }

    async fn find_active_user_by_telegram_id(
        &self,
        telegram_id: i64,
    ) -> Result<Option<AuthorizedUser>, Error> {
        Ok(self
            .state
            .read()
            .await
            .data
            .find_active_user_by_telegram_id(telegram_id))
    }

    async fn find_active_user_by_username(
        &self,
        username: &str,
    ) -> Result<Option<AuthorizedUser>, Error> {
        Ok(self
            .state
            .read()
            .await
            .data
            .find_active_user_by_username(username))
    }

    async fn bind_telegram_id(&self, username: &str, telegram_id: i64) -> Result<(), Error> {
        self.mutate(|data| data.bind_telegram_id(username, telegram_id))
            .await
    }

    async fn upsert_user(&self, user: AuthorizedUser) -> Result<(), Error> {
        self.mutate(|data| {
            data.upsert_user(user);
            Ok(())
        })
        .await
    }

    async fn flush(&self) -> Result<(), Error> {
        let dirty = self.state.read().await.dirty;
        if dirty { self.write_state().await } else { Ok(()) }
    }
}

/// Factory for the file store
pub struct FileRegistryStoreFactory;

#[async_trait]
impl RegistryStoreFactory for FileRegistryStoreFactory {
    async fn create(&self, config: &RegistryConfig) -> Result<Box<dyn RegistryStore>, Error> {
        match config {
            RegistryConfig::File { path } => Ok(Box::new(FileRegistryStore::new(path).await?)),
            _ => Err(Error::config("Invalid config for file registry store")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_file_store_persists_domains_and_users() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("registry.json");

        let store = FileRegistryStore::new(&path).await.unwrap();
        assert!(store.list_domains().await.unwrap().is_empty());

        store
            .insert_domain(
                DomainRegistration::new("example.com", "Z1")
                    .with_name_servers(vec!["ada.ns.cloudflare.com".to_string()]),
            )
            .await
            .unwrap();
        store.upsert_user(AuthorizedUser::new("alice")).await.unwrap();
        store.bind_telegram_id("alice", 42).await.unwrap();
        assert!(path.exists());

        let reloaded = FileRegistryStore::new(&path).await.unwrap();
        let domain = reloaded.find_domain("example.com").await.unwrap().unwrap();
        assert_eq!(domain.zone_id, "Z1");
        assert_eq!(domain.name_servers, vec!["ada.ns.cloudflare.com".to_string()]);

        let user = reloaded.find_active_user_by_telegram_id(42).await.unwrap();
        assert_eq!(user.unwrap().username, "alice");
    }

    #[tokio::test]
    async fn test_file_store_corruption_recovery() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("registry.json");

        let store = FileRegistryStore::new(&path).await.unwrap();
        store
            .insert_domain(DomainRegistration::new("first.com", "Z1"))
            .await
            .unwrap();
        // Second write leaves the first state in the backup
        store
            .insert_domain(DomainRegistration::new("second.com", "Z2"))
            .await
            .unwrap();

        let backup_path = FileRegistryStore::backup_path(&path);
        assert!(backup_path.exists(), "Backup file should exist after write");

        fs::write(&path, b"corrupted json data").await.unwrap();

        let recovered = FileRegistryStore::new(&path).await.unwrap();
        assert!(recovered.find_domain("first.com").await.unwrap().is_some());
        assert!(
            recovered.find_domain("second.com").await.unwrap().is_none(),
            "Backup should contain previous state, not latest"
        );
    }

    #[tokio::test]
    async fn test_corrupted_file_without_backup_starts_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("registry.json");
        fs::write(&path, b"{not json").await.unwrap();

        let store = FileRegistryStore::new(&path).await.unwrap();
        assert!(store.list_domains().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_creates_parent_directory() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("registry.json");

        let store = FileRegistryStore::new(&path).await.unwrap();
        store.upsert_user(AuthorizedUser::new("bob")).await.unwrap();
        assert!(path.exists());
    }
}
