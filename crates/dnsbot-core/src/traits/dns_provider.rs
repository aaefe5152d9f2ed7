// # DNS Provider Trait
//
// Defines the interface for zone and record operations against a DNS
// provider API.
//
// ## Implementations
//
// - Cloudflare: `dnsbot-provider-cloudflare` crate
//
// ## Usage
//
// ```rust,ignore
// use dnsbot_core::{DnsProvider, RecordPayload};
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let provider = /* DnsProvider implementation */;
//
//     let payload = RecordPayload::new("a", "www", "192.0.2.10", 3600, None);
//     let record = provider.create_record("zone-id", &payload).await?;
//     println!("created {}", record.id);
//
//     Ok(())
// }
// ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;

/// Default time-to-live for new records, in seconds
pub const DEFAULT_TTL: u32 = 3600;

/// Remote DNS zone
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    /// Opaque zone identifier
    pub id: String,
    /// Apex domain name
    pub name: String,
    /// Activation status (e.g. "pending", "active")
    #[serde(default)]
    pub status: String,
    /// Assigned name servers, in provider order
    #[serde(default)]
    pub name_servers: Vec<String>,
}

/// Remote DNS record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsRecord {
    /// Provider-assigned record identifier
    pub id: String,
    /// Record type, uppercase
    #[serde(rename = "type")]
    pub record_type: String,
    /// Stored name: `@`, a label, or a fully-qualified name
    pub name: String,
    /// Record value
    pub content: String,
    /// Time-to-live in seconds
    #[serde(default = "default_ttl")]
    pub ttl: u32,
    /// Priority (MX/SRV only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<u16>,
    /// Whether the record is proxied by the provider
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxied: Option<bool>,
}

fn default_ttl() -> u32 {
    DEFAULT_TTL
}

/// Outgoing create/update body
///
/// Construct it with [`RecordPayload::new`], which normalizes the type and
/// drops the priority for types that do not carry one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordPayload {
    #[serde(rename = "type")]
    record_type: String,
    name: String,
    content: String,
    ttl: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    priority: Option<u16>,
}

impl RecordPayload {
    /// Build a payload
    ///
    /// The type is uppercased. `priority` is kept only when it is supplied
    /// and the type is MX or SRV.
    pub fn new(
        record_type: &str,
        name: impl Into<String>,
        content: impl Into<String>,
        ttl: u32,
        priority: Option<u16>,
    ) -> Self {
        let record_type = normalize_record_type(record_type);
        let priority = priority.filter(|_| takes_priority(&record_type));

        Self {
            record_type,
            name: name.into(),
            content: content.into(),
            ttl,
            priority,
        }
    }

    pub fn record_type(&self) -> &str {
        &self.record_type
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn ttl(&self) -> u32 {
        self.ttl
    }

    pub fn priority(&self) -> Option<u16> {
        self.priority
    }
}

/// Uppercase and trim a user-supplied record type
pub fn normalize_record_type(record_type: &str) -> String {
    record_type.trim().to_uppercase()
}

/// Whether a (normalized) record type carries a priority field
pub fn takes_priority(record_type: &str) -> bool {
    matches!(record_type, "MX" | "SRV")
}

/// Trait for DNS provider implementations
///
/// One method per remote action. Each call is a single attempt: no retries,
/// no caching beyond the request. Every failure, transport or API, comes
/// back as a [`ProviderError`].
///
/// Implementations must be thread-safe and usable across async tasks.
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// Create a zone for `domain_name`
    ///
    /// Succeeds only when the provider marks the response successful and
    /// returns a zone.
    async fn create_zone(&self, domain_name: &str) -> Result<Zone, ProviderError>;

    /// Fetch a zone by id
    async fn get_zone(&self, zone_id: &str) -> Result<Zone, ProviderError>;

    /// List every record of a zone, in the provider's native order
    async fn list_records(&self, zone_id: &str) -> Result<Vec<DnsRecord>, ProviderError>;

    /// Create a record
    async fn create_record(
        &self,
        zone_id: &str,
        payload: &RecordPayload,
    ) -> Result<DnsRecord, ProviderError>;

    /// Replace a record
    async fn update_record(
        &self,
        zone_id: &str,
        record_id: &str,
        payload: &RecordPayload,
    ) -> Result<DnsRecord, ProviderError>;

    /// Delete a record, returning whether the provider confirmed it
    async fn delete_record(&self, zone_id: &str, record_id: &str) -> Result<bool, ProviderError>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}

/// Helper trait for constructing DNS providers from configuration
pub trait DnsProviderFactory: Send + Sync {
    /// Create a DnsProvider instance from configuration
    ///
    /// Missing credentials must fail here, not on first use.
    fn create(
        &self,
        config: &crate::config::ProviderConfig,
    ) -> Result<Box<dyn DnsProvider>, crate::Error>;
}
