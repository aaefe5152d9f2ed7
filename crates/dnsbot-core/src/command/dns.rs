//! DNS record commands
//!
//! Create, update, delete and list handlers. Each one follows the same
//! shape: look the domain up in the registry, resolve or build the record
//! identity, call the provider once (plus the resolver's reads), and return
//! a typed outcome for the reply layer to format.
//!
//! Arguments are the positional tokens after the command name.

use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::resolver::{self, RecordIdentifier};
use crate::traits::dns_provider::{DEFAULT_TTL, DnsRecord, RecordPayload};
use crate::traits::registry_store::normalize_domain;
use crate::traits::{DnsProvider, DomainRegistration, RegistryStore};

use super::parser::parse_leading_int;
use super::reply;

/// Outcome of a successful create or update
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordChange {
    pub domain: DomainRegistration,
    pub record: DnsRecord,
}

/// Outcome of a successful delete
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordDeletion {
    pub domain: DomainRegistration,
    pub record_id: String,
}

/// Outcome of a successful record listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordListing {
    pub domain: DomainRegistration,
    pub records: Vec<DnsRecord>,
}

/// DNS record command handlers bound to one provider and registry
pub struct DnsCommands<'a> {
    provider: &'a dyn DnsProvider,
    registry: &'a dyn RegistryStore,
}

impl<'a> DnsCommands<'a> {
    pub fn new(provider: &'a dyn DnsProvider, registry: &'a dyn RegistryStore) -> Self {
        Self { provider, registry }
    }

    /// `domain type name content [ttl [priority]]`
    pub async fn create(&self, args: &[String]) -> Result<RecordChange> {
        if args.len() < 4 {
            return Err(Error::insufficient_arguments(reply::CREATE_FORMAT));
        }

        let domain = self.find_domain(&args[0]).await?;
        let ttl = args.get(4).map_or(DEFAULT_TTL, |raw| parse_ttl(raw).unwrap_or(DEFAULT_TTL));
        let priority = args.get(5).and_then(|raw| parse_priority(raw));

        let payload = RecordPayload::new(&args[1], args[2].trim(), args[3].trim(), ttl, priority);
        let record = self.provider.create_record(&domain.zone_id, &payload).await?;

        info!(
            "Created {} record {} in {} (id: {})",
            record.record_type, record.name, domain.domain_name, record.id
        );
        Ok(RecordChange { domain, record })
    }

    /// `domain record_id type name content [ttl [priority]]` or
    /// `domain name type [content [ttl]]`
    pub async fn update(&self, args: &[String]) -> Result<RecordChange> {
        if args.len() < 4 {
            return Err(Error::insufficient_arguments(reply::UPDATE_FORMAT));
        }

        let domain = self.find_domain(&args[0]).await?;
        let rest = &args[3..];

        let (record_id, payload) = match RecordIdentifier::parse(&args[1], Some(args[2].as_str())) {
            RecordIdentifier::OpaqueId(record_id) => {
                let name = rest
                    .first()
                    .ok_or_else(|| Error::validation("record name is required"))?;
                let content = rest
                    .get(1)
                    .ok_or_else(|| Error::validation("record value is required"))?;
                let ttl = rest
                    .get(2)
                    .map_or(DEFAULT_TTL, |raw| parse_ttl(raw).unwrap_or(DEFAULT_TTL));
                let priority = rest.get(3).and_then(|raw| parse_priority(raw));

                let payload = RecordPayload::new(&args[2], name.trim(), content.trim(), ttl, priority);
                (record_id, payload)
            }
            RecordIdentifier::NameQuery { name, record_type } => {
                let existing = resolver::resolve(
                    self.provider,
                    &domain.zone_id,
                    &name,
                    record_type.as_deref(),
                )
                .await?
                .ok_or_else(|| {
                    Error::record_not_found(format!(
                        "{} (type: {})",
                        name,
                        record_type.as_deref().unwrap_or("any")
                    ))
                })?;

                let content = rest
                    .first()
                    .map_or_else(|| existing.content.clone(), |c| c.trim().to_string());
                let ttl = rest
                    .get(1)
                    .and_then(|raw| parse_ttl(raw))
                    .unwrap_or(existing.ttl);

                let payload = RecordPayload::new(
                    &existing.record_type,
                    existing.name.clone(),
                    content,
                    ttl,
                    existing.priority,
                );
                (existing.id, payload)
            }
        };

        let record = self
            .provider
            .update_record(&domain.zone_id, &record_id, &payload)
            .await?;

        info!(
            "Updated {} record {} in {} (id: {})",
            record.record_type, record.name, domain.domain_name, record_id
        );
        Ok(RecordChange { domain, record })
    }

    /// `domain record_id` or `domain name [type]`
    pub async fn delete(&self, args: &[String]) -> Result<RecordDeletion> {
        if args.len() < 2 {
            return Err(Error::insufficient_arguments(reply::DELETE_FORMAT));
        }

        let domain = self.find_domain(&args[0]).await?;

        let record_id = match RecordIdentifier::parse(&args[1], args.get(2).map(String::as_str)) {
            RecordIdentifier::OpaqueId(record_id) => record_id,
            RecordIdentifier::NameQuery { name, record_type } => {
                resolver::resolve(self.provider, &domain.zone_id, &name, record_type.as_deref())
                    .await?
                    .map(|record| record.id)
                    .ok_or_else(|| {
                        Error::record_not_found(format!(
                            "{} (type: {})",
                            name,
                            record_type.as_deref().unwrap_or("any")
                        ))
                    })?
            }
        };

        if !self.provider.delete_record(&domain.zone_id, &record_id).await? {
            return Err(Error::provider(format!(
                "deletion of record {} was not confirmed",
                record_id
            )));
        }

        info!("Deleted record {} from {}", record_id, domain.domain_name);
        Ok(RecordDeletion { domain, record_id })
    }

    /// `domain`
    pub async fn list_records(&self, args: &[String]) -> Result<RecordListing> {
        let domain_arg = args
            .first()
            .ok_or_else(|| Error::insufficient_arguments(reply::LIST_RECORDS_FORMAT))?;

        let domain = self.find_domain(domain_arg).await?;
        let records = self.provider.list_records(&domain.zone_id).await?;

        debug!("Listed {} record(s) for {}", records.len(), domain.domain_name);
        Ok(RecordListing { domain, records })
    }

    /// All registered domains, newest first
    pub async fn list_domains(&self) -> Result<Vec<DomainRegistration>> {
        self.registry.list_domains().await
    }

    /// Normalize a domain argument and look it up in the registry
    async fn find_domain(&self, raw: &str) -> Result<DomainRegistration> {
        let domain_name = normalize_domain(raw);
        if domain_name.is_empty() {
            return Err(Error::validation("domain name is required"));
        }

        self.registry
            .find_domain(&domain_name)
            .await?
            .ok_or_else(|| Error::domain_not_found(domain_name.clone()))
    }
}

/// TTL argument; `None` when unparsable or out of range
fn parse_ttl(raw: &str) -> Option<u32> {
    let ttl = parse_leading_int(raw).and_then(|v| u32::try_from(v).ok());
    if ttl.is_none() {
        warn!("Ignoring unparsable TTL argument: {}", raw);
    }
    ttl
}

/// Priority argument; `None` when unparsable or out of range
fn parse_priority(raw: &str) -> Option<u16> {
    let priority = parse_leading_int(raw).and_then(|v| u16::try_from(v).ok());
    if priority.is_none() {
        warn!("Ignoring unparsable priority argument: {}", raw);
    }
    priority
}
