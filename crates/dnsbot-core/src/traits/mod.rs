//! Core traits for the DNS bot
//!
//! This module defines the abstract interfaces that all implementations must follow.
//!
//! - [`DnsProvider`]: Zone and record operations against a provider API
//! - [`RegistryStore`]: Persisted registry of domains and authorized users
//! - [`MessageSource`] / [`ReplySink`]: Chat transport

pub mod dns_provider;
pub mod registry_store;
pub mod transport;

pub use dns_provider::{DnsProvider, DnsProviderFactory, DnsRecord, RecordPayload, Zone};
pub use registry_store::{AuthorizedUser, DomainRegistration, RegistryStore, RegistryStoreFactory};
pub use transport::{Chat, ChatKind, IncomingMessage, MessageSource, ReplySink, Sender};
