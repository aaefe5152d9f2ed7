//! Test doubles and common utilities for contract tests
//!
//! The doubles share their state through `Arc`s so a test can keep a handle
//! after boxing one into the engine.

#![allow(dead_code)]

use async_trait::async_trait;
use dnsbot_core::error::{ProviderError, Result};
use dnsbot_core::store::MemoryRegistryStore;
use dnsbot_core::traits::{
    AuthorizedUser, DnsProvider, DnsRecord, DomainRegistration, IncomingMessage, MessageSource,
    RecordPayload, RegistryStore, ReplySink, Zone,
};
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tokio_stream::Stream;
use tokio_stream::wrappers::UnboundedReceiverStream;

pub const ZONE_ID: &str = "Z1";
pub const APEX: &str = "example.com";
pub const ADMIN_ID: i64 = 1001;
pub const ADMIN_USERNAME: &str = "admin";

/// A 32-character id, long enough to be treated as opaque
pub const OPAQUE_ID: &str = "0123456789abcdef0123456789abcdef";

/// Build a record with the default TTL
pub fn record(id: &str, record_type: &str, name: &str, content: &str) -> DnsRecord {
    DnsRecord {
        id: id.to_string(),
        record_type: record_type.to_string(),
        name: name.to_string(),
        content: content.to_string(),
        ttl: 3600,
        priority: None,
        proxied: None,
    }
}

/// Turn `"a b c"` into positional arguments
pub fn args(raw: &str) -> Vec<String> {
    raw.split_whitespace().map(str::to_string).collect()
}

/// Every mutating call the provider received
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderCall {
    Create {
        zone_id: String,
        payload: RecordPayload,
    },
    Update {
        zone_id: String,
        record_id: String,
        payload: RecordPayload,
    },
    Delete {
        zone_id: String,
        record_id: String,
    },
}

#[derive(Default)]
struct ProviderState {
    records: Vec<DnsRecord>,
    calls: Vec<ProviderCall>,
    failure: Option<ProviderError>,
}

/// In-memory provider that records every call
#[derive(Clone)]
pub struct RecordingProvider {
    zone: Zone,
    state: Arc<Mutex<ProviderState>>,
    get_zone_calls: Arc<AtomicUsize>,
    list_records_calls: Arc<AtomicUsize>,
}

impl RecordingProvider {
    /// Provider serving zone `Z1` (`example.com`) with `records`
    pub fn new(records: Vec<DnsRecord>) -> Self {
        Self {
            zone: Zone {
                id: ZONE_ID.to_string(),
                name: APEX.to_string(),
                status: "active".to_string(),
                name_servers: vec!["ns1.example.net".to_string()],
            },
            state: Arc::new(Mutex::new(ProviderState {
                records,
                ..Default::default()
            })),
            get_zone_calls: Arc::new(AtomicUsize::new(0)),
            list_records_calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Make every mutating call fail with `error`
    pub fn failing_with(self, error: ProviderError) -> Self {
        self.state.lock().unwrap().failure = Some(error);
        self
    }

    pub fn get_zone_calls(&self) -> usize {
        self.get_zone_calls.load(Ordering::SeqCst)
    }

    pub fn list_records_calls(&self) -> usize {
        self.list_records_calls.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> Vec<ProviderCall> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn records(&self) -> Vec<DnsRecord> {
        self.state.lock().unwrap().records.clone()
    }

    fn check_zone(&self, zone_id: &str) -> std::result::Result<(), ProviderError> {
        if zone_id == self.zone.id {
            Ok(())
        } else {
            Err(ProviderError::with_code(1001, "Invalid zone identifier"))
        }
    }

    fn check_failure(state: &ProviderState) -> std::result::Result<(), ProviderError> {
        match &state.failure {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }

    fn build_record(id: &str, payload: &RecordPayload) -> DnsRecord {
        DnsRecord {
            id: id.to_string(),
            record_type: payload.record_type().to_string(),
            name: payload.name().to_string(),
            content: payload.content().to_string(),
            ttl: payload.ttl(),
            priority: payload.priority(),
            proxied: None,
        }
    }
}

#[async_trait]
impl DnsProvider for RecordingProvider {
    async fn create_zone(&self, domain_name: &str) -> std::result::Result<Zone, ProviderError> {
        Ok(Zone {
            name: domain_name.to_string(),
            ..self.zone.clone()
        })
    }

    async fn get_zone(&self, zone_id: &str) -> std::result::Result<Zone, ProviderError> {
        self.get_zone_calls.fetch_add(1, Ordering::SeqCst);
        self.check_zone(zone_id)?;
        Ok(self.zone.clone())
    }

    async fn list_records(&self, zone_id: &str) -> std::result::Result<Vec<DnsRecord>, ProviderError> {
        self.list_records_calls.fetch_add(1, Ordering::SeqCst);
        self.check_zone(zone_id)?;
        Ok(self.records())
    }

    async fn create_record(
        &self,
        zone_id: &str,
        payload: &RecordPayload,
    ) -> std::result::Result<DnsRecord, ProviderError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(ProviderCall::Create {
            zone_id: zone_id.to_string(),
            payload: payload.clone(),
        });
        Self::check_failure(&state)?;

        let record = Self::build_record(&format!("new{}", state.records.len()), payload);
        state.records.push(record.clone());
        Ok(record)
    }

    async fn update_record(
        &self,
        zone_id: &str,
        record_id: &str,
        payload: &RecordPayload,
    ) -> std::result::Result<DnsRecord, ProviderError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(ProviderCall::Update {
            zone_id: zone_id.to_string(),
            record_id: record_id.to_string(),
            payload: payload.clone(),
        });
        Self::check_failure(&state)?;

        let record = Self::build_record(record_id, payload);
        if let Some(existing) = state.records.iter_mut().find(|r| r.id == record_id) {
            *existing = record.clone();
        }
        Ok(record)
    }

    async fn delete_record(
        &self,
        zone_id: &str,
        record_id: &str,
    ) -> std::result::Result<bool, ProviderError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(ProviderCall::Delete {
            zone_id: zone_id.to_string(),
            record_id: record_id.to_string(),
        });
        Self::check_failure(&state)?;

        state.records.retain(|r| r.id != record_id);
        Ok(true)
    }

    fn provider_name(&self) -> &'static str {
        "recording"
    }
}

/// A message source fed by the test
pub struct ControlledMessageSource {
    rx: Mutex<Option<mpsc::UnboundedReceiver<IncomingMessage>>>,
}

impl ControlledMessageSource {
    /// Create a source and the sender that feeds it
    ///
    /// Dropping the sender ends the stream.
    pub fn new() -> (Self, mpsc::UnboundedSender<IncomingMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                rx: Mutex::new(Some(rx)),
            },
            tx,
        )
    }
}

impl MessageSource for ControlledMessageSource {
    fn messages(&self) -> Pin<Box<dyn Stream<Item = IncomingMessage> + Send + 'static>> {
        let rx = self
            .rx
            .lock()
            .unwrap()
            .take()
            .expect("messages() can only be called once");
        Box::pin(UnboundedReceiverStream::new(rx))
    }
}

/// Reply sink that keeps every reply
#[derive(Clone, Default)]
pub struct CapturingReplySink {
    replies: Arc<Mutex<Vec<(i64, String)>>>,
}

impl CapturingReplySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replies(&self) -> Vec<(i64, String)> {
        self.replies.lock().unwrap().clone()
    }
}

#[async_trait]
impl ReplySink for CapturingReplySink {
    async fn reply(&self, chat_id: i64, text: &str) -> Result<()> {
        self.replies.lock().unwrap().push((chat_id, text.to_string()));
        Ok(())
    }
}

/// Registry with `example.com` → `Z1` and one active admin user
pub async fn seeded_registry() -> MemoryRegistryStore {
    let store = MemoryRegistryStore::new();
    store
        .insert_domain(DomainRegistration::new(APEX, ZONE_ID))
        .await
        .unwrap();
    store
        .upsert_user(AuthorizedUser::new(ADMIN_USERNAME).with_telegram_id(ADMIN_ID))
        .await
        .unwrap();
    store
}
