//! Contract Test: Record Resolution
//!
//! Constraints verified:
//! - `@` and the bare apex refer to each other
//! - Relative labels also match their fully-qualified form
//! - Resolution reads the zone once and the record list once
//! - Repeated resolution without mutation returns the same record
//! - Duplicate name+type records resolve to the first in provider order

mod common;

use common::*;
use dnsbot_core::resolver::{self, acceptable_names};

#[test]
fn apex_token_always_accepts_apex() {
    for apex in ["example.com", "foo.org", "a.b.c.net"] {
        let names = acceptable_names("@", apex);
        assert!(names.contains(&"@".to_string()));
        assert!(names.contains(&apex.to_string()));
    }
}

#[test]
fn relative_names_accept_fqdn_form() {
    for name in ["www", "mail", "_sip._tcp", "a.b"] {
        let names = acceptable_names(name, "example.com");
        assert!(
            names.contains(&format!("{}.example.com", name)),
            "{} should expand",
            name
        );
    }
}

#[tokio::test]
async fn resolve_reads_zone_and_records_once() {
    let provider = RecordingProvider::new(vec![record("abc", "A", "@", "1.1.1.1")]);

    let found = resolver::resolve(&provider, ZONE_ID, "@", Some("A"))
        .await
        .unwrap()
        .expect("record resolves");

    assert_eq!(found.id, "abc");
    assert_eq!(provider.get_zone_calls(), 1);
    assert_eq!(provider.list_records_calls(), 1);
    assert!(provider.calls().is_empty(), "resolution never mutates");
}

#[tokio::test]
async fn resolve_is_idempotent() {
    let provider = RecordingProvider::new(vec![
        record("r1", "CNAME", "www.example.com", "example.com"),
        record("r2", "A", "example.com", "1.1.1.1"),
    ]);

    let first = resolver::resolve(&provider, ZONE_ID, "www", None).await.unwrap();
    let second = resolver::resolve(&provider, ZONE_ID, "www", None).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(first.unwrap().id, "r1");
}

#[tokio::test]
async fn apex_token_matches_record_stored_under_apex_name() {
    let provider = RecordingProvider::new(vec![record("r2", "A", "example.com", "1.1.1.1")]);

    let found = resolver::resolve(&provider, ZONE_ID, "@", Some("a")).await.unwrap();
    assert_eq!(found.unwrap().id, "r2");
}

#[tokio::test]
async fn round_robin_duplicates_resolve_to_first() {
    let provider = RecordingProvider::new(vec![
        record("first", "A", "www.example.com", "1.1.1.1"),
        record("second", "A", "www.example.com", "2.2.2.2"),
    ]);

    let found = resolver::resolve(&provider, ZONE_ID, "www", Some("A")).await.unwrap();
    assert_eq!(found.unwrap().id, "first");
}

#[tokio::test]
async fn provider_failure_propagates() {
    let provider = RecordingProvider::new(Vec::new());

    let result = resolver::resolve(&provider, "unknown-zone", "@", None).await;
    assert!(result.is_err());
}
