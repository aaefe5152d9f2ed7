//! Record identity resolution
//!
//! Maps a human-typed record reference onto one live record of a zone.
//!
//! A reference is either an opaque provider id (any token longer than
//! [`OPAQUE_ID_MIN_LEN`] characters) or a name with an optional type. Names
//! may be the apex token `@`, the bare apex, a label relative to the apex, or
//! a fully-qualified name.
//!
//! ## Known limitation
//!
//! Several records may share a name and type (round-robin A records). The
//! resolver does not disambiguate them: the first match in the provider's
//! list order wins.

use crate::error::Result;
use crate::traits::DnsProvider;
use crate::traits::dns_provider::{DnsRecord, normalize_record_type};
use tracing::debug;

/// Tokens longer than this are treated as opaque record ids
pub const OPAQUE_ID_MIN_LEN: usize = 20;

/// The apex token
pub const APEX: &str = "@";

/// How a command refers to a record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordIdentifier {
    /// Provider-assigned id, used without lookup
    OpaqueId(String),
    /// Name (and optionally type) to resolve against the live record set
    NameQuery {
        name: String,
        record_type: Option<String>,
    },
}

impl RecordIdentifier {
    /// Classify a token
    ///
    /// `record_type` only applies to name queries; it is ignored for opaque
    /// ids.
    pub fn parse(token: &str, record_type: Option<&str>) -> Self {
        if token.chars().count() > OPAQUE_ID_MIN_LEN {
            RecordIdentifier::OpaqueId(token.to_string())
        } else {
            RecordIdentifier::NameQuery {
                name: token.to_string(),
                record_type: record_type.map(normalize_record_type),
            }
        }
    }

    pub fn is_opaque(&self) -> bool {
        matches!(self, RecordIdentifier::OpaqueId(_))
    }
}

/// Every stored name that `supplied` may refer to within zone `apex`
///
/// The supplied name itself is always first.
pub fn acceptable_names(supplied: &str, apex: &str) -> Vec<String> {
    let mut names = vec![supplied.to_string()];
    let fqdn_suffix = format!(".{}", apex);

    if supplied == APEX {
        names.push(apex.to_string());
    } else if supplied == apex {
        names.push(APEX.to_string());
    } else if !supplied.ends_with(&fqdn_suffix) {
        names.push(format!("{}{}", supplied, fqdn_suffix));
    }

    names
}

/// Whether `record` matches any of `names` and, if given, `record_type`
fn matches(record: &DnsRecord, names: &[String], record_type: Option<&str>) -> bool {
    names.iter().any(|n| *n == record.name)
        && record_type.is_none_or(|t| record.record_type == t)
}

/// First record in `records` that `name`/`record_type` refers to
pub fn find_match<'a>(
    records: &'a [DnsRecord],
    apex: &str,
    name: &str,
    record_type: Option<&str>,
) -> Option<&'a DnsRecord> {
    let names = acceptable_names(name, apex);
    let record_type = record_type.map(normalize_record_type);

    records
        .iter()
        .find(|record| matches(record, &names, record_type.as_deref()))
}

/// Resolve a name (and optional type) to a live record
///
/// Makes exactly one `get_zone` and one `list_records` call.
///
/// # Returns
///
/// - `Ok(Some(record))`: first match in provider order
/// - `Ok(None)`: nothing matched
/// - `Err(Error)`: provider call failed
pub async fn resolve(
    provider: &dyn DnsProvider,
    zone_id: &str,
    name: &str,
    record_type: Option<&str>,
) -> Result<Option<DnsRecord>> {
    let zone = provider.get_zone(zone_id).await?;
    let records = provider.list_records(zone_id).await?;

    debug!(
        "Resolving {} (type: {}) among {} record(s) of {}",
        name,
        record_type.unwrap_or("any"),
        records.len(),
        zone.name
    );

    Ok(find_match(&records, &zone.name, name, record_type).cloned())
}
