//! Reply texts
//!
//! Usage help shown for bare commands, and the success/failure messages
//! sent back after execution.

use std::fmt::Write;

use crate::error::Error;
use crate::traits::DomainRegistration;

use super::dns::{RecordChange, RecordDeletion, RecordListing};

pub const CREATE_FORMAT: &str = "/createdns <domain> <type> <name> <value> [TTL] [priority]";
pub const UPDATE_FORMAT: &str = "/updatedns <domain> <name> <type> <new_value> [TTL]\n\
     or: /updatedns <domain> <record_id> <type> <name> <value> [TTL] [priority]";
pub const DELETE_FORMAT: &str =
    "/deletedns <domain> <record_id>\nor: /deletedns <domain> <name> [type]";
pub const LIST_RECORDS_FORMAT: &str = "/listdns <domain>";

pub fn welcome() -> String {
    "👋 Welcome! I manage DNS zones for registered domains.\n\n\
     📋 Available commands:\n\n\
     /listdomains - List registered domains\n\
     /listdns <domain> - List DNS records of a domain\n\
     /createdns - Create a DNS record\n\
     /updatedns - Update a DNS record\n\
     /deletedns - Delete a DNS record\n\
     /help - Show this help"
        .to_string()
}

pub fn create_usage() -> String {
    format!(
        "📝 To create a DNS record, send:\n\n{}\n\n\
         Examples:\n\
         /createdns example.com A @ 192.168.1.1\n\
         /createdns example.com CNAME www example.com\n\
         /createdns example.com MX @ mail.example.com 3600 10",
        CREATE_FORMAT
    )
}

pub fn update_usage() -> String {
    format!(
        "📝 To update a DNS record, send:\n\n{}\n\n\
         Example: /updatedns example.com @ A 192.168.1.2",
        UPDATE_FORMAT
    )
}

pub fn delete_usage() -> String {
    format!(
        "🗑️ To delete a DNS record, send:\n\n{}\n\n\
         Example: /deletedns example.com @ A",
        DELETE_FORMAT
    )
}

pub fn list_records_usage() -> String {
    format!(
        "❌ Invalid command format.\n\nUsage: {}",
        LIST_RECORDS_FORMAT
    )
}

pub fn created(change: &RecordChange) -> String {
    let record = &change.record;
    format!(
        "✅ DNS record successfully created!\n\n\
         Domain: {}\nType: {}\nName: {}\nValue: {}\nTTL: {}\nID: {}",
        change.domain.domain_name,
        record.record_type,
        record.name,
        record.content,
        record.ttl,
        record.id
    )
}

pub fn updated(change: &RecordChange) -> String {
    let record = &change.record;
    format!(
        "✅ DNS record successfully updated!\n\n\
         Domain: {}\nType: {}\nName: {}\nValue: {}\nTTL: {}",
        change.domain.domain_name, record.record_type, record.name, record.content, record.ttl
    )
}

pub fn deleted(deletion: &RecordDeletion) -> String {
    format!(
        "✅ DNS record successfully deleted!\n\nDomain: {}\nID: {}",
        deletion.domain.domain_name, deletion.record_id
    )
}

pub fn record_list(listing: &RecordListing) -> String {
    if listing.records.is_empty() {
        return format!(
            "📭 No DNS records for domain {}.",
            listing.domain.domain_name
        );
    }

    let mut message = format!("📋 DNS records for {}:\n\n", listing.domain.domain_name);
    for (index, record) in listing.records.iter().enumerate() {
        let _ = writeln!(message, "{}. {}", index + 1, record.name);
        let _ = writeln!(message, "   Type: {}", record.record_type);
        let _ = writeln!(message, "   Value: {}", record.content);
        let _ = writeln!(message, "   TTL: {}", record.ttl);
        if let Some(priority) = record.priority {
            let _ = writeln!(message, "   Priority: {}", priority);
        }
        let _ = writeln!(message, "   ID: {}\n", record.id);
    }
    message
}

pub fn domain_list(domains: &[DomainRegistration]) -> String {
    if domains.is_empty() {
        return "📭 No domains registered.".to_string();
    }

    let mut message = "📋 Registered domains:\n\n".to_string();
    for (index, domain) in domains.iter().enumerate() {
        let _ = writeln!(message, "{}. {}", index + 1, domain.domain_name);
        let _ = writeln!(message, "   Zone ID: {}", domain.zone_id);
        let _ = writeln!(message, "   Date: {}\n", domain.created_at.format("%Y-%m-%d"));
    }
    message
}

/// User-facing text for a failed command
pub fn failure(error: &Error) -> String {
    match error {
        Error::DomainNotFound(domain) => format!("❌ Domain {} not found.", domain),
        Error::RecordNotFound(_) => "❌ DNS record not found.".to_string(),
        Error::InsufficientArguments(format) => {
            format!("❌ Not enough parameters.\n\nFormat: {}", format)
        }
        Error::Provider(provider_error) => format!("❌ Error: {}", provider_error.message),
        Error::Validation(msg) => format!("❌ Invalid input: {}", msg),
        other => format!("❌ Error: {}", other),
    }
}

pub fn access_denied_chat() -> String {
    "You do not have access to this bot in this chat.".to_string()
}

pub fn access_denied_user() -> String {
    "❌ You do not have access to this bot.\n\nContact the administrator to get access."
        .to_string()
}

pub fn internal_error() -> String {
    "An error occurred. Please try again later.".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderError;
    use crate::traits::DnsRecord;

    fn change() -> RecordChange {
        RecordChange {
            domain: DomainRegistration::new("example.com", "Z1"),
            record: DnsRecord {
                id: "abc".to_string(),
                record_type: "A".to_string(),
                name: "example.com".to_string(),
                content: "1.1.1.1".to_string(),
                ttl: 3600,
                priority: None,
                proxied: None,
            },
        }
    }

    #[test]
    fn created_reply_echoes_record() {
        let text = created(&change());
        assert!(text.contains("Type: A"));
        assert!(text.contains("Value: 1.1.1.1"));
        assert!(text.contains("ID: abc"));
    }

    #[test]
    fn failure_replies_per_error_kind() {
        assert_eq!(
            failure(&Error::domain_not_found("example.org")),
            "❌ Domain example.org not found."
        );
        assert_eq!(
            failure(&Error::record_not_found("www (type: A)")),
            "❌ DNS record not found."
        );
        assert!(failure(&Error::insufficient_arguments(CREATE_FORMAT)).contains("/createdns <domain>"));
        assert_eq!(
            failure(&Error::Provider(ProviderError::with_code(1004, "DNS Validation Error"))),
            "❌ Error: DNS Validation Error"
        );
    }

    #[test]
    fn empty_lists() {
        assert_eq!(domain_list(&[]), "📭 No domains registered.");
        let listing = RecordListing {
            domain: DomainRegistration::new("example.com", "Z1"),
            records: Vec::new(),
        };
        assert!(record_list(&listing).contains("No DNS records"));
    }

    #[test]
    fn record_list_numbers_entries() {
        let listing = RecordListing {
            domain: DomainRegistration::new("example.com", "Z1"),
            records: vec![change().record],
        };
        let text = record_list(&listing);
        assert!(text.starts_with("📋 DNS records for example.com:"));
        assert!(text.contains("1. example.com"));
        assert!(text.contains("ID: abc"));
    }
}
