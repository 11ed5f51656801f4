//! DNS provider trait definitions
//!
//! The solver only needs three calls from a provider: list the records of a
//! zone, create one record, and delete one record by its numeric identifier.

use async_trait::async_trait;
use std::sync::Arc;

use super::credentials::PorkbunCredentials;
use crate::errors::DnsError;

/// DNS record types as reported by the provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DnsRecordType {
    A,
    AAAA,
    CNAME,
    ALIAS,
    TXT,
    MX,
    NS,
    SRV,
    CAA,
    TLSA,
    HTTPS,
    SVCB,
    /// Anything this crate does not know about, kept verbatim
    Other(String),
}

impl std::fmt::Display for DnsRecordType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DnsRecordType::A => write!(f, "A"),
            DnsRecordType::AAAA => write!(f, "AAAA"),
            DnsRecordType::CNAME => write!(f, "CNAME"),
            DnsRecordType::ALIAS => write!(f, "ALIAS"),
            DnsRecordType::TXT => write!(f, "TXT"),
            DnsRecordType::MX => write!(f, "MX"),
            DnsRecordType::NS => write!(f, "NS"),
            DnsRecordType::SRV => write!(f, "SRV"),
            DnsRecordType::CAA => write!(f, "CAA"),
            DnsRecordType::TLSA => write!(f, "TLSA"),
            DnsRecordType::HTTPS => write!(f, "HTTPS"),
            DnsRecordType::SVCB => write!(f, "SVCB"),
            DnsRecordType::Other(other) => write!(f, "{}", other),
        }
    }
}

/// Exact, case-sensitive match on the provider's type string
impl From<&str> for DnsRecordType {
    fn from(s: &str) -> Self {
        match s {
            "A" => DnsRecordType::A,
            "AAAA" => DnsRecordType::AAAA,
            "CNAME" => DnsRecordType::CNAME,
            "ALIAS" => DnsRecordType::ALIAS,
            "TXT" => DnsRecordType::TXT,
            "MX" => DnsRecordType::MX,
            "NS" => DnsRecordType::NS,
            "SRV" => DnsRecordType::SRV,
            "CAA" => DnsRecordType::CAA,
            "TLSA" => DnsRecordType::TLSA,
            "HTTPS" => DnsRecordType::HTTPS,
            "SVCB" => DnsRecordType::SVCB,
            _ => DnsRecordType::Other(s.to_string()),
        }
    }
}

/// A DNS record as listed by the provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsRecord {
    /// Provider-specific record ID, kept as the provider reported it
    pub id: String,

    /// Fully qualified name without the trailing dot, e.g. "_acme-challenge.example.com"
    pub name: String,

    pub record_type: DnsRecordType,

    pub content: String,

    /// Time to live in seconds, if the provider reported a usable value
    pub ttl: Option<u32>,
}

/// Request to create a DNS record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsRecordRequest {
    /// Record name relative to the zone ("" for the zone root)
    pub name: String,

    pub record_type: DnsRecordType,

    pub content: String,

    /// TTL in seconds
    pub ttl: u32,
}

/// Record operations the solver consumes from a DNS provider
///
/// Each call is a single round-trip and is assumed to be atomic on the
/// provider side. Implementations do not retry.
#[async_trait]
pub trait DnsRecordProvider: Send + Sync {
    /// List all records in a zone
    async fn list_records(&self, zone: &str) -> Result<Vec<DnsRecord>, DnsError>;

    /// Create a record and return the identifier the provider assigned to it
    async fn create_record(&self, zone: &str, request: DnsRecordRequest)
        -> Result<String, DnsError>;

    /// Delete a record by identifier
    async fn delete_record(&self, zone: &str, record_id: i64) -> Result<(), DnsError>;
}

/// Builds a provider client bound to one set of credentials
pub trait ProviderFactory: Send + Sync {
    fn connect(
        &self,
        credentials: &PorkbunCredentials,
    ) -> Result<Arc<dyn DnsRecordProvider>, DnsError>;
}
