//! DNS provider implementations
//!
//! This module contains the provider trait the solver consumes and the
//! Porkbun implementation of it.

pub mod credentials;
pub mod porkbun;
pub mod traits;

// Re-export commonly used types
pub use credentials::PorkbunCredentials;
pub use porkbun::{PorkbunProvider, PorkbunProviderFactory, PORKBUN_API_BASE};
pub use traits::{DnsRecord, DnsRecordProvider, DnsRecordRequest, DnsRecordType, ProviderFactory};
