//! Challenge record reconciliation
//!
//! Converges the provider's live record set towards one of two states for a
//! challenge: "a TXT record with this content exists at this name" or "no TXT
//! record with this content exists at this name". The provider listing is the
//! only source of truth and is fetched on every call.
//!
//! Both directions are idempotent. Racing calls for the same challenge may
//! create duplicates; clean up removes one match per call, so repeated calls
//! converge.

use tracing::{debug, info};

use crate::errors::SolverError;
use crate::providers::{DnsRecord, DnsRecordProvider, DnsRecordRequest, DnsRecordType};

/// TTL, in seconds, of every challenge record we create
pub const CHALLENGE_RECORD_TTL: u32 = 60;

/// Normalised names for one challenge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChallengeTarget {
    /// Zone as the provider API addresses it, e.g. "example.com"
    pub zone: String,
    /// Challenge FQDN without the trailing dot; compared against listed names
    pub full_name: String,
    /// `full_name` relative to the zone; only sent on create
    pub record_name: String,
}

impl ChallengeTarget {
    /// Build a target from the dotted zone and FQDN of a challenge request
    ///
    /// One trailing dot is stripped from both. `record_name` is the FQDN with
    /// `.<zone>` removed; a challenge at the zone apex gets an empty
    /// `record_name`, which Porkbun reads as the zone root. An FQDN outside
    /// the zone is passed through unchanged.
    pub fn new(domain_zone: &str, resolved_fqdn: &str) -> Self {
        let zone = strip_trailing_dot(domain_zone);
        let full_name = strip_trailing_dot(resolved_fqdn);

        let record_name = if full_name == zone {
            ""
        } else {
            full_name
                .strip_suffix(zone)
                .and_then(|host| host.strip_suffix('.'))
                .unwrap_or(full_name)
        };

        Self {
            zone: zone.to_string(),
            full_name: full_name.to_string(),
            record_name: record_name.to_string(),
        }
    }

    fn matches(&self, record: &DnsRecord, key: &str) -> bool {
        record.record_type == DnsRecordType::TXT
            && record.name == self.full_name
            && record.content == key
    }
}

/// Strips exactly one trailing dot
fn strip_trailing_dot(name: &str) -> &str {
    name.strip_suffix('.').unwrap_or(name)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresentOutcome {
    AlreadyPresent { id: String },
    Created { id: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbsentOutcome {
    NotFound,
    Deleted { id: i64 },
}

pub struct ChallengeReconciler<'a> {
    provider: &'a dyn DnsRecordProvider,
}

impl<'a> ChallengeReconciler<'a> {
    pub fn new(provider: &'a dyn DnsRecordProvider) -> Self {
        Self { provider }
    }

    async fn list(&self, target: &ChallengeTarget) -> Result<Vec<DnsRecord>, SolverError> {
        self.provider
            .list_records(&target.zone)
            .await
            .map_err(|source| SolverError::ProviderList {
                zone: target.zone.clone(),
                source,
            })
    }

    /// Make sure a TXT record with `key` exists at the target name.
    ///
    /// Other TXT records at the same name are left untouched.
    pub async fn ensure_present(
        &self,
        target: &ChallengeTarget,
        key: &str,
    ) -> Result<PresentOutcome, SolverError> {
        let records = self.list(target).await?;

        if let Some(existing) = records.iter().find(|r| target.matches(r, key)) {
            info!("Record {} is already present", existing.id);
            return Ok(PresentOutcome::AlreadyPresent {
                id: existing.id.clone(),
            });
        }

        let request = DnsRecordRequest {
            name: target.record_name.clone(),
            record_type: DnsRecordType::TXT,
            content: key.to_string(),
            ttl: CHALLENGE_RECORD_TTL,
        };

        debug!(
            "Creating TXT record {:?} in zone {}",
            request.name, target.zone
        );

        let id = self
            .provider
            .create_record(&target.zone, request)
            .await
            .map_err(|source| SolverError::ProviderCreate {
                zone: target.zone.clone(),
                name: target.full_name.clone(),
                source,
            })?;

        info!("Created record {}", id);
        Ok(PresentOutcome::Created { id })
    }

    /// Make sure no TXT record with `key` exists at the target name.
    ///
    /// Deletes the first match only. Duplicates need another call each.
    pub async fn ensure_absent(
        &self,
        target: &ChallengeTarget,
        key: &str,
    ) -> Result<AbsentOutcome, SolverError> {
        let records = self.list(target).await?;

        let Some(record) = records.into_iter().find(|r| target.matches(r, key)) else {
            info!("No matching record to delete");
            return Ok(AbsentOutcome::NotFound);
        };

        // Any id in the i64 range is accepted, not just 32-bit ones
        let id: i64 = record
            .id
            .parse()
            .map_err(|source| SolverError::MalformedRecordId {
                id: record.id.clone(),
                source,
            })?;

        self.provider
            .delete_record(&target.zone, id)
            .await
            .map_err(|source| SolverError::ProviderDelete {
                zone: target.zone.clone(),
                id,
                source,
            })?;

        info!("Deleted record {}", id);
        Ok(AbsentOutcome::Deleted { id })
    }
}
