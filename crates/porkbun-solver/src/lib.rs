//! Porkbun DNS-01 challenge solver
//!
//! This crate proves control of a domain for ACME DNS-01 challenges by
//! creating a transient TXT record through the Porkbun API and removing it
//! afterwards.
//!
//! # Components
//!
//! - **Credential resolution**: the request's opaque config names a secret and
//!   two fields inside it; those are read on every call.
//! - **Reconciliation**: the zone's record set is listed and at most one create
//!   or one delete is issued to reach the desired state.
//!
//! # Usage
//!
//! ```ignore
//! use porkbun_solver::{ChallengeSolver, PorkbunSolver, SolverContext, SolverSettings};
//!
//! let mut solver = PorkbunSolver::new();
//! solver
//!     .initialize(SolverContext::from_settings(&SolverSettings::new("/etc/porkbun/secrets")))
//!     .await?;
//!
//! solver.present(&challenge).await?;
//! // ... ACME validation ...
//! solver.clean_up(&challenge).await?;
//! ```

pub mod config;
pub mod errors;
pub mod providers;
pub mod reconciler;
pub mod resolver;
pub mod secrets;
pub mod solver;

// Re-export main types
pub use config::{ProviderConfig, SolverSettings};
pub use errors::{DnsError, SecretStoreError, SolverError, SolverErrorKind};
pub use providers::{
    DnsRecord, DnsRecordProvider, DnsRecordRequest, DnsRecordType, PorkbunCredentials,
    PorkbunProvider, PorkbunProviderFactory, ProviderFactory,
};
pub use reconciler::{
    AbsentOutcome, ChallengeReconciler, ChallengeTarget, PresentOutcome, CHALLENGE_RECORD_TTL,
};
pub use resolver::CredentialResolver;
pub use secrets::{FileSecretStore, InMemorySecretStore, SecretData, SecretStore};
pub use solver::{ChallengeRequest, ChallengeSolver, PorkbunSolver, SolverContext, SOLVER_NAME};
