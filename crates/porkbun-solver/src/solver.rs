//! Host-facing solver
//!
//! The host calls [`ChallengeSolver::initialize`] once, then any number of
//! `present` / `clean_up` calls. Each call resolves credentials afresh,
//! connects a provider client and runs one reconciliation.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::SolverSettings;
use crate::errors::SolverError;
use crate::providers::{DnsRecordProvider, PorkbunProviderFactory, ProviderFactory};
use crate::reconciler::{ChallengeReconciler, ChallengeTarget};
use crate::resolver::CredentialResolver;
use crate::secrets::{FileSecretStore, SecretStore};

pub const SOLVER_NAME: &str = "porkbun";

/// A DNS-01 challenge as handed over by the host
///
/// Field names on the wire follow cert-manager's webhook `ChallengeRequest`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,

    /// "Present" or "CleanUp"; informational only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dns_name: Option<String>,

    /// Zone the challenge lives in, with trailing dot
    #[serde(rename = "resolvedZone")]
    pub domain_zone: String,

    /// Challenge record FQDN, with trailing dot
    #[serde(rename = "resolvedFQDN")]
    pub resolved_fqdn: String,

    /// TXT record content
    pub key: String,

    /// Namespace the credential secret is looked up in
    #[serde(rename = "resourceNamespace", default)]
    pub namespace: String,

    /// Opaque provider config; see `ProviderConfig`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<serde_json::Value>,
}

/// Handles a solver needs for its whole lifetime
#[derive(Clone)]
pub struct SolverContext {
    pub secrets: Arc<dyn SecretStore>,
    pub providers: Arc<dyn ProviderFactory>,
}

impl SolverContext {
    pub fn new(secrets: Arc<dyn SecretStore>, providers: Arc<dyn ProviderFactory>) -> Self {
        Self { secrets, providers }
    }

    /// File-backed secrets and the Porkbun HTTP API
    pub fn from_settings(settings: &SolverSettings) -> Self {
        Self {
            secrets: Arc::new(FileSecretStore::new(settings.secrets_dir.clone())),
            providers: Arc::new(PorkbunProviderFactory::new(settings.api_base_url.clone())),
        }
    }
}

/// Lifecycle a DNS-01 solver exposes to its host
#[async_trait]
pub trait ChallengeSolver: Send + Sync {
    /// Identifier the host routes requests by
    fn name(&self) -> &'static str;

    async fn initialize(&mut self, context: SolverContext) -> Result<(), SolverError>;

    async fn present(&self, challenge: &ChallengeRequest) -> Result<(), SolverError>;

    async fn clean_up(&self, challenge: &ChallengeRequest) -> Result<(), SolverError>;
}

/// Porkbun DNS-01 solver
#[derive(Default)]
pub struct PorkbunSolver {
    context: Option<SolverContext>,
}

impl PorkbunSolver {
    pub fn new() -> Self {
        Self::default()
    }

    fn context(&self) -> Result<&SolverContext, SolverError> {
        self.context.as_ref().ok_or(SolverError::NotInitialized)
    }

    async fn connect(
        &self,
        challenge: &ChallengeRequest,
    ) -> Result<Arc<dyn DnsRecordProvider>, SolverError> {
        let context = self.context()?;

        let credentials = CredentialResolver::new(context.secrets.as_ref())
            .resolve(&challenge.namespace, challenge.config.as_ref())
            .await?;

        context
            .providers
            .connect(&credentials)
            .map_err(SolverError::ProviderSetup)
    }
}

#[async_trait]
impl ChallengeSolver for PorkbunSolver {
    fn name(&self) -> &'static str {
        SOLVER_NAME
    }

    async fn initialize(&mut self, context: SolverContext) -> Result<(), SolverError> {
        info!("Initializing");
        self.context = Some(context);
        Ok(())
    }

    async fn present(&self, challenge: &ChallengeRequest) -> Result<(), SolverError> {
        info!("Handling present request for {:?}", challenge.resolved_fqdn);
        debug!("Challenge key {:?}", challenge.key);

        let provider = self.connect(challenge).await?;
        let target = ChallengeTarget::new(&challenge.domain_zone, &challenge.resolved_fqdn);

        ChallengeReconciler::new(provider.as_ref())
            .ensure_present(&target, &challenge.key)
            .await?;

        Ok(())
    }

    async fn clean_up(&self, challenge: &ChallengeRequest) -> Result<(), SolverError> {
        info!("Handling cleanup request for {:?}", challenge.resolved_fqdn);
        debug!("Challenge key {:?}", challenge.key);

        let provider = self.connect(challenge).await?;
        let target = ChallengeTarget::new(&challenge.domain_zone, &challenge.resolved_fqdn);

        ChallengeReconciler::new(provider.as_ref())
            .ensure_absent(&target, &challenge.key)
            .await?;

        Ok(())
    }
}
