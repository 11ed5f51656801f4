//! Credential resolution
//!
//! Maps the opaque provider config of a request to Porkbun API keys by reading
//! the referenced secret. Nothing is cached: secrets may rotate between a
//! present and the matching clean up.

use tracing::debug;

use crate::config::ProviderConfig;
use crate::errors::SolverError;
use crate::providers::PorkbunCredentials;
use crate::secrets::{SecretData, SecretStore};

pub struct CredentialResolver<'a> {
    secrets: &'a dyn SecretStore,
}

impl<'a> CredentialResolver<'a> {
    pub fn new(secrets: &'a dyn SecretStore) -> Self {
        Self { secrets }
    }

    pub async fn resolve(
        &self,
        namespace: &str,
        config: Option<&serde_json::Value>,
    ) -> Result<PorkbunCredentials, SolverError> {
        let config = ProviderConfig::load(config)?;
        let secret_name = config.secret_name_ref.as_str();

        debug!("Resolving credentials from secret {}/{}", namespace, secret_name);

        let data = self.secrets.get_secret(namespace, secret_name).await?;

        let api_key =
            string_from_secret_data(&data, &config.api_key_secret_ref, namespace, secret_name)?;
        let secret_key =
            string_from_secret_data(&data, &config.secret_key_secret_ref, namespace, secret_name)?;

        Ok(PorkbunCredentials {
            api_key,
            secret_key,
        })
    }
}

fn string_from_secret_data(
    data: &SecretData,
    field: &str,
    namespace: &str,
    secret_name: &str,
) -> Result<String, SolverError> {
    data.get(field)
        .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
        .ok_or_else(|| SolverError::SecretFieldMissing {
            field: field.to_string(),
            namespace: namespace.to_string(),
            name: secret_name.to_string(),
        })
}
