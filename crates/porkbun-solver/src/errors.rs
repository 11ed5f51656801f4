//! Error types for the solver and its provider/secret collaborators

use thiserror::Error;

/// DNS provider errors
#[derive(Error, Debug)]
pub enum DnsError {
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Client setup failed: {0}")]
    ClientSetup(String),
}

/// Secret store errors
#[derive(Error, Debug)]
pub enum SecretStoreError {
    #[error("secret `{namespace}/{name}` not found")]
    NotFound { namespace: String, name: String },

    #[error("failed to read secret `{namespace}/{name}`: {message}")]
    Backend {
        namespace: String,
        name: String,
        message: String,
    },
}

/// Coarse classification of a [`SolverError`], for hosts that route on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolverErrorKind {
    NotInitialized,
    ConfigDecode,
    SecretNotFound,
    SecretStore,
    SecretFieldMissing,
    ProviderSetup,
    ProviderList,
    ProviderCreate,
    ProviderDelete,
    MalformedRecordId,
}

/// Errors returned from `present` / `clean_up`.
///
/// Every variant is terminal for the current call. Retrying is up to the host.
#[derive(Error, Debug)]
pub enum SolverError {
    #[error("solver used before initialize was called")]
    NotInitialized,

    #[error("error decoding solver config: {0}")]
    ConfigDecode(#[source] serde_json::Error),

    #[error("unable to get secret `{namespace}/{name}`: not found")]
    SecretNotFound { namespace: String, name: String },

    #[error("unable to get secret `{namespace}/{name}`: {message}")]
    SecretStore {
        namespace: String,
        name: String,
        message: String,
    },

    #[error("key {field:?} not found in secret `{namespace}/{name}`")]
    SecretFieldMissing {
        field: String,
        namespace: String,
        name: String,
    },

    #[error("failed to set up provider client")]
    ProviderSetup(#[source] DnsError),

    #[error("retrieve records error for zone {zone}")]
    ProviderList {
        zone: String,
        #[source]
        source: DnsError,
    },

    #[error("create record error for {name} in zone {zone}")]
    ProviderCreate {
        zone: String,
        name: String,
        #[source]
        source: DnsError,
    },

    #[error("delete record error for record {id} in zone {zone}")]
    ProviderDelete {
        zone: String,
        id: i64,
        #[source]
        source: DnsError,
    },

    #[error("found TXT record, but its ID {id:?} is malformed")]
    MalformedRecordId {
        id: String,
        #[source]
        source: std::num::ParseIntError,
    },
}

impl SolverError {
    pub fn kind(&self) -> SolverErrorKind {
        match self {
            SolverError::NotInitialized => SolverErrorKind::NotInitialized,
            SolverError::ConfigDecode(_) => SolverErrorKind::ConfigDecode,
            SolverError::SecretNotFound { .. } => SolverErrorKind::SecretNotFound,
            SolverError::SecretStore { .. } => SolverErrorKind::SecretStore,
            SolverError::SecretFieldMissing { .. } => SolverErrorKind::SecretFieldMissing,
            SolverError::ProviderSetup(_) => SolverErrorKind::ProviderSetup,
            SolverError::ProviderList { .. } => SolverErrorKind::ProviderList,
            SolverError::ProviderCreate { .. } => SolverErrorKind::ProviderCreate,
            SolverError::ProviderDelete { .. } => SolverErrorKind::ProviderDelete,
            SolverError::MalformedRecordId { .. } => SolverErrorKind::MalformedRecordId,
        }
    }
}

impl From<SecretStoreError> for SolverError {
    fn from(err: SecretStoreError) -> Self {
        match err {
            SecretStoreError::NotFound { namespace, name } => {
                SolverError::SecretNotFound { namespace, name }
            }
            SecretStoreError::Backend {
                namespace,
                name,
                message,
            } => SolverError::SecretStore {
                namespace,
                name,
                message,
            },
        }
    }
}
