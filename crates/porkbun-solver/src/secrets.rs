//! Secret store capability
//!
//! Credentials live in Kubernetes-style secrets addressed by namespace and
//! name. The solver only ever reads them.

use async_trait::async_trait;
use base64::Engine;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tracing::debug;

use crate::errors::SecretStoreError;

/// Key/value payload of a secret
pub type SecretData = HashMap<String, Vec<u8>>;

/// Read access to secrets by namespace and name
#[async_trait]
pub trait SecretStore: Send + Sync {
    async fn get_secret(&self, namespace: &str, name: &str) -> Result<SecretData, SecretStoreError>;
}

/// Secrets held in memory, keyed by `(namespace, name)`
#[derive(Default)]
pub struct InMemorySecretStore {
    secrets: RwLock<HashMap<(String, String), SecretData>>,
}

impl InMemorySecretStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a secret
    pub fn insert<I, K, V>(&self, namespace: &str, name: &str, data: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Vec<u8>>,
    {
        let data = data
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self.secrets
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert((namespace.to_string(), name.to_string()), data);
    }

    pub fn with_secret<I, K, V>(self, namespace: &str, name: &str, data: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Vec<u8>>,
    {
        self.insert(namespace, name, data);
        self
    }
}

#[async_trait]
impl SecretStore for InMemorySecretStore {
    async fn get_secret(&self, namespace: &str, name: &str) -> Result<SecretData, SecretStoreError> {
        self.secrets
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(&(namespace.to_string(), name.to_string()))
            .cloned()
            .ok_or_else(|| SecretStoreError::NotFound {
                namespace: namespace.to_string(),
                name: name.to_string(),
            })
    }
}

/// Kubernetes `Secret` manifest, reduced to the fields we read
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SecretManifest {
    /// base64-encoded values
    #[serde(default)]
    data: HashMap<String, String>,
    /// plain values; win over `data` on conflict, as in Kubernetes
    #[serde(default)]
    string_data: HashMap<String, String>,
}

const MANIFEST_EXTENSIONS: [&str; 3] = ["yaml", "yml", "json"];

/// Secrets stored as manifests under `<root>/<namespace>/<name>.{yaml,yml,json}`
///
/// Files are read on every lookup so rotated secrets are picked up.
#[derive(Debug, Clone)]
pub struct FileSecretStore {
    root: PathBuf,
}

impl FileSecretStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn is_valid_segment(segment: &str) -> bool {
        !segment.is_empty()
            && segment != "."
            && segment != ".."
            && !segment.contains(['/', '\\'])
    }

    fn parse_manifest(
        namespace: &str,
        name: &str,
        raw: &str,
    ) -> Result<SecretData, SecretStoreError> {
        let backend_error = |message: String| SecretStoreError::Backend {
            namespace: namespace.to_string(),
            name: name.to_string(),
            message,
        };

        let manifest: SecretManifest = serde_yaml::from_str(raw)
            .map_err(|e| backend_error(format!("invalid secret manifest: {}", e)))?;

        let mut data = SecretData::new();
        for (key, value) in manifest.data {
            let decoded = base64::engine::general_purpose::STANDARD
                .decode(value.trim())
                .map_err(|e| backend_error(format!("data field {:?} is not base64: {}", key, e)))?;
            data.insert(key, decoded);
        }
        for (key, value) in manifest.string_data {
            data.insert(key, value.into_bytes());
        }

        Ok(data)
    }
}

#[async_trait]
impl SecretStore for FileSecretStore {
    async fn get_secret(&self, namespace: &str, name: &str) -> Result<SecretData, SecretStoreError> {
        let not_found = || SecretStoreError::NotFound {
            namespace: namespace.to_string(),
            name: name.to_string(),
        };

        if !Self::is_valid_segment(namespace) || !Self::is_valid_segment(name) {
            return Err(not_found());
        }

        let dir = self.root.join(namespace);
        for extension in MANIFEST_EXTENSIONS {
            let path = dir.join(format!("{}.{}", name, extension));
            match tokio::fs::read_to_string(&path).await {
                Ok(raw) => {
                    debug!("Loaded secret {}/{} from {}", namespace, name, path.display());
                    return Self::parse_manifest(namespace, name, &raw);
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => {
                    return Err(SecretStoreError::Backend {
                        namespace: namespace.to_string(),
                        name: name.to_string(),
                        message: format!("failed to read {}: {}", path.display(), e),
                    })
                }
            }
        }

        Err(not_found())
    }
}
