//! Solver configuration
//!
//! Two layers: the per-request provider config carried opaquely in each
//! challenge, and the bootstrap settings the host hands to `initialize`.

use serde::de::{Error as _, Unexpected};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::errors::SolverError;
use crate::providers::PORKBUN_API_BASE;

/// Per-request provider configuration
///
/// Names the secret holding the Porkbun keys and the two fields inside it.
/// Missing fields decode as empty strings; unknown fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProviderConfig {
    pub secret_name_ref: String,
    pub api_key_secret_ref: String,
    pub secret_key_secret_ref: String,
}

impl ProviderConfig {
    /// Decode the opaque config of a challenge request.
    ///
    /// No config at all, or a JSON null, yields the empty config; the secret
    /// lookup that follows is what reports the problem. Any other non-object
    /// value, arrays included, is a decode error.
    pub fn load(raw: Option<&serde_json::Value>) -> Result<Self, SolverError> {
        match raw {
            None | Some(serde_json::Value::Null) => Ok(Self::default()),
            Some(value @ serde_json::Value::Object(_)) => {
                Self::deserialize(value).map_err(SolverError::ConfigDecode)
            }
            Some(other) => Err(SolverError::ConfigDecode(serde_json::Error::invalid_type(
                unexpected(other),
                &"a provider config object",
            ))),
        }
    }
}

fn unexpected(value: &serde_json::Value) -> Unexpected<'_> {
    match value {
        serde_json::Value::Null => Unexpected::Unit,
        serde_json::Value::Bool(b) => Unexpected::Bool(*b),
        serde_json::Value::Number(_) => Unexpected::Other("number"),
        serde_json::Value::String(s) => Unexpected::Str(s),
        serde_json::Value::Array(_) => Unexpected::Seq,
        serde_json::Value::Object(_) => Unexpected::Map,
    }
}

/// Bootstrap settings for building a `SolverContext`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolverSettings {
    /// Root directory of secret manifests (`<dir>/<namespace>/<name>.yaml`)
    pub secrets_dir: PathBuf,

    /// Porkbun API base URL
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
}

fn default_api_base_url() -> String {
    PORKBUN_API_BASE.to_string()
}

impl SolverSettings {
    pub fn new(secrets_dir: impl Into<PathBuf>) -> Self {
        Self {
            secrets_dir: secrets_dir.into(),
            api_base_url: default_api_base_url(),
        }
    }

    pub fn with_api_base_url(mut self, api_base_url: impl Into<String>) -> Self {
        self.api_base_url = api_base_url.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::SolverErrorKind;

    #[test]
    fn test_load_absent_config_is_empty() {
        let config = ProviderConfig::load(None).unwrap();
        assert_eq!(config, ProviderConfig::default());
        assert!(config.secret_name_ref.is_empty());

        let config = ProviderConfig::load(Some(&serde_json::Value::Null)).unwrap();
        assert_eq!(config, ProviderConfig::default());
    }

    #[test]
    fn test_load_full_config() {
        let raw = serde_json::json!({
            "secretNameRef": "porkbun-secret",
            "apiKeySecretRef": "api-key",
            "secretKeySecretRef": "secret-key"
        });

        let config = ProviderConfig::load(Some(&raw)).unwrap();

        assert_eq!(config.secret_name_ref, "porkbun-secret");
        assert_eq!(config.api_key_secret_ref, "api-key");
        assert_eq!(config.secret_key_secret_ref, "secret-key");
    }

    #[test]
    fn test_load_partial_config_and_unknown_fields() {
        let raw = serde_json::json!({
            "secretNameRef": "porkbun-secret",
            "zone": "ignored"
        });

        let config = ProviderConfig::load(Some(&raw)).unwrap();

        assert_eq!(config.secret_name_ref, "porkbun-secret");
        assert!(config.api_key_secret_ref.is_empty());
    }

    #[test]
    fn test_load_invalid_config() {
        let raw = serde_json::json!({ "secretNameRef": 42 });
        let err = ProviderConfig::load(Some(&raw)).unwrap_err();
        assert_eq!(err.kind(), SolverErrorKind::ConfigDecode);

        let raw = serde_json::json!("porkbun-secret");
        let err = ProviderConfig::load(Some(&raw)).unwrap_err();
        assert_eq!(err.kind(), SolverErrorKind::ConfigDecode);
    }

    #[test]
    fn test_load_rejects_non_object_config() {
        for raw in [
            serde_json::json!(["not", "an", "object"]),
            serde_json::json!(["porkbun-secret"]),
            serde_json::json!(42),
            serde_json::json!(true),
        ] {
            let err = ProviderConfig::load(Some(&raw)).unwrap_err();
            assert_eq!(err.kind(), SolverErrorKind::ConfigDecode, "config {}", raw);
        }
    }

    #[test]
    fn test_config_serialization_uses_camel_case() {
        let config = ProviderConfig {
            secret_name_ref: "s".to_string(),
            api_key_secret_ref: "a".to_string(),
            secret_key_secret_ref: "k".to_string(),
        };

        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["secretNameRef"], "s");
        assert_eq!(json["apiKeySecretRef"], "a");
        assert_eq!(json["secretKeySecretRef"], "k");
    }

    #[test]
    fn test_settings_default_api_base_url() {
        let settings: SolverSettings =
            serde_json::from_str(r#"{"secrets_dir": "/etc/porkbun"}"#).unwrap();

        assert_eq!(settings.secrets_dir, PathBuf::from("/etc/porkbun"));
        assert_eq!(settings.api_base_url, PORKBUN_API_BASE);

        let settings = SolverSettings::new("/tmp").with_api_base_url("http://localhost:9000");
        assert_eq!(settings.api_base_url, "http://localhost:9000");
    }
}
