//! Porkbun API credentials
//!
//! Resolved from a secret on every call and dropped when the call finishes.

/// Porkbun API key pair
///
/// Both keys are created at https://porkbun.com/account/api and the domain
/// must have API access enabled.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct PorkbunCredentials {
    /// Public API key (`pk1_...`)
    pub api_key: String,

    /// Secret API key (`sk1_...`)
    pub secret_key: String,
}

impl PorkbunCredentials {
    pub fn new(api_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            secret_key: secret_key.into(),
        }
    }
}

impl std::fmt::Debug for PorkbunCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PorkbunCredentials")
            .field("api_key", &mask_string(&self.api_key))
            .field("secret_key", &"***")
            .finish()
    }
}

/// Mask a string, showing only first 4 and last 4 characters
fn mask_string(s: &str) -> String {
    if s.len() <= 8 || !s.is_ascii() {
        "***".to_string()
    } else {
        format!("{}...{}", &s[..4], &s[s.len() - 4..])
    }
}
