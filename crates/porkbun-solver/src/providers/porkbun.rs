//! Porkbun DNS provider implementation
//!
//! This provider uses the Porkbun JSON API (v3) to manage DNS records.
//! Every endpoint is a POST whose body carries the API key pair.
//!
//! Create keys at: https://porkbun.com/account/api

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

use super::credentials::PorkbunCredentials;
use super::traits::{DnsRecord, DnsRecordProvider, DnsRecordRequest, DnsRecordType, ProviderFactory};
use crate::errors::DnsError;

pub const PORKBUN_API_BASE: &str = "https://api.porkbun.com/api/json/v3";

const STATUS_SUCCESS: &str = "SUCCESS";

/// Porkbun DNS provider
pub struct PorkbunProvider {
    client: Client,
    credentials: PorkbunCredentials,
    base_url: String,
}

/// Authentication fields sent with every request
#[derive(Debug, Serialize)]
struct AuthBody<'a> {
    apikey: &'a str,
    secretapikey: &'a str,
}

#[derive(Debug, Serialize)]
struct CreateRecordBody<'a> {
    #[serde(flatten)]
    auth: AuthBody<'a>,
    name: &'a str,
    #[serde(rename = "type")]
    record_type: String,
    content: &'a str,
    ttl: String,
}

/// Porkbun API response structures
#[derive(Debug, Deserialize)]
struct StatusEnvelope {
    status: String,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RetrieveResponse {
    #[serde(default)]
    records: Vec<PorkbunRecord>,
}

#[derive(Debug, Deserialize)]
struct CreateResponse {
    id: RecordId,
}

#[derive(Debug, Deserialize)]
struct PorkbunRecord {
    id: RecordId,
    name: String,
    #[serde(rename = "type")]
    record_type: String,
    content: String,
    #[serde(default)]
    ttl: Option<String>,
}

/// Porkbun reports ids as strings when listing and as numbers when creating
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum RecordId {
    Text(String),
    Number(i64),
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordId::Text(id) => write!(f, "{}", id),
            RecordId::Number(id) => write!(f, "{}", id),
        }
    }
}

impl PorkbunProvider {
    /// Create a new Porkbun provider with the given credentials
    pub fn new(credentials: PorkbunCredentials) -> Result<Self, DnsError> {
        Self::with_base_url(credentials, PORKBUN_API_BASE.to_string())
    }

    /// Create a provider against a custom API base URL
    pub fn with_base_url(
        credentials: PorkbunCredentials,
        base_url: String,
    ) -> Result<Self, DnsError> {
        // No request timeout: cancellation belongs to whoever drives the future.
        let client = Client::builder()
            .user_agent(concat!("porkbun-solver/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| DnsError::ClientSetup(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            credentials,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn auth(&self) -> AuthBody<'_> {
        AuthBody {
            apikey: &self.credentials.api_key,
            secretapikey: &self.credentials.secret_key,
        }
    }

    /// POST to a Porkbun endpoint and decode a successful response
    async fn api_post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &impl Serialize,
    ) -> Result<T, DnsError> {
        let url = format!("{}{}", self.base_url, path);

        debug!("Porkbun API request: POST {}", path);

        let response = self.client.post(&url).json(body).send().await?;
        let status = response.status();
        let response_text = response.text().await?;

        let envelope = serde_json::from_str::<StatusEnvelope>(&response_text).ok();

        if !status.is_success() {
            let message = envelope
                .and_then(|e| e.message)
                .unwrap_or_else(|| response_text.clone());
            return Err(DnsError::Api {
                status: status.as_u16(),
                message,
            });
        }

        match envelope {
            Some(envelope) if envelope.status == STATUS_SUCCESS => {}
            Some(envelope) => {
                return Err(DnsError::Api {
                    status: status.as_u16(),
                    message: envelope
                        .message
                        .unwrap_or_else(|| format!("status {}", envelope.status)),
                })
            }
            None => {
                return Err(DnsError::InvalidResponse(format!(
                    "missing status field - Body: {}",
                    response_text
                )))
            }
        }

        serde_json::from_str(&response_text).map_err(|e| {
            DnsError::InvalidResponse(format!(
                "Failed to parse response: {} - Body: {}",
                e, response_text
            ))
        })
    }

    fn convert_record(record: PorkbunRecord) -> DnsRecord {
        DnsRecord {
            id: record.id.to_string(),
            name: record.name,
            record_type: DnsRecordType::from(record.record_type.as_str()),
            content: record.content,
            ttl: record.ttl.and_then(|ttl| ttl.parse().ok()),
        }
    }

    fn build_create_body<'a>(&'a self, request: &'a DnsRecordRequest) -> CreateRecordBody<'a> {
        CreateRecordBody {
            auth: self.auth(),
            name: &request.name,
            record_type: request.record_type.to_string(),
            content: &request.content,
            ttl: request.ttl.to_string(),
        }
    }
}

#[async_trait]
impl DnsRecordProvider for PorkbunProvider {
    async fn list_records(&self, zone: &str) -> Result<Vec<DnsRecord>, DnsError> {
        let path = format!("/dns/retrieve/{}", zone);
        let response: RetrieveResponse = self.api_post(&path, &self.auth()).await?;

        Ok(response
            .records
            .into_iter()
            .map(Self::convert_record)
            .collect())
    }

    async fn create_record(
        &self,
        zone: &str,
        request: DnsRecordRequest,
    ) -> Result<String, DnsError> {
        let path = format!("/dns/create/{}", zone);
        let body = self.build_create_body(&request);
        let response: CreateResponse = self.api_post(&path, &body).await?;

        info!(
            "Created {} record {:?} in zone {} with id {}",
            request.record_type, request.name, zone, response.id
        );

        Ok(response.id.to_string())
    }

    async fn delete_record(&self, zone: &str, record_id: i64) -> Result<(), DnsError> {
        let path = format!("/dns/delete/{}/{}", zone, record_id);
        let _: StatusEnvelope = self.api_post(&path, &self.auth()).await?;

        info!("Deleted record {} from zone {}", record_id, zone);

        Ok(())
    }
}

/// Builds a [`PorkbunProvider`] per call from freshly resolved credentials
#[derive(Debug, Clone)]
pub struct PorkbunProviderFactory {
    base_url: String,
}

impl Default for PorkbunProviderFactory {
    fn default() -> Self {
        Self::new(PORKBUN_API_BASE)
    }
}

impl PorkbunProviderFactory {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl ProviderFactory for PorkbunProviderFactory {
    fn connect(
        &self,
        credentials: &PorkbunCredentials,
    ) -> Result<Arc<dyn DnsRecordProvider>, DnsError> {
        let provider = PorkbunProvider::with_base_url(credentials.clone(), self.base_url.clone())?;
        Ok(Arc::new(provider))
    }
}
