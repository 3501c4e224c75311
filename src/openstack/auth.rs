//! OpenStack Authentication
//!
//! Issues tokens against the Keystone identity service using password
//! credentials, resolves service endpoints from the returned catalog, and
//! caches tokens with an expiry buffer so long apply passes do not run with
//! a token that is about to lapse.

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::RwLock;

use super::http::OpenStackHttpClient;
use crate::error::ApiError;

/// Token expiry buffer - refresh tokens this much before they actually expire
const TOKEN_EXPIRY_BUFFER: Duration = Duration::from_secs(60);

/// Default token TTL. Keystone reports an `expires` timestamp but a
/// conservative fixed TTL keeps the cache logic clock-format agnostic.
const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(30 * 60);

/// Password credentials for the identity service, loaded from a JSON file:
/// `{"user_name": ..., "password": ..., "tenant": ..., "auth_url": ...}`
#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub user_name: String,
    pub password: String,
    pub tenant: String,
    pub auth_url: String,
}

impl Credentials {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read credentials file {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("failed to parse credentials file {}", path.display()))
    }
}

/// Public endpoints of the services this tool talks to, resolved from the
/// Keystone service catalog. Data processing is optional: not every
/// deployment runs it, and only the image follow-up needs it.
#[derive(Debug, Clone)]
pub struct ServiceEndpoints {
    pub compute: String,
    pub image: String,
    pub data_processing: Option<String>,
}

#[derive(Clone)]
struct CachedToken {
    token: String,
    /// When this token expires (with buffer applied)
    expires_at: Instant,
}

impl CachedToken {
    fn is_valid(&self) -> bool {
        Instant::now() < self.expires_at
    }
}

/// Keystone session with token caching
#[derive(Clone)]
pub struct KeystoneAuth {
    credentials: Credentials,
    http: OpenStackHttpClient,
    token_cache: Arc<RwLock<Option<CachedToken>>>,
}

impl KeystoneAuth {
    pub fn new(credentials: Credentials, http: OpenStackHttpClient) -> Self {
        Self {
            credentials,
            http,
            token_cache: Arc::new(RwLock::new(None)),
        }
    }

    /// Get a token for API calls, reusing the cached one while it is valid.
    pub async fn get_token(&self) -> Result<String, ApiError> {
        {
            let cache = self.token_cache.read().await;
            if let Some(cached) = cache.as_ref() {
                if cached.is_valid() {
                    return Ok(cached.token.clone());
                }
                tracing::debug!("cached token expired, re-authenticating");
            }
        }

        let (token, _) = self.authenticate().await?;
        Ok(token)
    }

    /// Issue a fresh token and resolve service endpoints from the catalog.
    /// Called once at client construction; afterwards only the token cache
    /// path is exercised.
    pub async fn authenticate(&self) -> Result<(String, ServiceEndpoints), ApiError> {
        let url = format!("{}/tokens", self.credentials.auth_url.trim_end_matches('/'));
        let body = json!({
            "auth": {
                "passwordCredentials": {
                    "username": self.credentials.user_name,
                    "password": self.credentials.password,
                },
                "tenantName": self.credentials.tenant,
            }
        });

        let response = self.http.post_anonymous(&url, &body).await?;

        let token = response
            .pointer("/access/token/id")
            .and_then(|v| v.as_str())
            .ok_or_else(|| ApiError::Identity("token missing from identity response".into()))?
            .to_string();

        let endpoints = resolve_endpoints(&response)?;

        let expires_at = Instant::now() + DEFAULT_TOKEN_TTL - TOKEN_EXPIRY_BUFFER;
        {
            let mut cache = self.token_cache.write().await;
            *cache = Some(CachedToken {
                token: token.clone(),
                expires_at,
            });
        }

        tracing::debug!(
            "authenticated as \"{}\" (tenant \"{}\")",
            self.credentials.user_name,
            self.credentials.tenant
        );

        Ok((token, endpoints))
    }
}

/// Pull the public URL of a service type out of the catalog. Entries that
/// are not valid URLs are treated as absent.
fn catalog_endpoint(response: &Value, service_type: &str) -> Option<String> {
    let raw = response
        .pointer("/access/serviceCatalog")?
        .as_array()?
        .iter()
        .find(|service| {
            service.get("type").and_then(|v| v.as_str()) == Some(service_type)
        })?
        .pointer("/endpoints/0/publicURL")?
        .as_str()?;

    let parsed = url::Url::parse(raw)
        .map_err(|e| tracing::warn!("ignoring malformed {} endpoint \"{}\": {}", service_type, raw, e))
        .ok()?;

    Some(String::from(parsed.as_str().trim_end_matches('/')))
}

fn resolve_endpoints(response: &Value) -> Result<ServiceEndpoints, ApiError> {
    let compute = catalog_endpoint(response, "compute")
        .ok_or_else(|| ApiError::Identity("no compute endpoint in service catalog".into()))?;
    let image = catalog_endpoint(response, "image")
        .ok_or_else(|| ApiError::Identity("no image endpoint in service catalog".into()))?;
    let data_processing = catalog_endpoint(response, "data-processing");

    Ok(ServiceEndpoints {
        compute,
        image,
        data_processing,
    })
}
