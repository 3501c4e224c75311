//! OpenStack Client
//!
//! Main client for interacting with the OpenStack control plane, combining
//! authentication, endpoint resolution, and HTTP functionality. Capability
//! accessors hand out borrow-scoped sub-clients for the compute, image, and
//! data-processing services; the reconciliation core only ever calls through
//! those surfaces.

use serde_json::Value;

use super::auth::{Credentials, KeystoneAuth, ServiceEndpoints};
use super::compute::ComputeApi;
use super::data_processing::DataProcessingApi;
use super::http::OpenStackHttpClient;
use super::image::ImageApi;
use crate::error::ApiError;

/// Main OpenStack client
#[derive(Clone)]
pub struct OpenStackClient {
    auth: KeystoneAuth,
    http: OpenStackHttpClient,
    endpoints: ServiceEndpoints,
}

impl OpenStackClient {
    /// Authenticate against Keystone and resolve service endpoints from the
    /// catalog. Auth failures here are fatal to the run.
    pub async fn connect(credentials: Credentials) -> Result<Self, ApiError> {
        let http = OpenStackHttpClient::new()?;
        let auth = KeystoneAuth::new(credentials, http.clone());
        let (_, endpoints) = auth.authenticate().await?;

        tracing::info!(
            "connected: compute={}, image={}, data_processing={}",
            endpoints.compute,
            endpoints.image,
            endpoints.data_processing.as_deref().unwrap_or("-")
        );

        Ok(Self {
            auth,
            http,
            endpoints,
        })
    }

    /// Compute service surface (security rules, key pairs, flavors).
    pub fn compute(&self) -> ComputeApi<'_> {
        ComputeApi::new(self)
    }

    /// Image service surface.
    pub fn image(&self) -> ImageApi<'_> {
        ImageApi::new(self)
    }

    /// Data-processing service surface, if the deployment has one.
    pub fn data_processing(&self) -> Option<DataProcessingApi<'_>> {
        self.endpoints
            .data_processing
            .as_deref()
            .map(|base| DataProcessingApi::new(self, base))
    }

    /// Make a GET request with a fresh-enough token
    pub(super) async fn get(&self, url: &str) -> Result<Value, ApiError> {
        let token = self.auth.get_token().await?;
        self.http.get(url, &token).await
    }

    /// Make a POST request with a fresh-enough token
    pub(super) async fn post(&self, url: &str, body: Option<&Value>) -> Result<Value, ApiError> {
        let token = self.auth.get_token().await?;
        self.http.post(url, &token, body).await
    }

    // =========================================================================
    // URL helpers
    // =========================================================================

    /// Build a compute service URL
    pub(super) fn compute_url(&self, path: &str) -> String {
        format!("{}/{}", self.endpoints.compute, path)
    }

    /// Build an image service URL
    pub(super) fn image_url(&self, path: &str) -> String {
        format!("{}/{}", self.endpoints.image, path)
    }
}
