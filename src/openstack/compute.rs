//! Compute service surface
//!
//! Create calls for the three synchronous resource kinds. The compute API
//! answers a duplicate create with HTTP 409, which the HTTP layer surfaces
//! as [`ApiError::Conflict`]; translation into already-exists semantics is
//! the managers' job.

use serde_json::json;

use super::client::OpenStackClient;
use crate::error::ApiError;

/// Fields of a flavor create call, passed through to the API verbatim.
#[derive(Debug, Clone)]
pub struct FlavorSpec<'a> {
    pub name: &'a str,
    pub ram_mb: u64,
    pub vcpus: u32,
    pub disk_gb: u64,
    pub id: &'a str,
    pub ephemeral_gb: u64,
    pub swap_mb: u64,
    pub is_public: bool,
}

#[derive(Clone, Copy)]
pub struct ComputeApi<'a> {
    client: &'a OpenStackClient,
}

impl<'a> ComputeApi<'a> {
    pub(super) fn new(client: &'a OpenStackClient) -> Self {
        Self { client }
    }

    /// Create a default security-group rule.
    pub async fn create_default_security_rule(
        &self,
        protocol: &str,
        from_port: i32,
        to_port: i32,
        cidr: &str,
    ) -> Result<(), ApiError> {
        let url = self.client.compute_url("os-security-group-default-rules");
        let body = json!({
            "security_group_default_rule": {
                "ip_protocol": protocol,
                "from_port": from_port,
                "to_port": to_port,
                "cidr": cidr,
            }
        });

        self.client.post(&url, Some(&body)).await?;
        Ok(())
    }

    /// Register a key pair by name and public key material.
    pub async fn create_key_pair(&self, name: &str, public_key: &str) -> Result<(), ApiError> {
        let url = self.client.compute_url("os-keypairs");
        let body = json!({
            "keypair": {
                "name": name,
                "public_key": public_key,
            }
        });

        self.client.post(&url, Some(&body)).await?;
        Ok(())
    }

    /// Create a compute flavor.
    pub async fn create_flavor(&self, spec: &FlavorSpec<'_>) -> Result<(), ApiError> {
        let url = self.client.compute_url("flavors");
        let body = json!({
            "flavor": {
                "name": spec.name,
                "ram": spec.ram_mb,
                "vcpus": spec.vcpus,
                "disk": spec.disk_gb,
                "id": spec.id,
                "OS-FLV-EXT-DATA:ephemeral": spec.ephemeral_gb,
                "swap": spec.swap_mb,
                "os-flavor-access:is_public": spec.is_public,
            }
        });

        self.client.post(&url, Some(&body)).await?;
        Ok(())
    }
}
