//! Image service surface
//!
//! Images are the one asynchronously provisioned resource kind: a create
//! call returns a record immediately while the service copies the bits from
//! the source URL in the background. Callers watch [`ImageRecord::status`]
//! until it reaches [`IMAGE_ACTIVE_STATUS`].

use serde_json::{json, Value};

use super::client::OpenStackClient;
use crate::error::ApiError;

/// Terminal status of a fully provisioned image.
pub const IMAGE_ACTIVE_STATUS: &str = "active";

/// Transient handle onto a remote image record. Never cached beyond the
/// upload call that produced it.
#[derive(Debug, Clone)]
pub struct ImageRecord {
    pub id: String,
    pub name: String,
    pub status: String,
    /// Default login user baked into the image, when the deployment tracks
    /// one. Gates the data-processing follow-up together with `tags`.
    pub user: Option<String>,
    pub tags: Option<Vec<String>>,
}

impl From<&Value> for ImageRecord {
    fn from(value: &Value) -> Self {
        Self {
            id: value
                .get("id")
                .and_then(|v| v.as_str())
                .unwrap_or("-")
                .to_string(),
            name: value
                .get("name")
                .and_then(|v| v.as_str())
                .unwrap_or("-")
                .to_string(),
            status: value
                .get("status")
                .and_then(|v| v.as_str())
                .unwrap_or("unknown")
                .to_string(),
            user: value
                .get("user")
                .and_then(|v| v.as_str())
                .map(|s| s.to_string()),
            tags: value.get("tags").and_then(|v| v.as_array()).map(|arr| {
                arr.iter()
                    .filter_map(|t| t.as_str())
                    .map(|s| s.to_string())
                    .collect()
            }),
        }
    }
}

#[derive(Clone, Copy)]
pub struct ImageApi<'a> {
    client: &'a OpenStackClient,
}

impl<'a> ImageApi<'a> {
    pub(super) fn new(client: &'a OpenStackClient) -> Self {
        Self { client }
    }

    /// Look an image up by exact name. [`ApiError::NotFound`] when the name
    /// matches nothing.
    pub async fn find_by_name(&self, name: &str) -> Result<ImageRecord, ApiError> {
        let url = self
            .client
            .image_url(&format!("v2/images?name={}", urlencoding::encode(name)));
        let response = self.client.get(&url).await?;

        response
            .get("images")
            .and_then(|v| v.as_array())
            .and_then(|images| images.first())
            .map(ImageRecord::from)
            .ok_or_else(|| ApiError::NotFound(format!("image \"{name}\"")))
    }

    /// Request creation of an image copied from a source URL. Returns the
    /// record immediately; provisioning continues remotely.
    pub async fn create(
        &self,
        name: &str,
        copy_from_url: &str,
        disk_format: &str,
        container_format: &str,
        is_public: bool,
    ) -> Result<ImageRecord, ApiError> {
        let url = self.client.image_url("v2/images");
        let body = json!({
            "name": name,
            "copy_from": copy_from_url,
            "disk_format": disk_format,
            "container_format": container_format,
            "visibility": if is_public { "public" } else { "private" },
        });

        let response = self.client.post(&url, Some(&body)).await?;
        Ok(ImageRecord::from(&response))
    }

    /// Current provisioning status of an image.
    pub async fn status(&self, id: &str) -> Result<String, ApiError> {
        let url = self.client.image_url(&format!("v2/images/{id}"));
        let response = self.client.get(&url).await?;

        response
            .get("status")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
            .ok_or_else(|| ApiError::NotFound(format!("image {id} has no status")))
    }
}
