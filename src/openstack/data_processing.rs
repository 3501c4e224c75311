//! Data-processing service surface
//!
//! Optional follow-up registration of an image with the data-processing
//! service. Callers treat failures here as best-effort: the image itself is
//! already provisioned by the time these are called.

use serde_json::json;

use super::client::OpenStackClient;
use crate::error::ApiError;

pub struct DataProcessingApi<'a> {
    client: &'a OpenStackClient,
    base: &'a str,
}

impl<'a> DataProcessingApi<'a> {
    pub(super) fn new(client: &'a OpenStackClient, base: &'a str) -> Self {
        Self { client, base }
    }

    /// Register an image with its login user.
    pub async fn register_image(&self, image_id: &str, user: &str) -> Result<(), ApiError> {
        let url = format!("{}/images/{}", self.base, image_id);
        let body = json!({
            "username": user,
            "description": "",
        });

        self.client.post(&url, Some(&body)).await?;
        Ok(())
    }

    /// Replace the tag set on a registered image.
    pub async fn set_tags(&self, image_id: &str, tags: &[String]) -> Result<(), ApiError> {
        let url = format!("{}/images/{}/tag", self.base, image_id);
        let body = json!({ "tags": tags });

        self.client.post(&url, Some(&body)).await?;
        Ok(())
    }
}
