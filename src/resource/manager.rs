//! Resource managers
//!
//! One manager per definition variant, each knowing how to realize its kind
//! against the remote API. Managers are stateless (the image manager carries
//! only its poll policy), registered once at startup, and receive the client
//! as an explicit argument on every call.

use async_trait::async_trait;

use super::definition::{ResourceDefinition, ResourceKind};
use super::poll::{self, PollPolicy, WaitError};
use crate::error::{ApiError, UploadError};
use crate::openstack::compute::FlavorSpec;
use crate::openstack::{ImageRecord, OpenStackClient, IMAGE_ACTIVE_STATUS};

/// What a manager hands back after a successful upload.
#[derive(Debug)]
pub enum Uploaded {
    /// Synchronous create with no payload worth keeping.
    Done,
    /// The image record the remote left behind.
    Image(ImageRecord),
}

/// Type-specific upload handler for one [`ResourceDefinition`] variant.
#[async_trait]
pub trait ResourceManager: std::fmt::Debug + Send + Sync {
    /// The definition variant this manager realizes.
    fn kind(&self) -> ResourceKind;

    /// Structural type test: does this manager handle the definition's
    /// concrete variant? Never inspects fields.
    fn supports(&self, definition: &ResourceDefinition) -> bool {
        definition.kind() == self.kind()
    }

    /// Create the resource remotely. A remote conflict comes back as
    /// [`UploadError::AlreadyExists`]; callers decide what that means.
    async fn upload(
        &self,
        definition: &ResourceDefinition,
        client: &OpenStackClient,
    ) -> Result<Uploaded, UploadError>;
}

/// Translate a remote conflict into already-exists semantics, passing every
/// other API failure through untouched.
fn conflict_as_exists(err: ApiError, resource: &str) -> UploadError {
    match err {
        ApiError::Conflict(_) => UploadError::AlreadyExists {
            resource: resource.to_string(),
        },
        other => UploadError::Api(other),
    }
}

fn wrong_variant(definition: &ResourceDefinition) -> UploadError {
    UploadError::UnsupportedType {
        kind: definition.kind(),
    }
}

/// Creates default security-group rules. Synchronous create; the remote
/// conflict response is the authoritative already-exists signal.
#[derive(Debug)]
pub struct SecurityRuleManager;

#[async_trait]
impl ResourceManager for SecurityRuleManager {
    fn kind(&self) -> ResourceKind {
        ResourceKind::SecurityRule
    }

    async fn upload(
        &self,
        definition: &ResourceDefinition,
        client: &OpenStackClient,
    ) -> Result<Uploaded, UploadError> {
        let ResourceDefinition::SecurityRule {
            protocol,
            from_port,
            to_port,
            cidr,
        } = definition
        else {
            return Err(wrong_variant(definition));
        };

        client
            .compute()
            .create_default_security_rule(protocol, *from_port, *to_port, cidr)
            .await
            .map_err(|e| conflict_as_exists(e, &definition.display_name()))?;

        Ok(Uploaded::Done)
    }
}

/// Registers key pairs from on-disk public key material.
#[derive(Debug)]
pub struct KeyPairManager;

#[async_trait]
impl ResourceManager for KeyPairManager {
    fn kind(&self) -> ResourceKind {
        ResourceKind::KeyPair
    }

    async fn upload(
        &self,
        definition: &ResourceDefinition,
        client: &OpenStackClient,
    ) -> Result<Uploaded, UploadError> {
        let ResourceDefinition::KeyPair { name, path } = definition else {
            return Err(wrong_variant(definition));
        };

        // Read and release the file before going remote. An unreadable key
        // file is an operator mistake, not a remote-state condition.
        let public_key =
            std::fs::read_to_string(path).map_err(|source| UploadError::KeyFile {
                path: path.clone(),
                source,
            })?;

        client
            .compute()
            .create_key_pair(name, &public_key)
            .await
            .map_err(|e| conflict_as_exists(e, name))?;

        Ok(Uploaded::Done)
    }
}

/// Creates compute flavors from the definition fields verbatim.
#[derive(Debug)]
pub struct FlavorManager;

#[async_trait]
impl ResourceManager for FlavorManager {
    fn kind(&self) -> ResourceKind {
        ResourceKind::Flavor
    }

    async fn upload(
        &self,
        definition: &ResourceDefinition,
        client: &OpenStackClient,
    ) -> Result<Uploaded, UploadError> {
        let ResourceDefinition::Flavor {
            name,
            ram_mb,
            vcpus,
            disk_gb,
            id,
            ephemeral_gb,
            swap_mb,
            is_public,
        } = definition
        else {
            return Err(wrong_variant(definition));
        };

        client
            .compute()
            .create_flavor(&FlavorSpec {
                name,
                ram_mb: *ram_mb,
                vcpus: *vcpus,
                disk_gb: *disk_gb,
                id,
                ephemeral_gb: *ephemeral_gb,
                swap_mb: *swap_mb,
                is_public: *is_public,
            })
            .await
            .map_err(|e| conflict_as_exists(e, name))?;

        Ok(Uploaded::Done)
    }
}

/// Uploads images by copy-from-URL and polls them to completion.
///
/// Unlike the synchronous kinds, existence is checked proactively: an image
/// copy is long-running and the create call does not reliably report a
/// conflict, so the name lookup before creation is the authoritative check.
#[derive(Debug)]
pub struct ImageManager {
    poll: PollPolicy,
}

impl ImageManager {
    pub fn new(poll: PollPolicy) -> Self {
        Self { poll }
    }

    /// Best-effort registration with the data-processing service, gated on
    /// the image record carrying both a login user and tags. Never affects
    /// the upload outcome.
    async fn register_with_data_processing(&self, client: &OpenStackClient, image: &ImageRecord) {
        let (Some(user), Some(tags)) = (&image.user, &image.tags) else {
            return;
        };

        let Some(api) = client.data_processing() else {
            tracing::debug!(
                "image \"{}\" carries user/tags but no data-processing endpoint is available",
                image.name
            );
            return;
        };

        tracing::info!("registering image \"{}\" with data processing", image.name);

        if let Err(err) = api.register_image(&image.id, user).await {
            tracing::warn!(
                "data-processing registration of \"{}\" failed: {}",
                image.name,
                err
            );
            return;
        }
        if let Err(err) = api.set_tags(&image.id, tags).await {
            tracing::warn!("tagging image \"{}\" failed: {}", image.name, err);
        }
    }
}

#[async_trait]
impl ResourceManager for ImageManager {
    fn kind(&self) -> ResourceKind {
        ResourceKind::Image
    }

    async fn upload(
        &self,
        definition: &ResourceDefinition,
        client: &OpenStackClient,
    ) -> Result<Uploaded, UploadError> {
        let ResourceDefinition::Image {
            name,
            url,
            disk_format,
            container_format,
            is_public,
        } = definition
        else {
            return Err(wrong_variant(definition));
        };

        match client.image().find_by_name(name).await {
            Ok(_) => {
                return Err(UploadError::AlreadyExists {
                    resource: name.clone(),
                })
            }
            Err(ApiError::NotFound(_)) => {}
            Err(other) => return Err(other.into()),
        }

        let image = client
            .image()
            .create(name, url, disk_format, container_format, *is_public)
            .await?;

        tracing::info!(
            "image \"{}\" accepted as {}, waiting for it to become {}",
            name,
            image.id,
            IMAGE_ACTIVE_STATUS
        );

        let wait = poll::wait_for_status(&self.poll, IMAGE_ACTIVE_STATUS, || {
            let api = client.image();
            let id = image.id.clone();
            async move { api.status(&id).await }
        })
        .await;

        match wait {
            Ok(()) => {}
            Err(WaitError::TimedOut { target, waited }) => {
                return Err(UploadError::Timeout {
                    resource: name.clone(),
                    target,
                    waited,
                })
            }
            Err(WaitError::Api(err)) => return Err(err.into()),
        }

        self.register_with_data_processing(client, &image).await;

        Ok(Uploaded::Image(image))
    }
}
