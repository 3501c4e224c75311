//! Upload dispatcher
//!
//! Drives the apply pass: resolve a manager for each definition in input
//! order, invoke its upload, and absorb exactly the recoverable per-item
//! outcomes (already exists, timeout, unsupported type). Anything else is a
//! defect or a connectivity problem and aborts the run. The dispatcher
//! itself performs no remote calls.

use super::definition::{ResourceDefinition, ResourceKind};
use super::registry::ManagerRegistry;
use crate::error::UploadError;
use crate::openstack::OpenStackClient;

/// How a single definition fared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Created,
    AlreadyExists,
    TimedOut,
    Unsupported,
}

/// Outcome record for one definition, in input order.
#[derive(Debug, Clone)]
pub struct ItemReport {
    pub kind: ResourceKind,
    pub name: String,
    pub outcome: Outcome,
}

/// Everything the apply pass attempted, for observability.
#[derive(Debug, Default)]
pub struct ApplyReport {
    pub items: Vec<ItemReport>,
}

impl ApplyReport {
    fn push(&mut self, definition: &ResourceDefinition, outcome: Outcome) {
        self.items.push(ItemReport {
            kind: definition.kind(),
            name: definition.display_name(),
            outcome,
        });
    }

    pub fn count(&self, outcome: Outcome) -> usize {
        self.items
            .iter()
            .filter(|item| item.outcome == outcome)
            .count()
    }

    pub fn created(&self) -> usize {
        self.count(Outcome::Created)
    }

    pub fn already_existed(&self) -> usize {
        self.count(Outcome::AlreadyExists)
    }

    /// Items that neither got created nor already existed.
    pub fn failed(&self) -> usize {
        self.count(Outcome::TimedOut) + self.count(Outcome::Unsupported)
    }

    pub fn is_clean(&self) -> bool {
        self.failed() == 0
    }
}

/// Apply every definition in sequence. Returns the per-item report, or the
/// first fatal error.
pub async fn apply(
    definitions: &[ResourceDefinition],
    client: &OpenStackClient,
    registry: &ManagerRegistry,
) -> Result<ApplyReport, UploadError> {
    let mut report = ApplyReport::default();

    for definition in definitions {
        let name = definition.display_name();

        let manager = match registry.resolve(definition) {
            Ok(manager) => manager,
            Err(err) => {
                debug_assert!(err.is_recoverable());
                tracing::error!("skipping \"{}\": {}", name, err);
                report.push(definition, Outcome::Unsupported);
                continue;
            }
        };

        tracing::info!("creating {} \"{}\"", definition.kind(), name);

        match manager.upload(definition, client).await {
            Ok(_) => {
                report.push(definition, Outcome::Created);
            }
            Err(UploadError::AlreadyExists { .. }) => {
                tracing::warn!("{} \"{}\" already exists", definition.kind(), name);
                report.push(definition, Outcome::AlreadyExists);
            }
            Err(err @ UploadError::Timeout { .. }) => {
                tracing::error!("{}", err);
                report.push(definition, Outcome::TimedOut);
            }
            Err(fatal) => return Err(fatal),
        }
    }

    Ok(report)
}
