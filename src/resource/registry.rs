//! Manager registry
//!
//! An ordered collection of resource managers with pure type-based lookup.
//! Exactly one registered manager supports each definition variant; a
//! definition nothing supports is a reportable error, never a silent skip.

use super::definition::ResourceDefinition;
use super::manager::{
    FlavorManager, ImageManager, KeyPairManager, ResourceManager, SecurityRuleManager,
};
use super::poll::PollPolicy;
use crate::error::UploadError;

pub struct ManagerRegistry {
    managers: Vec<Box<dyn ResourceManager>>,
}

impl ManagerRegistry {
    pub fn new() -> Self {
        Self {
            managers: Vec::new(),
        }
    }

    /// The full manager set, in registration order.
    pub fn with_default_managers(poll: PollPolicy) -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(SecurityRuleManager));
        registry.register(Box::new(KeyPairManager));
        registry.register(Box::new(FlavorManager));
        registry.register(Box::new(ImageManager::new(poll)));
        registry
    }

    pub fn register(&mut self, manager: Box<dyn ResourceManager>) {
        self.managers.push(manager);
    }

    /// Find the first manager (in registration order) whose `supports`
    /// predicate accepts the definition.
    pub fn resolve(
        &self,
        definition: &ResourceDefinition,
    ) -> Result<&dyn ResourceManager, UploadError> {
        self.managers
            .iter()
            .find(|manager| manager.supports(definition))
            .map(|boxed| boxed.as_ref())
            .ok_or_else(|| UploadError::UnsupportedType {
                kind: definition.kind(),
            })
    }

    pub fn len(&self) -> usize {
        self.managers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.managers.is_empty()
    }
}

impl Default for ManagerRegistry {
    fn default() -> Self {
        Self::with_default_managers(PollPolicy::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::ResourceKind;

    fn image() -> ResourceDefinition {
        ResourceDefinition::Image {
            name: "img1".into(),
            url: "http://x/img".into(),
            disk_format: "qcow2".into(),
            container_format: "bare".into(),
            is_public: false,
        }
    }

    #[test]
    fn default_registry_covers_every_kind() {
        let registry = ManagerRegistry::default();
        assert_eq!(registry.len(), 4);

        let definitions = [
            ResourceDefinition::SecurityRule {
                protocol: "tcp".into(),
                from_port: 22,
                to_port: 22,
                cidr: "0.0.0.0/0".into(),
            },
            ResourceDefinition::KeyPair {
                name: "k1".into(),
                path: "/tmp/k1.pub".into(),
            },
            ResourceDefinition::Flavor {
                name: "f1".into(),
                ram_mb: 2048,
                vcpus: 2,
                disk_gb: 20,
                id: "1".into(),
                ephemeral_gb: 0,
                swap_mb: 0,
                is_public: true,
            },
            image(),
        ];

        for definition in &definitions {
            let manager = registry.resolve(definition).unwrap();
            assert_eq!(manager.kind(), definition.kind());
        }
    }

    #[test]
    fn resolution_fails_without_a_matching_manager() {
        let mut registry = ManagerRegistry::new();
        registry.register(Box::new(KeyPairManager));

        let err = registry.resolve(&image()).unwrap_err();
        assert!(matches!(
            err,
            UploadError::UnsupportedType {
                kind: ResourceKind::Image
            }
        ));
    }

    #[test]
    fn empty_registry_resolves_nothing() {
        let registry = ManagerRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.resolve(&image()).is_err());
    }
}
