//! Property-based tests using proptest
//!
//! These tests verify that manager resolution is type-exact for arbitrary
//! definitions, independent of registration order, and that a missing
//! manager always surfaces as an unsupported-type error naming the right
//! kind.

use proptest::prelude::*;

use osenv::error::UploadError;
use osenv::resource::{
    FlavorManager, ImageManager, KeyPairManager, ManagerRegistry, PollPolicy, ResourceDefinition,
    ResourceKind, ResourceManager, SecurityRuleManager,
};

/// Generate an arbitrary definition of any variant
fn arb_definition() -> impl Strategy<Value = ResourceDefinition> {
    let security_rule = (
        prop_oneof!["tcp", "udp", "icmp"],
        -1i32..=65535,
        -1i32..=65535,
        "[0-9]{1,3}\\.[0-9]{1,3}\\.0\\.0/16",
    )
        .prop_map(|(protocol, from_port, to_port, cidr)| {
            ResourceDefinition::SecurityRule {
                protocol: protocol.to_string(),
                from_port,
                to_port,
                cidr,
            }
        });

    let key_pair = ("[a-z][a-z0-9-]{0,15}", "[a-z][a-z0-9/._-]{0,30}").prop_map(
        |(name, path)| ResourceDefinition::KeyPair {
            name,
            path: path.into(),
        },
    );

    let flavor = (
        "[a-z][a-z0-9.-]{0,15}",
        1u64..=65536,
        1u32..=64,
        0u64..=1024,
        "[0-9]{1,6}",
        0u64..=1024,
        0u64..=65536,
        any::<bool>(),
    )
        .prop_map(
            |(name, ram_mb, vcpus, disk_gb, id, ephemeral_gb, swap_mb, is_public)| {
                ResourceDefinition::Flavor {
                    name,
                    ram_mb,
                    vcpus,
                    disk_gb,
                    id,
                    ephemeral_gb,
                    swap_mb,
                    is_public,
                }
            },
        );

    let image = (
        "[a-z][a-z0-9.-]{0,15}",
        prop_oneof!["qcow2", "raw", "vhd"],
        prop_oneof!["bare", "ovf"],
        any::<bool>(),
    )
        .prop_map(|(name, disk_format, container_format, is_public)| {
            ResourceDefinition::Image {
                url: format!("http://images.example/{name}"),
                name,
                disk_format: disk_format.to_string(),
                container_format: container_format.to_string(),
                is_public,
            }
        });

    prop_oneof![security_rule, key_pair, flavor, image]
}

fn manager_for(index: usize) -> (ResourceKind, Box<dyn ResourceManager>) {
    match index % 4 {
        0 => (ResourceKind::SecurityRule, Box::new(SecurityRuleManager)),
        1 => (ResourceKind::KeyPair, Box::new(KeyPairManager)),
        2 => (ResourceKind::Flavor, Box::new(FlavorManager)),
        _ => (
            ResourceKind::Image,
            Box::new(ImageManager::new(PollPolicy::default())),
        ),
    }
}

/// The full manager set, registered starting at an arbitrary rotation.
fn rotated_registry(start: usize) -> ManagerRegistry {
    let mut registry = ManagerRegistry::new();
    for i in 0..4 {
        let (_, manager) = manager_for(start + i);
        registry.register(manager);
    }
    registry
}

proptest! {
    #[test]
    fn resolution_is_type_exact_for_any_registration_order(
        definition in arb_definition(),
        start in 0usize..4,
    ) {
        let registry = rotated_registry(start);
        let manager = registry.resolve(&definition).unwrap();
        prop_assert_eq!(manager.kind(), definition.kind());
    }

    #[test]
    fn missing_manager_reports_the_definition_kind(
        definition in arb_definition(),
        start in 0usize..4,
    ) {
        let mut registry = ManagerRegistry::new();
        for i in 0..4 {
            let (kind, manager) = manager_for(start + i);
            if kind != definition.kind() {
                registry.register(manager);
            }
        }
        prop_assert_eq!(registry.len(), 3);

        let err = registry.resolve(&definition).unwrap_err();
        match err {
            UploadError::UnsupportedType { kind } => prop_assert_eq!(kind, definition.kind()),
            other => prop_assert!(false, "unexpected error: {other:?}"),
        }
    }

    #[test]
    fn display_name_is_never_empty(definition in arb_definition()) {
        prop_assert!(!definition.display_name().is_empty());
    }
}
