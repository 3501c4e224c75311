//! Resource definitions
//!
//! Immutable, declarative descriptions of the infrastructure objects this
//! tool provisions. Definitions are produced by the loader from a manifest
//! file, handed to the dispatcher once, and discarded.

use std::fmt;
use std::path::PathBuf;

use serde::Deserialize;

/// Discriminant tag of a [`ResourceDefinition`] variant. Matches the `type`
/// field in manifest files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    SecurityRule,
    KeyPair,
    Flavor,
    Image,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::SecurityRule => "security_rule",
            ResourceKind::KeyPair => "key_pair",
            ResourceKind::Flavor => "flavor",
            ResourceKind::Image => "image",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One declared infrastructure object. Field names on the wire follow the
/// manifest format (`from`/`to` for ports, `ram`/`disk`/`ephemeral`/`swap`
/// for flavor sizes).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResourceDefinition {
    SecurityRule {
        protocol: String,
        /// Start of the port range. `-1` for protocols without ports (ICMP).
        #[serde(rename = "from")]
        from_port: i32,
        #[serde(rename = "to")]
        to_port: i32,
        cidr: String,
    },
    KeyPair {
        name: String,
        /// Where to read the public key material from.
        path: PathBuf,
    },
    Flavor {
        name: String,
        #[serde(rename = "ram")]
        ram_mb: u64,
        vcpus: u32,
        #[serde(rename = "disk")]
        disk_gb: u64,
        id: String,
        #[serde(rename = "ephemeral", default)]
        ephemeral_gb: u64,
        #[serde(rename = "swap", default)]
        swap_mb: u64,
        is_public: bool,
    },
    Image {
        name: String,
        url: String,
        disk_format: String,
        container_format: String,
        is_public: bool,
    },
}

impl ResourceDefinition {
    /// The variant's discriminant, used for structural dispatch.
    pub fn kind(&self) -> ResourceKind {
        match self {
            ResourceDefinition::SecurityRule { .. } => ResourceKind::SecurityRule,
            ResourceDefinition::KeyPair { .. } => ResourceKind::KeyPair,
            ResourceDefinition::Flavor { .. } => ResourceKind::Flavor,
            ResourceDefinition::Image { .. } => ResourceKind::Image,
        }
    }

    /// Human-readable identifier for logs and error messages. Security rules
    /// have no name, so the rule tuple stands in.
    pub fn display_name(&self) -> String {
        match self {
            ResourceDefinition::SecurityRule {
                protocol,
                from_port,
                to_port,
                cidr,
            } => format!("{protocol}/{from_port}-{to_port} {cidr}"),
            ResourceDefinition::KeyPair { name, .. }
            | ResourceDefinition::Flavor { name, .. }
            | ResourceDefinition::Image { name, .. } => name.clone(),
        }
    }
}
