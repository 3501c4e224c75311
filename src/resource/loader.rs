//! Resource definition loader
//!
//! Parses a declarative manifest file into resource definitions. Format is
//! picked by extension: `.json` or `.yaml`/`.yml`. Anything else is an
//! unsupported source, fatal to the run - with no definitions there is
//! nothing to apply.

use std::path::Path;

use serde::Deserialize;

use super::definition::ResourceDefinition;
use crate::error::LoadError;

/// Top-level manifest shape: `{ "resources": [ ... ] }`
#[derive(Debug, Deserialize)]
struct Manifest {
    resources: Vec<ResourceDefinition>,
}

/// Whether the file name looks like a manifest this loader can parse.
pub fn supports(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("json" | "yaml" | "yml")
    )
}

/// Load resource definitions from a manifest file.
pub fn load(path: &Path) -> Result<Vec<ResourceDefinition>, LoadError> {
    let extension = path.extension().and_then(|e| e.to_str());

    let content = match extension {
        Some("json" | "yaml" | "yml") => {
            std::fs::read_to_string(path).map_err(|source| LoadError::Io {
                path: path.to_path_buf(),
                source,
            })?
        }
        _ => {
            return Err(LoadError::UnsupportedSource {
                path: path.to_path_buf(),
            })
        }
    };

    let manifest: Manifest = match extension {
        Some("json") => serde_json::from_str(&content).map_err(|e| LoadError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?,
        _ => serde_yaml::from_str(&content).map_err(|e| LoadError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?,
    };

    tracing::debug!(
        "loaded {} resource definitions from {}",
        manifest.resources.len(),
        path.display()
    );

    Ok(manifest.resources)
}
