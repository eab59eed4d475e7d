//! Render layers and the passes they emit, as reported by the scene host.

use serde::{Deserialize, Serialize};

use crate::taxonomy::{self, PassCategory};

/// A named collection of render passes in the host scene.
///
/// The engine never creates or deletes render layers, it only reacts to them.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct RenderLayer {
    pub name: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

impl RenderLayer {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            enabled: true,
        }
    }
}

/// One output channel of a render layer.
///
/// Recomputed on every host query; the category is always derived, never stored.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct PassDescriptor {
    pub canonical_name: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

impl PassDescriptor {
    pub fn new(canonical_name: &str, enabled: bool) -> Self {
        Self {
            canonical_name: canonical_name.to_string(),
            enabled,
        }
    }

    pub fn enabled(canonical_name: &str) -> Self {
        Self::new(canonical_name, true)
    }

    pub fn category(&self) -> PassCategory {
        taxonomy::classify(&self.canonical_name)
    }
}

const fn default_enabled() -> bool {
    true
}
