//! AOV availability adapter.
//!
//! Every AOV the engine knows about is listed once in [`AOV_TABLE`] together with the
//! host flag that enables it. Hosts implement [`AovHost`](crate::host::AovHost) to
//! read and write those flags; the engine never walks host attribute paths itself.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::GraphError;
use crate::host::AovHost;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum RenderEngine {
    #[default]
    Cycles,
    Eevee,
    Workbench,
}

/// Where a pass flag lives on the host's layer object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PropertyScope {
    /// Shared by every render engine.
    ViewLayer,
    Cycles,
    Eevee,
}

impl PropertyScope {
    pub fn applies_to(self, engine: RenderEngine) -> bool {
        match self {
            PropertyScope::ViewLayer => true,
            PropertyScope::Cycles => engine == RenderEngine::Cycles,
            PropertyScope::Eevee => engine == RenderEngine::Eevee,
        }
    }
}

/// A boolean property on a host layer, e.g. `cycles.denoising_store_passes`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HostPropertyKey {
    pub scope: PropertyScope,
    pub name: &'static str,
}

impl HostPropertyKey {
    pub const fn view_layer(name: &'static str) -> Self {
        Self {
            scope: PropertyScope::ViewLayer,
            name,
        }
    }

    pub const fn cycles(name: &'static str) -> Self {
        Self {
            scope: PropertyScope::Cycles,
            name,
        }
    }

    pub const fn eevee(name: &'static str) -> Self {
        Self {
            scope: PropertyScope::Eevee,
            name,
        }
    }
}

impl std::fmt::Display for HostPropertyKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.scope {
            PropertyScope::ViewLayer => write!(f, "{}", self.name),
            PropertyScope::Cycles => write!(f, "cycles.{}", self.name),
            PropertyScope::Eevee => write!(f, "eevee.{}", self.name),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AovEntry {
    /// Name shown to users ("Z", "Diffuse Color").
    pub display_name: &'static str,
    /// Name of the pass socket the host emits ("Depth", "DiffCol").
    pub canonical_name: &'static str,
    pub key: HostPropertyKey,
}

const fn entry(
    display_name: &'static str,
    canonical_name: &'static str,
    key: HostPropertyKey,
) -> AovEntry {
    AovEntry {
        display_name,
        canonical_name,
        key,
    }
}

pub const AOV_TABLE: &[AovEntry] = &[
    entry("Ambient Occlusion", "AO", HostPropertyKey::view_layer("use_pass_ambient_occlusion")),
    entry("Cryptomatte Asset", "CryptoAsset", HostPropertyKey::view_layer("use_pass_cryptomatte_asset")),
    entry("Cryptomatte Material", "CryptoMaterial", HostPropertyKey::view_layer("use_pass_cryptomatte_material")),
    entry("Cryptomatte Object", "CryptoObject", HostPropertyKey::view_layer("use_pass_cryptomatte_object")),
    entry("Diffuse Color", "DiffCol", HostPropertyKey::view_layer("use_pass_diffuse_color")),
    entry("Diffuse Direct", "DiffDir", HostPropertyKey::view_layer("use_pass_diffuse_direct")),
    entry("Diffuse Indirect", "DiffInd", HostPropertyKey::view_layer("use_pass_diffuse_indirect")),
    entry("Emission", "Emit", HostPropertyKey::view_layer("use_pass_emit")),
    entry("Environment", "Env", HostPropertyKey::view_layer("use_pass_environment")),
    entry("Glossy Color", "GlossCol", HostPropertyKey::view_layer("use_pass_glossy_color")),
    entry("Glossy Direct", "GlossDir", HostPropertyKey::view_layer("use_pass_glossy_direct")),
    entry("Glossy Indirect", "GlossInd", HostPropertyKey::view_layer("use_pass_glossy_indirect")),
    entry("Material Index", "IndexMA", HostPropertyKey::view_layer("use_pass_material_index")),
    entry("Mist", "Mist", HostPropertyKey::view_layer("use_pass_mist")),
    entry("Normal", "Normal", HostPropertyKey::view_layer("use_pass_normal")),
    entry("Object Index", "IndexOB", HostPropertyKey::view_layer("use_pass_object_index")),
    entry("Position", "Position", HostPropertyKey::view_layer("use_pass_position")),
    entry("Transmission Color", "TransCol", HostPropertyKey::view_layer("use_pass_transmission_color")),
    entry("Transmission Direct", "TransDir", HostPropertyKey::view_layer("use_pass_transmission_direct")),
    entry("Transmission Indirect", "TransInd", HostPropertyKey::view_layer("use_pass_transmission_indirect")),
    entry("UV", "UV", HostPropertyKey::view_layer("use_pass_uv")),
    entry("Vector", "Vector", HostPropertyKey::view_layer("use_pass_vector")),
    entry("Z", "Depth", HostPropertyKey::view_layer("use_pass_z")),
    entry("Denoising Data", "Denoising", HostPropertyKey::cycles("denoising_store_passes")),
    entry("Debug Samples", "Debug Sample Count", HostPropertyKey::cycles("pass_debug_sample_count")),
    entry("Shadow Catcher", "Shadow Catcher", HostPropertyKey::cycles("use_pass_shadow_catcher")),
    entry("Volume Direct", "VolumeDir", HostPropertyKey::cycles("use_pass_volume_direct")),
    entry("Volume Indirect", "VolumeInd", HostPropertyKey::cycles("use_pass_volume_indirect")),
    entry("Bloom", "BloomCol", HostPropertyKey::eevee("use_pass_bloom")),
    entry("Transparent", "Transp", HostPropertyKey::eevee("use_pass_transparent")),
];

/// Looks an AOV up by display or canonical name, ignoring case.
pub fn find(name: &str) -> Option<&'static AovEntry> {
    AOV_TABLE.iter().find(|e| {
        e.display_name.eq_ignore_ascii_case(name) || e.canonical_name.eq_ignore_ascii_case(name)
    })
}

pub fn find_by_canonical(canonical_name: &str) -> Option<&'static AovEntry> {
    AOV_TABLE.iter().find(|e| e.canonical_name == canonical_name)
}

/// Socket names the host emits once the entry's flag is on.
pub fn socket_names(entry: &AovEntry) -> Vec<String> {
    if crate::taxonomy::is_crypto(entry.canonical_name) {
        crate::taxonomy::CRYPTO_INDICES
            .iter()
            .map(|index| format!("{}{}", entry.canonical_name, index))
            .collect()
    } else {
        vec![entry.canonical_name.to_string()]
    }
}

/// AOVs the host exposes for `layer` under its current render engine, by display name.
pub fn available_aovs<H: AovHost + ?Sized>(host: &H, layer: &str) -> Vec<&'static AovEntry> {
    let engine = host.render_engine();
    let mut aovs: Vec<&'static AovEntry> = AOV_TABLE
        .iter()
        .filter(|e| e.key.scope.applies_to(engine))
        .filter(|e| host.property_flag(layer, e.key).is_some())
        .collect();
    aovs.sort_by_key(|e| e.display_name);
    aovs
}

pub fn enabled_aovs<H: AovHost + ?Sized>(host: &H, layer: &str) -> Vec<&'static AovEntry> {
    available_aovs(host, layer)
        .into_iter()
        .filter(|e| host.property_flag(layer, e.key) == Some(true))
        .collect()
}

/// Available AOVs that are not enabled yet.
pub fn remaining_aovs<H: AovHost + ?Sized>(host: &H, layer: &str) -> Vec<&'static AovEntry> {
    available_aovs(host, layer)
        .into_iter()
        .filter(|e| host.property_flag(layer, e.key) != Some(true))
        .collect()
}

/// Writes the host flag of an AOV. Returns whether a flag was written; AOVs the host
/// does not expose for this layer are left alone.
pub fn set_aov_enabled<H: AovHost + ?Sized>(
    host: &mut H,
    layer: &str,
    name: &str,
    enable: bool,
) -> Result<bool, GraphError> {
    let entry = find(name).ok_or_else(|| GraphError::UnknownAov(name.to_string()))?;
    let available = available_aovs(host, layer)
        .iter()
        .any(|e| e.key == entry.key);
    if !available {
        debug!("AOV '{}' is not available on layer '{}'", entry.display_name, layer);
        return Ok(false);
    }
    host.set_property_flag(layer, entry.key, enable)?;
    Ok(true)
}

/// Layer-wide switches that are not passes.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LayerToggle {
    Environment,
    Surfaces,
    Curves,
    Volumes,
    MotionBlur,
    Denoising,
}

impl LayerToggle {
    pub const ALL: [LayerToggle; 6] = [
        LayerToggle::Environment,
        LayerToggle::Surfaces,
        LayerToggle::Curves,
        LayerToggle::Volumes,
        LayerToggle::MotionBlur,
        LayerToggle::Denoising,
    ];

    pub fn label(self) -> &'static str {
        match self {
            LayerToggle::Environment => "Environment",
            LayerToggle::Surfaces => "Surfaces",
            LayerToggle::Curves => "Curves",
            LayerToggle::Volumes => "Volumes",
            LayerToggle::MotionBlur => "Motion Blur",
            LayerToggle::Denoising => "Denoising",
        }
    }

    pub fn key(self) -> HostPropertyKey {
        match self {
            LayerToggle::Environment => HostPropertyKey::view_layer("use_sky"),
            LayerToggle::Surfaces => HostPropertyKey::view_layer("use_solid"),
            LayerToggle::Curves => HostPropertyKey::view_layer("use_strand"),
            LayerToggle::Volumes => HostPropertyKey::view_layer("use_volumes"),
            LayerToggle::MotionBlur => HostPropertyKey::view_layer("use_motion_blur"),
            LayerToggle::Denoising => HostPropertyKey::cycles("use_denoising"),
        }
    }
}

pub fn layer_toggle<H: AovHost + ?Sized>(host: &H, layer: &str, toggle: LayerToggle) -> Option<bool> {
    host.property_flag(layer, toggle.key())
}

pub fn set_layer_toggle<H: AovHost + ?Sized>(
    host: &mut H,
    layer: &str,
    toggle: LayerToggle,
    enable: bool,
) -> Result<(), GraphError> {
    host.set_property_flag(layer, toggle.key(), enable)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_by_display_or_canonical() {
        assert_eq!(find("Z").map(|e| e.canonical_name), Some("Depth"));
        assert_eq!(find("depth").map(|e| e.display_name), Some("Z"));
        assert_eq!(find("diffuse color").map(|e| e.canonical_name), Some("DiffCol"));
        assert!(find("Alpha").is_none());
    }

    #[test]
    fn test_table_names_are_unique() {
        for (i, a) in AOV_TABLE.iter().enumerate() {
            for b in &AOV_TABLE[i + 1..] {
                assert_ne!(a.canonical_name, b.canonical_name);
                assert_ne!(a.display_name, b.display_name);
                assert_ne!(a.key, b.key);
            }
        }
    }

    #[test]
    fn test_socket_names_expand_cryptomatte() {
        let crypto = find("Cryptomatte Object").unwrap();
        assert_eq!(
            socket_names(crypto),
            vec!["CryptoObject00", "CryptoObject01", "CryptoObject02"]
        );
        assert_eq!(socket_names(find("Mist").unwrap()), vec!["Mist"]);
    }

    #[test]
    fn test_key_display_paths() {
        assert_eq!(find("Z").unwrap().key.to_string(), "use_pass_z");
        assert_eq!(
            find("Denoising Data").unwrap().key.to_string(),
            "cycles.denoising_store_passes"
        );
        assert_eq!(find("Bloom").unwrap().key.to_string(), "eevee.use_pass_bloom");
    }

    #[test]
    fn test_scope_applies_to_engine() {
        assert!(PropertyScope::ViewLayer.applies_to(RenderEngine::Workbench));
        assert!(PropertyScope::Cycles.applies_to(RenderEngine::Cycles));
        assert!(!PropertyScope::Cycles.applies_to(RenderEngine::Eevee));
        assert!(!PropertyScope::Eevee.applies_to(RenderEngine::Cycles));
    }
}
