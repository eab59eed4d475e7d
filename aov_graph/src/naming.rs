//! Stable node names, slot names and output paths.
//!
//! Every generated node is found again purely by its name, so these functions are the
//! identity of the graph: they must stay deterministic for a given layer and pass.

use crate::model::{OutputKind, SlotId};
use crate::taxonomy::{self, PassCategory};

pub const INPUT_NODE_PREFIX: &str = "Prism_RL_";
pub const OUTPUT_NODE_PREFIX: &str = "Prism_OUT_";

/// Name the host gives the render-layer node of a fresh node graph.
pub const DEFAULT_RENDER_LAYERS_NODE: &str = "Render Layers";

pub fn input_node_name(layer: &str) -> String {
    format!("{}{}", INPUT_NODE_PREFIX, layer)
}

pub fn input_node_label(layer: &str) -> String {
    format!("Prism RL {}", layer)
}

pub fn output_node_name(layer: &str, kind: OutputKind) -> String {
    format!("{}{}_{}", OUTPUT_NODE_PREFIX, layer, kind.suffix())
}

pub fn output_node_label(stable_name: &str) -> String {
    stable_name.replace('_', " ")
}

/// `#` repeated once per digit of frame padding.
pub fn padding_token(frame_padding: u32) -> String {
    "#".repeat(frame_padding as usize)
}

/// Derives slot names for one project frame-padding setting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SlotNamer {
    frame_padding: u32,
}

impl SlotNamer {
    pub fn new(frame_padding: u32) -> Self {
        Self { frame_padding }
    }

    pub fn frame_padding(&self) -> u32 {
        self.frame_padding
    }

    /// `"{layer}_{pass}/{layer}_{pass}.{####}.exr"`, except for cryptomatte passes whose
    /// slot must equal the pass name for multi-layer EXR readers.
    pub fn slot_name(&self, layer: &str, pass_name: &str) -> SlotId {
        if taxonomy::classify(pass_name) == PassCategory::Cryptomatte {
            return SlotId::new(pass_name);
        }
        let pass = if pass_name == taxonomy::BEAUTY_PASS {
            taxonomy::BEAUTY_SLOT
        } else {
            pass_name
        };
        SlotId(format!(
            "{layer}_{pass}/{layer}_{pass}.{}.exr",
            padding_token(self.frame_padding)
        ))
    }

    /// `(socket name, slot)` pairs a pass is wired through. The denoising aggregate
    /// fans out into its three sub-passes.
    pub fn routes(&self, layer: &str, pass_name: &str) -> Vec<(String, SlotId)> {
        if taxonomy::classify(pass_name) == PassCategory::Denoising {
            return taxonomy::denoising_sockets()
                .into_iter()
                .map(|socket| {
                    let slot = self.slot_name(layer, &socket);
                    (socket, slot)
                })
                .collect();
        }
        vec![(pass_name.to_string(), self.slot_name(layer, pass_name))]
    }

    /// Slots `remove_pass` looks for. A cryptomatte type given without an index covers
    /// all three indexed layers.
    pub fn slots_for_removal(&self, layer: &str, pass_name: &str) -> Vec<SlotId> {
        if taxonomy::classify(pass_name) == PassCategory::Cryptomatte
            && taxonomy::crypto_index(pass_name).is_none()
        {
            return taxonomy::CRYPTO_INDICES
                .iter()
                .map(|index| SlotId(format!("{}{}", pass_name, index)))
                .collect();
        }
        self.routes(layer, pass_name)
            .into_iter()
            .map(|(_, slot)| slot)
            .collect()
    }
}

/// Base path a freshly created output node writes under.
pub fn base_path(base_dir: &str, layer: &str, kind: OutputKind) -> String {
    match kind {
        OutputKind::Main | OutputKind::Technical => base_dir.to_string(),
        OutputKind::Cryptomatte => join(base_dir, &format!("{}_CryptoMatte", layer)),
    }
}

/// Directory part of a render output path (the last component is dropped).
pub fn output_dir(render_output_path: &str) -> String {
    let trimmed = render_output_path.trim_end_matches(['/', '\\']);
    match trimmed.rfind(['/', '\\']) {
        Some(0) => trimmed[..1].to_string(),
        Some(idx) => trimmed[..idx].to_string(),
        None => String::new(),
    }
}

/// Base path of an existing output node once the layer's render output path is known.
/// Cryptomatte nodes write one multi-layer file, so theirs names the file itself.
pub fn output_path(
    render_output_path: &str,
    layer: &str,
    kind: OutputKind,
    frame_padding: u32,
) -> String {
    let dir = output_dir(render_output_path);
    match kind {
        OutputKind::Main | OutputKind::Technical => dir,
        OutputKind::Cryptomatte => {
            let folder = join(&dir, &format!("{}_CryptoMatte", layer));
            join(
                &folder,
                &format!("{}_CryptoMatte.{}.exr", layer, padding_token(frame_padding)),
            )
        }
    }
}

fn join(dir: &str, leaf: &str) -> String {
    if dir.is_empty() {
        return leaf.to_string();
    }
    let sep = if dir.contains('\\') && !dir.contains('/') {
        '\\'
    } else {
        '/'
    };
    format!("{}{}{}", dir.trim_end_matches(['/', '\\']), sep, leaf)
}
