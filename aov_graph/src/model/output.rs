//! The generated file-output nodes of a render layer.

use serde::{Deserialize, Serialize};

use super::node::NodeRef;
use crate::taxonomy::PassCategory;

/// Which of the three generated output nodes a pass is written by.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum OutputKind {
    Main,
    Technical,
    Cryptomatte,
}

impl OutputKind {
    /// Vertical stacking order next to the input node.
    pub const STACK_ORDER: [OutputKind; 3] = [
        OutputKind::Technical,
        OutputKind::Main,
        OutputKind::Cryptomatte,
    ];

    pub fn for_category(category: PassCategory) -> Self {
        match category {
            PassCategory::Technical => OutputKind::Technical,
            PassCategory::Cryptomatte => OutputKind::Cryptomatte,
            PassCategory::Denoising | PassCategory::Main => OutputKind::Main,
        }
    }

    /// Suffix of the node's stable name.
    pub fn suffix(self) -> &'static str {
        match self {
            OutputKind::Main => "MainPasses",
            OutputKind::Technical => "TechPasses",
            OutputKind::Cryptomatte => "CryptoMatte",
        }
    }

    pub fn color_depth(self) -> ColorDepth {
        match self {
            OutputKind::Main => ColorDepth::Half,
            OutputKind::Technical | OutputKind::Cryptomatte => ColorDepth::Full,
        }
    }

    pub fn file_format(self) -> FileFormat {
        match self {
            OutputKind::Cryptomatte => FileFormat::OpenExrMultilayer,
            OutputKind::Main | OutputKind::Technical => FileFormat::OpenExr,
        }
    }

    pub fn color(self) -> Rgb {
        match self {
            OutputKind::Main => Rgb::new(0.21, 0.37, 0.6),
            OutputKind::Technical => Rgb::new(0.6, 0.32, 0.2),
            OutputKind::Cryptomatte => Rgb::new(0.26, 0.6, 0.2),
        }
    }
}

impl std::fmt::Display for OutputKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            OutputKind::Main => "main",
            OutputKind::Technical => "technical",
            OutputKind::Cryptomatte => "cryptomatte",
        };
        write!(f, "{}", s)
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileFormat {
    #[serde(rename = "OPEN_EXR")]
    OpenExr,
    #[serde(rename = "OPEN_EXR_MULTILAYER")]
    OpenExrMultilayer,
}

impl FileFormat {
    pub fn as_host_str(self) -> &'static str {
        match self {
            FileFormat::OpenExr => "OPEN_EXR",
            FileFormat::OpenExrMultilayer => "OPEN_EXR_MULTILAYER",
        }
    }
}

/// Bits per channel of written EXR files.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorDepth {
    #[serde(rename = "16")]
    Half,
    #[serde(rename = "32")]
    Full,
}

impl ColorDepth {
    pub fn bits(self) -> u32 {
        match self {
            ColorDepth::Half => 16,
            ColorDepth::Full => 32,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }
}

/// A resolved generated output node.
#[derive(Clone, Debug, PartialEq)]
pub struct OutputNodeHandle {
    pub node: NodeRef,
    pub stable_name: String,
    pub kind: OutputKind,
}

/// The (at most) three output nodes of one render layer.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OutputNodeTriad {
    pub main: Option<OutputNodeHandle>,
    pub technical: Option<OutputNodeHandle>,
    pub cryptomatte: Option<OutputNodeHandle>,
}

impl OutputNodeTriad {
    pub fn get(&self, kind: OutputKind) -> Option<&OutputNodeHandle> {
        match kind {
            OutputKind::Main => self.main.as_ref(),
            OutputKind::Technical => self.technical.as_ref(),
            OutputKind::Cryptomatte => self.cryptomatte.as_ref(),
        }
    }

    pub fn set(&mut self, handle: OutputNodeHandle) {
        match handle.kind {
            OutputKind::Main => self.main = Some(handle),
            OutputKind::Technical => self.technical = Some(handle),
            OutputKind::Cryptomatte => self.cryptomatte = Some(handle),
        }
    }

    /// Present members in stacking order (technical, main, cryptomatte).
    pub fn iter(&self) -> impl Iterator<Item = &OutputNodeHandle> {
        OutputKind::STACK_ORDER
            .into_iter()
            .filter_map(move |kind| self.get(kind))
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
