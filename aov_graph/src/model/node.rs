//! Node handles and node properties of the host compositing graph.

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::output::{ColorDepth, FileFormat, Rgb};

/// Opaque handle to a node in the host graph.
///
/// Handles are only valid for the duration of one engine call; anything kept longer
/// must be re-resolved by stable name.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeRef(pub Uuid);

impl NodeRef {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for NodeRef {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for NodeRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// Emits the passes of one render layer as output sockets.
    RenderLayers,
    /// Writes its slots to image files.
    OutputFile,
    /// The host's final composite output.
    Composite,
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            NodeKind::RenderLayers => "render_layers",
            NodeKind::OutputFile => "output_file",
            NodeKind::Composite => "composite",
        };
        write!(f, "{}", s)
    }
}

/// Node attributes the engine reads or writes through the host.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum PropertyKey {
    Name,
    Label,
    /// Render layer a `RenderLayers` node emits.
    Layer,
    BasePath,
    FileFormat,
    ColorDepth,
    ColorMode,
    UseCustomColor,
    Color,
    Width,
    Mute,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum PropertyValue {
    Text(String),
    Bool(bool),
    Number(OrderedFloat<f64>),
    Color(Rgb),
    Format(FileFormat),
    Depth(ColorDepth),
}

impl PropertyValue {
    pub fn text(value: &str) -> Self {
        PropertyValue::Text(value.to_string())
    }

    pub fn number(value: f64) -> Self {
        PropertyValue::Number(OrderedFloat(value))
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            PropertyValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropertyValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            PropertyValue::Number(n) => Some(n.0),
            _ => None,
        }
    }
}

/// Canvas location of a node. `y` grows upwards, so "below" means a smaller `y`.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq)]
pub struct Dimensions {
    pub width: f64,
    pub height: f64,
}

impl Dimensions {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}
