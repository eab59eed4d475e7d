//! Interfaces the engine consumes from the host application.
//!
//! The engine keeps no state of its own between calls: every operation receives the
//! host explicitly and re-reads whatever it needs from the live node graph.

pub mod memory;

use crate::aov::{HostPropertyKey, RenderEngine};
use crate::error::GraphError;
use crate::model::{
    Dimensions, NodeKind, NodeRef, PassDescriptor, Position, PropertyKey, PropertyValue,
    RenderLayer, SlotId, SocketRef,
};

pub use memory::MemoryScene;

/// Mutable handle to the host's compositing node graph.
///
/// Operations on a handle whose node has been removed return
/// [`GraphError::StaleNode`].
pub trait NodeGraph {
    /// Whether the scene already has a compositing node graph.
    fn has_node_graph(&self) -> bool;

    /// Creates the node graph with whatever default nodes the host adds.
    fn init_node_graph(&mut self) -> Result<(), GraphError>;

    fn list_nodes(&self) -> Vec<NodeRef>;

    fn find_node_by_name(&self, name: &str) -> Option<NodeRef>;

    fn node_kind(&self, node: NodeRef) -> Option<NodeKind>;

    fn create_node(&mut self, kind: NodeKind) -> Result<NodeRef, GraphError>;

    /// Removes the node together with every link touching it.
    fn delete_node(&mut self, node: NodeRef) -> Result<(), GraphError>;

    fn set_node_property(
        &mut self,
        node: NodeRef,
        key: PropertyKey,
        value: PropertyValue,
    ) -> Result<(), GraphError>;

    fn get_node_property(&self, node: NodeRef, key: PropertyKey) -> Option<PropertyValue>;

    fn get_position(&self, node: NodeRef) -> Result<Position, GraphError>;

    fn set_position(&mut self, node: NodeRef, position: Position) -> Result<(), GraphError>;

    fn get_dimensions(&self, node: NodeRef) -> Result<Dimensions, GraphError>;

    fn list_slots(&self, node: NodeRef) -> Result<Vec<SlotId>, GraphError>;

    fn add_slot(&mut self, node: NodeRef, slot: &SlotId) -> Result<(), GraphError>;

    /// Removes the slot and its incoming link.
    fn remove_slot(&mut self, node: NodeRef, slot: &SlotId) -> Result<(), GraphError>;

    fn connect(&mut self, from: &SocketRef, node: NodeRef, slot: &SlotId)
    -> Result<(), GraphError>;

    fn is_socket_linked(&self, socket: &SocketRef) -> bool;

    /// Socket feeding the slot, if it is linked.
    fn slot_source(&self, node: NodeRef, slot: &SlotId) -> Option<SocketRef>;
}

/// The scene document: render layers, their passes, and the node graph.
pub trait SceneHost: NodeGraph {
    fn list_render_layers(&self) -> Vec<RenderLayer>;

    fn get_enabled_passes(&self, layer: &str) -> Vec<PassDescriptor>;

    /// Project-wide frame padding used in file names.
    fn frame_padding(&self) -> u32;

    fn set_layer_enabled(&mut self, layer: &str, enabled: bool) -> Result<(), GraphError>;
}

/// Read/write access to the boolean layer properties listed in
/// [`AOV_TABLE`](crate::aov::AOV_TABLE) and [`LayerToggle`](crate::aov::LayerToggle).
pub trait AovHost {
    fn render_engine(&self) -> RenderEngine;

    /// `None` when the host does not expose the property for this layer.
    fn property_flag(&self, layer: &str, key: HostPropertyKey) -> Option<bool>;

    fn set_property_flag(
        &mut self,
        layer: &str,
        key: HostPropertyKey,
        value: bool,
    ) -> Result<(), GraphError>;
}

/// Synchronous yes/no question to the user.
pub trait ConfirmPrompt {
    fn ask_yes_no(&mut self, message: &str) -> bool;
}

impl<F> ConfirmPrompt for F
where
    F: FnMut(&str) -> bool,
{
    fn ask_yes_no(&mut self, message: &str) -> bool {
        self(message)
    }
}
