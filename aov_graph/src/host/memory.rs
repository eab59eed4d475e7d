//! In-memory scene host.
//!
//! Serves as the reference host for the command-line driver and the test suite, and
//! can be round-tripped through JSON to snapshot a scene.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{AovHost, NodeGraph, SceneHost};
use crate::aov::{self, HostPropertyKey, LayerToggle, RenderEngine};
use crate::error::GraphError;
use crate::model::{
    Dimensions, Link, NodeKind, NodeRef, PassDescriptor, Position, PropertyKey, PropertyValue,
    RenderLayer, SlotId, SocketRef,
};
use crate::naming::DEFAULT_RENDER_LAYERS_NODE;
use crate::taxonomy::BEAUTY_PASS;

const DEFAULT_NODE_WIDTH: f64 = 140.0;
const NODE_BASE_HEIGHT: f64 = 100.0;
const NODE_ROW_HEIGHT: f64 = 22.0;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct MemoryScene {
    #[serde(default)]
    pub render_engine: RenderEngine,
    #[serde(default = "default_frame_padding")]
    pub frame_padding: u32,
    #[serde(default)]
    pub layers: Vec<MemoryLayer>,
    /// `None` until the scene's compositing graph is switched on.
    #[serde(default)]
    pub graph: Option<MemoryGraph>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct MemoryLayer {
    pub name: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Output sockets of the layer, enabled or not.
    #[serde(default)]
    pub passes: Vec<PassDescriptor>,
    /// Boolean layer properties keyed by their dotted path; absent means unavailable.
    #[serde(default)]
    pub flags: BTreeMap<String, bool>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct MemoryGraph {
    pub nodes: Vec<MemoryNode>,
    pub links: Vec<Link>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct MemoryNode {
    pub id: NodeRef,
    pub kind: NodeKind,
    pub name: String,
    #[serde(default)]
    pub position: Position,
    #[serde(default = "default_width")]
    pub width: f64,
    #[serde(default)]
    pub slots: Vec<SlotId>,
    #[serde(default)]
    pub properties: BTreeMap<PropertyKey, PropertyValue>,
}

impl MemoryNode {
    fn new(kind: NodeKind, name: &str) -> Self {
        Self {
            id: NodeRef::new(),
            kind,
            name: name.to_string(),
            position: Position::default(),
            width: DEFAULT_NODE_WIDTH,
            slots: Vec::new(),
            properties: BTreeMap::new(),
        }
    }

    pub fn is_muted(&self) -> bool {
        self.properties
            .get(&PropertyKey::Mute)
            .and_then(|v| v.as_bool())
            .unwrap_or(false)
    }

    pub fn property(&self, key: PropertyKey) -> Option<&PropertyValue> {
        self.properties.get(&key)
    }
}

impl MemoryLayer {
    /// A layer exposing every AOV flag and layer toggle, all switched off.
    pub fn new(name: &str) -> Self {
        let mut flags = BTreeMap::new();
        for entry in aov::AOV_TABLE {
            flags.insert(entry.key.to_string(), false);
        }
        for toggle in LayerToggle::ALL {
            flags.insert(toggle.key().to_string(), true);
        }
        Self {
            name: name.to_string(),
            enabled: true,
            passes: Vec::new(),
            flags,
        }
    }

    pub fn set_pass_enabled(&mut self, canonical_name: &str, enabled: bool) {
        match self
            .passes
            .iter_mut()
            .find(|p| p.canonical_name == canonical_name)
        {
            Some(pass) => pass.enabled = enabled,
            None => self
                .passes
                .push(PassDescriptor::new(canonical_name, enabled)),
        }
    }
}

impl Default for MemoryScene {
    fn default() -> Self {
        Self::new(default_frame_padding())
    }
}

impl MemoryScene {
    pub fn new(frame_padding: u32) -> Self {
        Self {
            render_engine: RenderEngine::Cycles,
            frame_padding,
            layers: Vec::new(),
            graph: None,
        }
    }

    pub fn load(json_str: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json_str)
    }

    pub fn save(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn add_layer(&mut self, name: &str) -> &mut MemoryLayer {
        if let Some(idx) = self.layers.iter().position(|l| l.name == name) {
            return &mut self.layers[idx];
        }
        self.layers.push(MemoryLayer::new(name));
        let last = self.layers.len() - 1;
        &mut self.layers[last]
    }

    pub fn layer(&self, name: &str) -> Option<&MemoryLayer> {
        self.layers.iter().find(|l| l.name == name)
    }

    pub fn layer_mut(&mut self, name: &str) -> Option<&mut MemoryLayer> {
        self.layers.iter_mut().find(|l| l.name == name)
    }

    /// Switches a single pass socket on or off, bypassing the AOV flags.
    pub fn set_pass_enabled(&mut self, layer: &str, canonical_name: &str, enabled: bool) {
        if let Some(l) = self.layer_mut(layer) {
            l.set_pass_enabled(canonical_name, enabled);
        }
    }

    pub fn node(&self, node: NodeRef) -> Option<&MemoryNode> {
        self.graph.as_ref()?.nodes.iter().find(|n| n.id == node)
    }

    pub fn node_named(&self, name: &str) -> Option<&MemoryNode> {
        self.graph.as_ref()?.nodes.iter().find(|n| n.name == name)
    }

    pub fn nodes(&self) -> &[MemoryNode] {
        self.graph.as_ref().map(|g| g.nodes.as_slice()).unwrap_or(&[])
    }

    pub fn links(&self) -> &[Link] {
        self.graph.as_ref().map(|g| g.links.as_slice()).unwrap_or(&[])
    }

    pub fn links_into(&self, node: NodeRef) -> Vec<&Link> {
        self.links().iter().filter(|l| l.to_node == node).collect()
    }

    fn graph_ref(&self) -> Result<&MemoryGraph, GraphError> {
        self.graph
            .as_ref()
            .ok_or_else(|| GraphError::host("scene has no node graph"))
    }

    fn graph_mut(&mut self) -> Result<&mut MemoryGraph, GraphError> {
        self.graph
            .as_mut()
            .ok_or_else(|| GraphError::host("scene has no node graph"))
    }

    fn node_ref(&self, node: NodeRef) -> Result<&MemoryNode, GraphError> {
        self.node(node).ok_or(GraphError::StaleNode(node))
    }

    fn node_mut(&mut self, node: NodeRef) -> Result<&mut MemoryNode, GraphError> {
        self.graph_mut()?
            .nodes
            .iter_mut()
            .find(|n| n.id == node)
            .ok_or(GraphError::StaleNode(node))
    }
}

impl MemoryGraph {
    /// The graph a host creates when compositing is first switched on.
    fn with_defaults(first_layer: Option<&str>) -> Self {
        let mut render_layers = MemoryNode::new(NodeKind::RenderLayers, DEFAULT_RENDER_LAYERS_NODE);
        render_layers.position = Position::new(-300.0, 0.0);
        if let Some(layer) = first_layer {
            render_layers
                .properties
                .insert(PropertyKey::Layer, PropertyValue::text(layer));
        }

        let mut composite = MemoryNode::new(NodeKind::Composite, "Composite");
        composite.position = Position::new(200.0, 0.0);
        composite.slots.push(SlotId::new(BEAUTY_PASS));

        let link = Link::new(
            SocketRef::new(render_layers.id, BEAUTY_PASS),
            composite.id,
            SlotId::new(BEAUTY_PASS),
        );
        Self {
            nodes: vec![render_layers, composite],
            links: vec![link],
        }
    }

    /// Mimics the host renaming a node that collides with an existing name.
    fn unique_name(&self, wanted: &str, except: Option<NodeRef>) -> String {
        let taken = |name: &str| {
            self.nodes
                .iter()
                .any(|n| n.name == name && Some(n.id) != except)
        };
        if !taken(wanted) {
            return wanted.to_string();
        }
        (1..)
            .map(|i| format!("{}.{:03}", wanted, i))
            .find(|candidate| !taken(candidate))
            .unwrap_or_else(|| wanted.to_string())
    }
}

impl NodeGraph for MemoryScene {
    fn has_node_graph(&self) -> bool {
        self.graph.is_some()
    }

    fn init_node_graph(&mut self) -> Result<(), GraphError> {
        if self.graph.is_none() {
            let first = self.layers.first().map(|l| l.name.clone());
            self.graph = Some(MemoryGraph::with_defaults(first.as_deref()));
        }
        Ok(())
    }

    fn list_nodes(&self) -> Vec<NodeRef> {
        self.nodes().iter().map(|n| n.id).collect()
    }

    fn find_node_by_name(&self, name: &str) -> Option<NodeRef> {
        self.node_named(name).map(|n| n.id)
    }

    fn node_kind(&self, node: NodeRef) -> Option<NodeKind> {
        self.node(node).map(|n| n.kind)
    }

    fn create_node(&mut self, kind: NodeKind) -> Result<NodeRef, GraphError> {
        let graph = self.graph_mut()?;
        let default_name = match kind {
            NodeKind::RenderLayers => DEFAULT_RENDER_LAYERS_NODE,
            NodeKind::OutputFile => "File Output",
            NodeKind::Composite => "Composite",
        };
        let name = graph.unique_name(default_name, None);
        let mut node = MemoryNode::new(kind, &name);
        if kind == NodeKind::OutputFile {
            node.slots.push(SlotId::new(BEAUTY_PASS));
        }
        let id = node.id;
        graph.nodes.push(node);
        Ok(id)
    }

    fn delete_node(&mut self, node: NodeRef) -> Result<(), GraphError> {
        let graph = self.graph_mut()?;
        let idx = graph
            .nodes
            .iter()
            .position(|n| n.id == node)
            .ok_or(GraphError::StaleNode(node))?;
        graph.nodes.remove(idx);
        graph.links.retain(|l| !l.touches(node));
        Ok(())
    }

    fn set_node_property(
        &mut self,
        node: NodeRef,
        key: PropertyKey,
        value: PropertyValue,
    ) -> Result<(), GraphError> {
        match key {
            PropertyKey::Name => {
                let wanted = value
                    .as_text()
                    .ok_or_else(|| GraphError::InvalidArgument("node name must be text".into()))?
                    .to_string();
                let name = self.graph_ref()?.unique_name(&wanted, Some(node));
                self.node_mut(node)?.name = name;
            }
            PropertyKey::Width => {
                let width = value
                    .as_number()
                    .ok_or_else(|| GraphError::InvalidArgument("node width must be a number".into()))?;
                self.node_mut(node)?.width = width;
            }
            _ => {
                self.node_mut(node)?.properties.insert(key, value);
            }
        }
        Ok(())
    }

    fn get_node_property(&self, node: NodeRef, key: PropertyKey) -> Option<PropertyValue> {
        let n = self.node(node)?;
        match key {
            PropertyKey::Name => Some(PropertyValue::text(&n.name)),
            PropertyKey::Width => Some(PropertyValue::number(n.width)),
            _ => n.properties.get(&key).cloned(),
        }
    }

    fn get_position(&self, node: NodeRef) -> Result<Position, GraphError> {
        Ok(self.node_ref(node)?.position)
    }

    fn set_position(&mut self, node: NodeRef, position: Position) -> Result<(), GraphError> {
        self.node_mut(node)?.position = position;
        Ok(())
    }

    fn get_dimensions(&self, node: NodeRef) -> Result<Dimensions, GraphError> {
        let n = self.node_ref(node)?;
        let rows = match n.kind {
            NodeKind::RenderLayers => n
                .property(PropertyKey::Layer)
                .and_then(|v| v.as_text())
                .map(|layer| self.get_enabled_passes(layer).len())
                .unwrap_or(1),
            NodeKind::OutputFile | NodeKind::Composite => n.slots.len(),
        };
        Ok(Dimensions::new(
            n.width,
            NODE_BASE_HEIGHT + rows as f64 * NODE_ROW_HEIGHT,
        ))
    }

    fn list_slots(&self, node: NodeRef) -> Result<Vec<SlotId>, GraphError> {
        Ok(self.node_ref(node)?.slots.clone())
    }

    fn add_slot(&mut self, node: NodeRef, slot: &SlotId) -> Result<(), GraphError> {
        let n = self.node_mut(node)?;
        if !n.slots.contains(slot) {
            n.slots.push(slot.clone());
        }
        Ok(())
    }

    fn remove_slot(&mut self, node: NodeRef, slot: &SlotId) -> Result<(), GraphError> {
        self.node_mut(node)?.slots.retain(|s| s != slot);
        self.graph_mut()?
            .links
            .retain(|l| !(l.to_node == node && &l.to_slot == slot));
        Ok(())
    }

    fn connect(
        &mut self,
        from: &SocketRef,
        node: NodeRef,
        slot: &SlotId,
    ) -> Result<(), GraphError> {
        self.node_ref(from.node)?;
        if !self.node_ref(node)?.slots.contains(slot) {
            return Err(GraphError::InvalidArgument(format!(
                "node {} has no slot '{}'",
                node, slot
            )));
        }
        let graph = self.graph_mut()?;
        // A slot accepts one link; a new one replaces the old.
        graph
            .links
            .retain(|l| !(l.to_node == node && &l.to_slot == slot));
        graph
            .links
            .push(Link::new(from.clone(), node, slot.clone()));
        Ok(())
    }

    fn is_socket_linked(&self, socket: &SocketRef) -> bool {
        self.links().iter().any(|l| &l.from == socket)
    }

    fn slot_source(&self, node: NodeRef, slot: &SlotId) -> Option<SocketRef> {
        self.links()
            .iter()
            .find(|l| l.to_node == node && &l.to_slot == slot)
            .map(|l| l.from.clone())
    }
}

impl SceneHost for MemoryScene {
    fn list_render_layers(&self) -> Vec<RenderLayer> {
        self.layers
            .iter()
            .map(|l| RenderLayer {
                name: l.name.clone(),
                enabled: l.enabled,
            })
            .collect()
    }

    fn get_enabled_passes(&self, layer: &str) -> Vec<PassDescriptor> {
        self.layer(layer)
            .map(|l| l.passes.iter().filter(|p| p.enabled).cloned().collect())
            .unwrap_or_default()
    }

    fn frame_padding(&self) -> u32 {
        self.frame_padding
    }

    fn set_layer_enabled(&mut self, layer: &str, enabled: bool) -> Result<(), GraphError> {
        let l = self
            .layer_mut(layer)
            .ok_or_else(|| GraphError::UnknownLayer(layer.to_string()))?;
        l.enabled = enabled;
        Ok(())
    }
}

impl AovHost for MemoryScene {
    fn render_engine(&self) -> RenderEngine {
        self.render_engine
    }

    fn property_flag(&self, layer: &str, key: HostPropertyKey) -> Option<bool> {
        self.layer(layer)?.flags.get(&key.to_string()).copied()
    }

    fn set_property_flag(
        &mut self,
        layer: &str,
        key: HostPropertyKey,
        value: bool,
    ) -> Result<(), GraphError> {
        let l = self
            .layer_mut(layer)
            .ok_or_else(|| GraphError::UnknownLayer(layer.to_string()))?;
        l.flags.insert(key.to_string(), value);
        for entry in aov::AOV_TABLE.iter().filter(|e| e.key == key) {
            for socket in aov::socket_names(entry) {
                l.set_pass_enabled(&socket, value);
            }
        }
        Ok(())
    }
}

const fn default_frame_padding() -> u32 {
    4
}

const fn default_true() -> bool {
    true
}

const fn default_width() -> f64 {
    DEFAULT_NODE_WIDTH
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_node_requires_graph() {
        let mut scene = MemoryScene::default();
        assert!(scene.create_node(NodeKind::OutputFile).is_err());
        scene.init_node_graph().unwrap();
        let node = scene.create_node(NodeKind::OutputFile).unwrap();
        assert_eq!(scene.list_slots(node).unwrap(), vec![SlotId::new("Image")]);
    }

    #[test]
    fn test_rename_collision_gets_suffix() {
        let mut scene = MemoryScene::default();
        scene.init_node_graph().unwrap();
        let a = scene.create_node(NodeKind::OutputFile).unwrap();
        let b = scene.create_node(NodeKind::OutputFile).unwrap();
        scene
            .set_node_property(a, PropertyKey::Name, PropertyValue::text("Out"))
            .unwrap();
        scene
            .set_node_property(b, PropertyKey::Name, PropertyValue::text("Out"))
            .unwrap();
        assert_eq!(scene.node(a).unwrap().name, "Out");
        assert_eq!(scene.node(b).unwrap().name, "Out.001");
    }

    #[test]
    fn test_delete_node_drops_links_and_goes_stale() {
        let mut scene = MemoryScene::default();
        scene.add_layer("A");
        scene.init_node_graph().unwrap();
        let rl = scene.find_node_by_name(DEFAULT_RENDER_LAYERS_NODE).unwrap();
        assert_eq!(scene.links().len(), 1);
        scene.delete_node(rl).unwrap();
        assert!(scene.links().is_empty());
        assert!(matches!(scene.get_position(rl), Err(GraphError::StaleNode(_))));
    }

    #[test]
    fn test_aov_flag_drives_sockets() {
        let mut scene = MemoryScene::default();
        scene.add_layer("A");
        let key = aov::find("Cryptomatte Material").unwrap().key;
        scene.set_property_flag("A", key, true).unwrap();
        let names: Vec<String> = scene
            .get_enabled_passes("A")
            .into_iter()
            .map(|p| p.canonical_name)
            .collect();
        assert_eq!(
            names,
            vec!["CryptoMaterial00", "CryptoMaterial01", "CryptoMaterial02"]
        );
        scene.set_property_flag("A", key, false).unwrap();
        assert!(scene.get_enabled_passes("A").is_empty());
    }
}
