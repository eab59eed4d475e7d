use log::{debug, info};
use ordered_float::OrderedFloat;

use super::LayoutHandler;
use crate::config::{EngineConfig, LayoutMetrics};
use crate::error::GraphError;
use crate::host::{NodeGraph, SceneHost};
use crate::model::{
    NodeKind, NodeRef, OutputKind, OutputNodeHandle, OutputNodeTriad, Position, PropertyKey,
    PropertyValue,
};
use crate::naming::{self, DEFAULT_RENDER_LAYERS_NODE, INPUT_NODE_PREFIX};

/// Resolves and creates the generated nodes of a render layer by stable name.
pub struct OutputRegistry;

impl OutputRegistry {
    /// Creates the host node graph if the scene has none yet, then removes the host's
    /// default render-layers node. Returns whether the graph was created.
    pub fn ensure_graph<H: NodeGraph + ?Sized>(host: &mut H) -> Result<bool, GraphError> {
        if host.has_node_graph() {
            return Ok(false);
        }
        host.init_node_graph()?;
        if let Some(node) = host.find_node_by_name(DEFAULT_RENDER_LAYERS_NODE) {
            if host.node_kind(node) == Some(NodeKind::RenderLayers) {
                host.delete_node(node)?;
            }
        }
        info!("Initialised compositing node graph");
        Ok(true)
    }

    pub fn find_input_node<H: NodeGraph + ?Sized>(host: &H, layer: &str) -> Option<NodeRef> {
        host.find_node_by_name(&naming::input_node_name(layer))
    }

    /// Every stable-named input node in the graph, with the layer it belongs to.
    pub fn input_nodes<H: NodeGraph + ?Sized>(host: &H) -> Vec<(String, NodeRef)> {
        host.list_nodes()
            .into_iter()
            .filter(|node| host.node_kind(*node) == Some(NodeKind::RenderLayers))
            .filter_map(|node| {
                let name = host
                    .get_node_property(node, PropertyKey::Name)?
                    .as_text()?
                    .to_string();
                let layer = name.strip_prefix(INPUT_NODE_PREFIX)?;
                Some((layer.to_string(), node))
            })
            .collect()
    }

    pub fn get_or_create_input_node<H: SceneHost + ?Sized>(
        host: &mut H,
        metrics: &LayoutMetrics,
        layer: &str,
    ) -> Result<NodeRef, GraphError> {
        Self::ensure_graph(host)?;
        let name = naming::input_node_name(layer);
        if let Some(node) = host.find_node_by_name(&name) {
            return Ok(node);
        }

        let position = Self::next_input_position(host, metrics)?;
        let node = host.create_node(NodeKind::RenderLayers)?;
        host.set_node_property(node, PropertyKey::Name, PropertyValue::text(&name))?;
        host.set_node_property(
            node,
            PropertyKey::Label,
            PropertyValue::text(&naming::input_node_label(layer)),
        )?;
        host.set_node_property(node, PropertyKey::Layer, PropertyValue::text(layer))?;
        host.set_position(node, position)?;
        info!("Created input node '{}' at ({}, {})", name, position.x, position.y);
        Ok(node)
    }

    /// Directly below the cluster of the lowest input node, or the origin.
    fn next_input_position<H: SceneHost + ?Sized>(
        host: &H,
        metrics: &LayoutMetrics,
    ) -> Result<Position, GraphError> {
        let mut lowest: Option<(String, Position)> = None;
        for (layer, node) in Self::input_nodes(host) {
            let position = host.get_position(node)?;
            let is_lower = lowest
                .as_ref()
                .is_none_or(|(_, low)| OrderedFloat(position.y) < OrderedFloat(low.y));
            if is_lower {
                lowest = Some((layer, position));
            }
        }
        match lowest {
            Some((layer, position)) => {
                let height = LayoutHandler::cluster_height(host, metrics, &layer)?;
                Ok(position.offset(0.0, -height))
            }
            None => Ok(Position::default()),
        }
    }

    pub fn get_or_create_output_node<H: SceneHost + ?Sized>(
        host: &mut H,
        config: &EngineConfig,
        layer: &str,
        kind: OutputKind,
    ) -> Result<OutputNodeHandle, GraphError> {
        Self::ensure_graph(host)?;
        let stable_name = naming::output_node_name(layer, kind);
        if let Some(node) = host.find_node_by_name(&stable_name) {
            return Ok(OutputNodeHandle {
                node,
                stable_name,
                kind,
            });
        }

        let node = host.create_node(NodeKind::OutputFile)?;
        let default_slots = host.list_slots(node)?;
        let width = host.get_dimensions(node)?.width * config.layout.output_width_scale;

        let properties = [
            (PropertyKey::Name, PropertyValue::text(&stable_name)),
            (
                PropertyKey::Label,
                PropertyValue::text(&naming::output_node_label(&stable_name)),
            ),
            (PropertyKey::Width, PropertyValue::number(width)),
            (
                PropertyKey::BasePath,
                PropertyValue::text(&naming::base_path(&config.output_root, layer, kind)),
            ),
            (PropertyKey::FileFormat, PropertyValue::Format(kind.file_format())),
            (PropertyKey::ColorDepth, PropertyValue::Depth(kind.color_depth())),
            (PropertyKey::ColorMode, PropertyValue::text("RGBA")),
            (PropertyKey::UseCustomColor, PropertyValue::Bool(true)),
            (PropertyKey::Color, PropertyValue::Color(kind.color())),
        ];
        for (key, value) in properties {
            host.set_node_property(node, key, value)?;
        }
        for slot in &default_slots {
            host.remove_slot(node, slot)?;
        }

        if let Some(input) = Self::find_input_node(host, layer) {
            let input_pos = host.get_position(input)?;
            let input_width = host.get_dimensions(input)?.width;
            host.set_position(
                node,
                input_pos.offset(input_width + config.layout.column_gap, 0.0),
            )?;
        }

        info!("Created {} output node '{}'", kind, stable_name);
        Ok(OutputNodeHandle {
            node,
            stable_name,
            kind,
        })
    }

    /// Resolves the layer's existing output nodes. Never creates.
    pub fn get_layer_nodes<H: NodeGraph + ?Sized>(host: &H, layer: &str) -> OutputNodeTriad {
        let mut triad = OutputNodeTriad::default();
        for kind in OutputKind::STACK_ORDER {
            let stable_name = naming::output_node_name(layer, kind);
            if let Some(node) = host.find_node_by_name(&stable_name) {
                triad.set(OutputNodeHandle {
                    node,
                    stable_name,
                    kind,
                });
            }
        }
        debug!("Layer '{}' has {} output node(s)", layer, triad.len());
        triad
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::MemoryScene;
    use crate::model::{ColorDepth, FileFormat};

    fn scene() -> MemoryScene {
        let mut scene = MemoryScene::new(4);
        scene.add_layer("BG");
        scene.add_layer("FG");
        scene
    }

    #[test]
    fn test_ensure_graph_removes_default_input() {
        let mut scene = scene();
        assert!(OutputRegistry::ensure_graph(&mut scene).unwrap());
        assert!(scene.find_node_by_name(DEFAULT_RENDER_LAYERS_NODE).is_none());
        assert!(scene.find_node_by_name("Composite").is_some());
        assert!(!OutputRegistry::ensure_graph(&mut scene).unwrap());
    }

    #[test]
    fn test_input_node_is_idempotent() {
        let mut scene = scene();
        let metrics = LayoutMetrics::default();
        let a = OutputRegistry::get_or_create_input_node(&mut scene, &metrics, "BG").unwrap();
        let b = OutputRegistry::get_or_create_input_node(&mut scene, &metrics, "BG").unwrap();
        assert_eq!(a, b);
        assert_eq!(OutputRegistry::input_nodes(&scene).len(), 1);
        assert_eq!(scene.node(a).unwrap().name, "Prism_RL_BG");
    }

    #[test]
    fn test_new_input_goes_below_lowest() {
        let mut scene = scene();
        let metrics = LayoutMetrics::default();
        let bg = OutputRegistry::get_or_create_input_node(&mut scene, &metrics, "BG").unwrap();
        let fg = OutputRegistry::get_or_create_input_node(&mut scene, &metrics, "FG").unwrap();
        let bg_pos = scene.get_position(bg).unwrap();
        let fg_pos = scene.get_position(fg).unwrap();
        assert_eq!(bg_pos, Position::default());
        assert_eq!(fg_pos.x, bg_pos.x);
        assert_eq!(fg_pos.y, -metrics.input_height(0));
    }

    #[test]
    fn test_output_node_configuration() {
        let mut scene = scene();
        let config = EngineConfig {
            output_root: "/renders".to_string(),
            ..EngineConfig::default()
        };
        let handle =
            OutputRegistry::get_or_create_output_node(&mut scene, &config, "BG", OutputKind::Cryptomatte)
                .unwrap();
        let node = scene.node(handle.node).unwrap();
        assert_eq!(node.name, "Prism_OUT_BG_CryptoMatte");
        assert!(node.slots.is_empty());
        assert_eq!(node.width, 280.0);
        assert_eq!(
            node.property(PropertyKey::Label),
            Some(&PropertyValue::text("Prism OUT BG CryptoMatte"))
        );
        assert_eq!(
            node.property(PropertyKey::BasePath),
            Some(&PropertyValue::text("/renders/BG_CryptoMatte"))
        );
        assert_eq!(
            node.property(PropertyKey::FileFormat),
            Some(&PropertyValue::Format(FileFormat::OpenExrMultilayer))
        );
        assert_eq!(
            node.property(PropertyKey::ColorDepth),
            Some(&PropertyValue::Depth(ColorDepth::Full))
        );

        let again =
            OutputRegistry::get_or_create_output_node(&mut scene, &config, "BG", OutputKind::Cryptomatte)
                .unwrap();
        assert_eq!(again, handle);
        assert_eq!(OutputRegistry::get_layer_nodes(&scene, "BG").len(), 1);
        assert!(OutputRegistry::get_layer_nodes(&scene, "FG").is_empty());
    }
}
