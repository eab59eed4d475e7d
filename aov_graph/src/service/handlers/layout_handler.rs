use log::info;
use ordered_float::OrderedFloat;

use super::{OutputRegistry, with_named_node};
use crate::config::LayoutMetrics;
use crate::error::GraphError;
use crate::host::SceneHost;
use crate::model::{NodeRef, Position};
use crate::naming::{self, SlotNamer};

/// Vertical extent of one layer's cluster after a layout pass. `top` is the input node's
/// y; the cluster covers `(top - height, top]`.
#[derive(Clone, Debug, PartialEq)]
pub struct ClusterPlacement {
    pub layer: String,
    pub top: f64,
    pub height: f64,
}

impl ClusterPlacement {
    pub fn bottom(&self) -> f64 {
        self.top - self.height
    }

    pub fn overlaps(&self, other: &ClusterPlacement) -> bool {
        self.bottom() < other.top && other.bottom() < self.top
    }
}

pub struct LayoutHandler;

impl LayoutHandler {
    /// Sockets the layer's input node shows, with denoising expanded into its sub-passes.
    pub fn enabled_socket_count<H: SceneHost + ?Sized>(host: &H, layer: &str) -> usize {
        let namer = SlotNamer::new(host.frame_padding());
        host.get_enabled_passes(layer)
            .iter()
            .map(|pass| namer.routes(layer, &pass.canonical_name).len())
            .sum()
    }

    /// max(input node height, stacked output node heights).
    pub fn cluster_height<H: SceneHost + ?Sized>(
        host: &H,
        metrics: &LayoutMetrics,
        layer: &str,
    ) -> Result<f64, GraphError> {
        let input_height = metrics.input_height(Self::enabled_socket_count(host, layer));
        let mut outputs_height = 0.0;
        for handle in OutputRegistry::get_layer_nodes(host, layer).iter() {
            outputs_height += metrics.output_height(host.list_slots(handle.node)?.len());
        }
        Ok(input_height.max(outputs_height))
    }

    /// Restacks every generated cluster top to bottom, keeping the current vertical
    /// order of the input nodes, so that no two clusters overlap.
    pub fn relayout_all<H: SceneHost + ?Sized>(
        host: &mut H,
        metrics: &LayoutMetrics,
    ) -> Result<Vec<ClusterPlacement>, GraphError> {
        let mut inputs: Vec<(String, Position)> = Vec::new();
        for (layer, node) in OutputRegistry::input_nodes(host) {
            inputs.push((layer, host.get_position(node)?));
        }
        inputs.sort_by(|(a_layer, a), (b_layer, b)| {
            OrderedFloat(b.y)
                .cmp(&OrderedFloat(a.y))
                .then_with(|| a_layer.cmp(b_layer))
        });

        let Some((_, top)) = inputs.first() else {
            return Ok(Vec::new());
        };
        let current_x = top.x;
        let mut current_y = top.y;
        let mut placements = Vec::with_capacity(inputs.len());

        for (layer, _) in &inputs {
            let name = naming::input_node_name(layer);
            let origin = Position::new(current_x, current_y);
            let placed = with_named_node(host, &name, |host, node| {
                Self::place_cluster(host, metrics, layer, node, origin)
            })?;
            if let Some(placement) = placed {
                current_y -= placement.height;
                placements.push(placement);
            }
        }

        info!("Laid out {} render layer cluster(s)", placements.len());
        Ok(placements)
    }

    fn place_cluster<H: SceneHost + ?Sized>(
        host: &mut H,
        metrics: &LayoutMetrics,
        layer: &str,
        input: NodeRef,
        origin: Position,
    ) -> Result<ClusterPlacement, GraphError> {
        host.set_position(input, origin)?;
        let output_x = origin.x + host.get_dimensions(input)?.width + metrics.column_gap;

        let mut output_y = origin.y;
        for handle in OutputRegistry::get_layer_nodes(host, layer).iter() {
            host.set_position(handle.node, Position::new(output_x, output_y))?;
            output_y -= metrics.output_height(host.list_slots(handle.node)?.len());
        }

        Ok(ClusterPlacement {
            layer: layer.to_string(),
            top: origin.y,
            height: Self::cluster_height(host, metrics, layer)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn placement(top: f64, height: f64) -> ClusterPlacement {
        ClusterPlacement {
            layer: String::new(),
            top,
            height,
        }
    }

    #[test]
    fn test_flush_clusters_do_not_overlap() {
        let a = placement(0.0, 179.0);
        let b = placement(-179.0, 245.0);
        assert!(!a.overlaps(&b));
        assert!(!b.overlaps(&a));
        assert_eq!(b.bottom(), -424.0);
    }

    #[test]
    fn test_overlap_detected() {
        let a = placement(0.0, 200.0);
        let b = placement(-100.0, 50.0);
        assert!(a.overlaps(&b));
    }
}
