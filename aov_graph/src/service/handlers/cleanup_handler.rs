use log::{debug, info};

use super::{LayoutHandler, OutputRegistry, with_named_node};
use crate::config::LayoutMetrics;
use crate::error::GraphError;
use crate::host::{ConfirmPrompt, NodeGraph, SceneHost};
use crate::model::{OutputKind, PropertyKey, PropertyValue};
use crate::naming;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CascadeOutcome {
    /// Number of nodes removed.
    Deleted(usize),
    Declined,
    NothingToDelete,
}

pub struct CleanupHandler;

impl CleanupHandler {
    /// Deletes the layer's output nodes that have no slots left.
    pub fn prune_empty<H: NodeGraph + ?Sized>(host: &mut H, layer: &str) -> Result<usize, GraphError> {
        let mut deleted = 0;
        for kind in OutputKind::STACK_ORDER {
            let name = naming::output_node_name(layer, kind);
            let pruned = with_named_node(host, &name, |host, node| {
                if host.list_slots(node)?.is_empty() {
                    host.delete_node(node)?;
                    Ok(true)
                } else {
                    Ok(false)
                }
            })?;
            if pruned == Some(true) {
                info!("Deleted empty output node '{}'", name);
                deleted += 1;
            }
        }
        Ok(deleted)
    }

    /// Removes slots without an incoming link from the layer's output nodes, then
    /// prunes. Returns the number of slots removed.
    pub fn sweep_layer<H: NodeGraph + ?Sized>(host: &mut H, layer: &str) -> Result<usize, GraphError> {
        let mut removed = 0;
        for handle in OutputRegistry::get_layer_nodes(host, layer).iter() {
            removed += with_named_node(host, &handle.stable_name, |host, node| {
                let mut count = 0;
                for slot in host.list_slots(node)? {
                    if host.slot_source(node, &slot).is_none() {
                        debug!("Removing unlinked slot '{}'", slot);
                        host.remove_slot(node, &slot)?;
                        count += 1;
                    }
                }
                Ok(count)
            })?
            .unwrap_or(0);
        }
        Self::prune_empty(host, layer)?;
        Ok(removed)
    }

    /// Deletes the layer's input node and output nodes after the user confirms, then
    /// lays the remaining clusters out again.
    pub fn cascade_delete<H, P>(
        host: &mut H,
        prompt: &mut P,
        metrics: &LayoutMetrics,
        layer: &str,
    ) -> Result<CascadeOutcome, GraphError>
    where
        H: SceneHost + ?Sized,
        P: ConfirmPrompt + ?Sized,
    {
        let names = Self::generated_node_names(host, layer);
        if names.is_empty() {
            return Ok(CascadeOutcome::NothingToDelete);
        }

        let message = format!(
            "Delete the {} generated node(s) of render layer \"{}\"?",
            names.len(),
            layer
        );
        if !prompt.ask_yes_no(&message) {
            info!("Kept generated nodes of layer '{}'", layer);
            return Ok(CascadeOutcome::Declined);
        }

        let mut deleted = 0;
        for name in &names {
            if with_named_node(host, name, |host, node| host.delete_node(node))?.is_some() {
                deleted += 1;
            }
        }
        info!("Deleted {} node(s) of layer '{}'", deleted, layer);
        LayoutHandler::relayout_all(host, metrics)?;
        Ok(CascadeOutcome::Deleted(deleted))
    }

    /// Mutes or unmutes the layer's generated nodes and switches the layer itself
    /// off or on to match, if the scene still has it.
    pub fn toggle_layer_enabled<H: SceneHost + ?Sized>(
        host: &mut H,
        layer: &str,
        muted: bool,
    ) -> Result<usize, GraphError> {
        let mut touched = 0;
        for name in Self::generated_node_names(host, layer) {
            let done = with_named_node(host, &name, |host, node| {
                host.set_node_property(node, PropertyKey::Mute, PropertyValue::Bool(muted))
            })?;
            if done.is_some() {
                touched += 1;
            }
        }
        if host.list_render_layers().iter().any(|l| l.name == layer) {
            host.set_layer_enabled(layer, !muted)?;
        } else {
            debug!("Layer '{}' is not in the scene, leaving its flag alone", layer);
        }
        info!(
            "{} layer '{}' ({} node(s))",
            if muted { "Muted" } else { "Unmuted" },
            layer,
            touched
        );
        Ok(touched)
    }

    fn generated_node_names<H: NodeGraph + ?Sized>(host: &H, layer: &str) -> Vec<String> {
        let mut names = Vec::new();
        if OutputRegistry::find_input_node(host, layer).is_some() {
            names.push(naming::input_node_name(layer));
        }
        names.extend(
            OutputRegistry::get_layer_nodes(host, layer)
                .iter()
                .map(|handle| handle.stable_name.clone()),
        );
        names
    }
}
