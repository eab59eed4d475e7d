use log::{debug, info};
use serde::{Deserialize, Serialize};

use super::handlers::{
    CascadeOutcome, CleanupHandler, ConnectionHandler, LayoutHandler, OutputRegistry, SyncReport,
    with_named_node,
};
use crate::aov;
use crate::config::EngineConfig;
use crate::error::GraphError;
use crate::host::{AovHost, ConfirmPrompt, SceneHost};
use crate::model::{OutputKind, PropertyKey, PropertyValue};
use crate::naming;
use crate::taxonomy::{self, PassCategory};

/// One row of [`OutputGraphService::pass_overview`].
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct PassOverviewEntry {
    pub name: String,
    pub category: PassCategory,
    pub output: OutputKind,
}

/// Entry point for hosts: the workflows a user triggers, built from the handlers.
#[derive(Clone, Debug, Default)]
pub struct OutputGraphService {
    config: EngineConfig,
}

impl OutputGraphService {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Builds or refreshes the output graph of one layer and relayouts.
    pub fn setup_layer<H: SceneHost + ?Sized>(
        &self,
        host: &mut H,
        layer: &str,
    ) -> Result<SyncReport, GraphError> {
        if !host.list_render_layers().iter().any(|l| l.name == layer) {
            return Err(GraphError::UnknownLayer(layer.to_string()));
        }
        OutputRegistry::ensure_graph(host)?;
        OutputRegistry::get_or_create_input_node(host, &self.config.layout, layer)?;
        let report = ConnectionHandler::sync_layer(host, &self.config, layer)?;
        LayoutHandler::relayout_all(host, &self.config.layout)?;
        Ok(report)
    }

    /// `setup_layer` for every enabled render layer.
    pub fn sync_all<H: SceneHost + ?Sized>(
        &self,
        host: &mut H,
    ) -> Result<Vec<(String, SyncReport)>, GraphError> {
        let mut reports = Vec::new();
        for layer in host.list_render_layers() {
            if !layer.enabled {
                debug!("Skipping disabled layer '{}'", layer.name);
                continue;
            }
            let report = self.setup_layer(host, &layer.name)?;
            reports.push((layer.name, report));
        }
        info!("Synced {} render layer(s)", reports.len());
        Ok(reports)
    }

    /// Wires the layer's passes and relayouts when the graph changed shape.
    pub fn sync_layer<H: SceneHost + ?Sized>(
        &self,
        host: &mut H,
        layer: &str,
    ) -> Result<SyncReport, GraphError> {
        let report = ConnectionHandler::sync_layer(host, &self.config, layer)?;
        if report.linked > 0 || report.removed_stale > 0 {
            LayoutHandler::relayout_all(host, &self.config.layout)?;
        }
        Ok(report)
    }

    /// Switches an AOV on in the host and wires it.
    pub fn enable_aov<H: SceneHost + AovHost + ?Sized>(
        &self,
        host: &mut H,
        layer: &str,
        name: &str,
    ) -> Result<SyncReport, GraphError> {
        aov::set_aov_enabled(host, layer, name, true)?;
        self.setup_layer(host, layer)
    }

    /// Unwires an AOV, switches it off in the host and relayouts. Returns the number of
    /// slots removed.
    pub fn disable_aov<H: SceneHost + AovHost + ?Sized>(
        &self,
        host: &mut H,
        layer: &str,
        name: &str,
    ) -> Result<usize, GraphError> {
        let entry = aov::find(name).ok_or_else(|| GraphError::UnknownAov(name.to_string()))?;
        let removed = ConnectionHandler::remove_pass(host, layer, entry.canonical_name)?;
        aov::set_aov_enabled(host, layer, name, false)?;
        LayoutHandler::relayout_all(host, &self.config.layout)?;
        Ok(removed)
    }

    pub fn remove_pass<H: SceneHost + ?Sized>(
        &self,
        host: &mut H,
        layer: &str,
        pass_name: &str,
    ) -> Result<usize, GraphError> {
        let removed = ConnectionHandler::remove_pass(host, layer, pass_name)?;
        LayoutHandler::relayout_all(host, &self.config.layout)?;
        Ok(removed)
    }

    /// Called when a render layer is about to go away.
    pub fn delete_layer_nodes<H, P>(
        &self,
        host: &mut H,
        prompt: &mut P,
        layer: &str,
    ) -> Result<CascadeOutcome, GraphError>
    where
        H: SceneHost + ?Sized,
        P: ConfirmPrompt + ?Sized,
    {
        CleanupHandler::cascade_delete(host, prompt, &self.config.layout, layer)
    }

    pub fn set_layer_muted<H: SceneHost + ?Sized>(
        &self,
        host: &mut H,
        layer: &str,
        muted: bool,
    ) -> Result<usize, GraphError> {
        CleanupHandler::toggle_layer_enabled(host, layer, muted)
    }

    pub fn sweep_layer<H: SceneHost + ?Sized>(
        &self,
        host: &mut H,
        layer: &str,
    ) -> Result<usize, GraphError> {
        let removed = CleanupHandler::sweep_layer(host, layer)?;
        LayoutHandler::relayout_all(host, &self.config.layout)?;
        Ok(removed)
    }

    /// Points the layer's output nodes at the directory of `render_output_path`.
    /// Returns the number of nodes updated.
    pub fn set_output_paths<H: SceneHost + ?Sized>(
        &self,
        host: &mut H,
        layer: &str,
        render_output_path: &str,
    ) -> Result<usize, GraphError> {
        let padding = host.frame_padding();
        let mut updated = 0;
        for handle in OutputRegistry::get_layer_nodes(host, layer).iter() {
            let path = naming::output_path(render_output_path, layer, handle.kind, padding);
            let done = with_named_node(host, &handle.stable_name, |host, node| {
                host.set_node_property(node, PropertyKey::BasePath, PropertyValue::text(&path))
            })?;
            if done.is_some() {
                debug!("'{}' now writes to '{}'", handle.stable_name, path);
                updated += 1;
            }
        }
        Ok(updated)
    }

    /// Names of all passes linked into generated output nodes. `Image` is reported as
    /// `beauty`; with several input nodes each name is prefixed with its layer.
    pub fn connected_passes<H: SceneHost + ?Sized>(
        &self,
        host: &H,
    ) -> Result<Vec<String>, GraphError> {
        let inputs = OutputRegistry::input_nodes(host);
        let prefixed = inputs.len() > 1;
        let mut names: Vec<String> = Vec::new();
        for (layer, input) in &inputs {
            for handle in OutputRegistry::get_layer_nodes(host, layer).iter() {
                for slot in host.list_slots(handle.node)? {
                    let Some(source) = host.slot_source(handle.node, &slot) else {
                        continue;
                    };
                    if source.node != *input {
                        continue;
                    }
                    let pass = if source.name == taxonomy::BEAUTY_PASS {
                        taxonomy::BEAUTY_SLOT
                    } else {
                        source.name.as_str()
                    };
                    let name = if prefixed {
                        format!("{}_{}", layer, pass)
                    } else {
                        pass.to_string()
                    };
                    if !names.contains(&name) {
                        names.push(name);
                    }
                }
            }
        }
        Ok(names)
    }

    /// Enabled passes of `layer` in display order with the node each is written by.
    pub fn pass_overview<H: SceneHost + ?Sized>(&self, host: &H, layer: &str) -> Vec<PassOverviewEntry> {
        let names: Vec<String> = host
            .get_enabled_passes(layer)
            .into_iter()
            .map(|p| p.canonical_name)
            .collect();
        taxonomy::display_order(&names)
            .into_iter()
            .map(|(name, category)| PassOverviewEntry {
                name,
                category,
                output: OutputKind::for_category(category),
            })
            .collect()
    }
}
