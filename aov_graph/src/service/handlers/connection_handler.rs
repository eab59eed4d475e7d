use std::collections::HashSet;

use log::{debug, info, warn};

use super::{CleanupHandler, OutputRegistry, with_named_node};
use crate::config::EngineConfig;
use crate::error::GraphError;
use crate::host::SceneHost;
use crate::model::{NodeRef, OutputKind, PassDescriptor, SocketRef};
use crate::naming::{self, SlotNamer};
use crate::taxonomy::{self, PassCategory};

/// What one `sync_layer` call did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub linked: usize,
    pub already_linked: usize,
    /// Unrecognised passes, unindexed cryptomatte passes and occupied slots.
    pub skipped: usize,
    /// Slots dropped because their socket is no longer enabled.
    pub removed_stale: usize,
}

/// Wires pass sockets of a layer's input node into its output nodes.
pub struct ConnectionHandler;

impl ConnectionHandler {
    /// Links every enabled, recognised pass of `layer` that is not linked yet.
    ///
    /// Running it twice in a row leaves the graph unchanged.
    pub fn sync_layer<H: SceneHost + ?Sized>(
        host: &mut H,
        config: &EngineConfig,
        layer: &str,
    ) -> Result<SyncReport, GraphError> {
        if !host.list_render_layers().iter().any(|l| l.name == layer) {
            return Err(GraphError::UnknownLayer(layer.to_string()));
        }
        let input = OutputRegistry::get_or_create_input_node(host, &config.layout, layer)?;
        let namer = SlotNamer::new(host.frame_padding());
        let passes = host.get_enabled_passes(layer);
        let mut report = SyncReport::default();

        let enabled_sockets = Self::enabled_sockets(&namer, layer, &passes);
        report.removed_stale = Self::drop_disabled_links(host, layer, input, &enabled_sockets)?;

        for pass in &passes {
            let name = pass.canonical_name.as_str();
            if !taxonomy::is_recognized(name) {
                debug!("Skipping unrecognised pass '{}' on layer '{}'", name, layer);
                report.skipped += 1;
                continue;
            }
            let category = pass.category();
            if category == PassCategory::Cryptomatte && taxonomy::crypto_index(name).is_none() {
                debug!("Skipping cryptomatte pass '{}' without index", name);
                report.skipped += 1;
                continue;
            }
            let kind = OutputKind::for_category(category);

            for (socket_name, slot) in namer.routes(layer, name) {
                let socket = SocketRef::new(input, &socket_name);
                if host.is_socket_linked(&socket) {
                    report.already_linked += 1;
                    continue;
                }

                let output = OutputRegistry::get_or_create_output_node(host, config, layer, kind)?;
                if host.list_slots(output.node)?.contains(&slot) {
                    if let Some(source) = host.slot_source(output.node, &slot) {
                        warn!(
                            "Slot '{}' on '{}' is already fed by '{}', not linking '{}'",
                            slot, output.stable_name, source.name, socket_name
                        );
                        report.skipped += 1;
                        continue;
                    }
                } else {
                    host.add_slot(output.node, &slot)?;
                }
                host.connect(&socket, output.node, &slot)?;
                debug!("Linked '{}' -> {}:'{}'", socket_name, output.stable_name, slot);
                report.linked += 1;
            }
        }

        if report.removed_stale > 0 {
            CleanupHandler::prune_empty(host, layer)?;
        }
        info!(
            "Synced layer '{}': {} linked, {} already linked, {} skipped, {} stale removed",
            layer, report.linked, report.already_linked, report.skipped, report.removed_stale
        );
        Ok(report)
    }

    /// Removes the slot(s) a pass is written through, then prunes emptied output nodes.
    /// Returns the number of slots removed.
    pub fn remove_pass<H: SceneHost + ?Sized>(
        host: &mut H,
        layer: &str,
        pass_name: &str,
    ) -> Result<usize, GraphError> {
        let namer = SlotNamer::new(host.frame_padding());
        let kind = OutputKind::for_category(taxonomy::classify(pass_name));
        let stable_name = naming::output_node_name(layer, kind);
        let slots = namer.slots_for_removal(layer, pass_name);

        let removed = with_named_node(host, &stable_name, |host, node| {
            let existing = host.list_slots(node)?;
            let mut removed = 0;
            for slot in slots.iter().filter(|s| existing.contains(s)) {
                host.remove_slot(node, slot)?;
                removed += 1;
            }
            Ok(removed)
        })?
        .unwrap_or(0);

        if removed > 0 {
            info!("Removed {} slot(s) of pass '{}' from '{}'", removed, pass_name, stable_name);
            CleanupHandler::prune_empty(host, layer)?;
        } else {
            debug!("Pass '{}' has no slot on layer '{}'", pass_name, layer);
        }
        Ok(removed)
    }

    fn enabled_sockets(namer: &SlotNamer, layer: &str, passes: &[PassDescriptor]) -> HashSet<String> {
        passes
            .iter()
            .flat_map(|pass| namer.routes(layer, &pass.canonical_name))
            .map(|(socket, _)| socket)
            .collect()
    }

    /// Drops output slots still fed by a socket of `input` that is no longer enabled.
    fn drop_disabled_links<H: SceneHost + ?Sized>(
        host: &mut H,
        layer: &str,
        input: NodeRef,
        enabled_sockets: &HashSet<String>,
    ) -> Result<usize, GraphError> {
        let triad = OutputRegistry::get_layer_nodes(host, layer);
        let mut removed = 0;
        for handle in triad.iter() {
            removed += with_named_node(host, &handle.stable_name, |host, node| {
                let mut dropped = 0;
                for slot in host.list_slots(node)? {
                    let Some(source) = host.slot_source(node, &slot) else {
                        continue;
                    };
                    if source.node == input && !enabled_sockets.contains(&source.name) {
                        debug!("Dropping slot '{}' of disabled socket '{}'", slot, source.name);
                        host.remove_slot(node, &slot)?;
                        dropped += 1;
                    }
                }
                Ok(dropped)
            })?
            .unwrap_or(0);
        }
        Ok(removed)
    }
}
