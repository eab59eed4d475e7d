pub mod cleanup_handler;
pub mod connection_handler;
pub mod layout_handler;
pub mod registry_handler;

pub use cleanup_handler::{CascadeOutcome, CleanupHandler};
pub use connection_handler::{ConnectionHandler, SyncReport};
pub use layout_handler::{ClusterPlacement, LayoutHandler};
pub use registry_handler::OutputRegistry;

use crate::error::GraphError;
use crate::host::NodeGraph;
use crate::model::NodeRef;
use log::{debug, warn};

/// Runs `op` on the node currently carrying `name`.
///
/// A handle that goes stale during `op` is re-resolved by name once. Returns `Ok(None)`
/// when the name does not resolve (any more).
pub fn with_named_node<H, T, F>(host: &mut H, name: &str, mut op: F) -> Result<Option<T>, GraphError>
where
    H: NodeGraph + ?Sized,
    F: FnMut(&mut H, NodeRef) -> Result<T, GraphError>,
{
    for attempt in 0..2 {
        let Some(node) = host.find_node_by_name(name) else {
            return Ok(None);
        };
        match op(host, node) {
            Ok(value) => return Ok(Some(value)),
            Err(e) if e.is_stale() => {
                debug!("Handle for '{}' went stale (attempt {})", name, attempt + 1);
            }
            Err(e) => return Err(e),
        }
    }
    warn!("Could not re-resolve node '{}', skipping", name);
    Ok(None)
}
