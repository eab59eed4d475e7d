//! Sockets, slots and the links between them.

use serde::{Deserialize, Serialize};

use super::node::NodeRef;

/// Name of one file slot (input) on an output node.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct SlotId(pub String);

impl SlotId {
    pub fn new(name: &str) -> Self {
        Self(name.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SlotId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for SlotId {
    fn from(value: &str) -> Self {
        SlotId::new(value)
    }
}

/// Identifies an output socket (pass) on a render-layer node.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
pub struct SocketRef {
    pub node: NodeRef,
    pub name: String,
}

impl SocketRef {
    pub fn new(node: NodeRef, name: &str) -> Self {
        Self {
            node,
            name: name.to_string(),
        }
    }
}

/// A directed edge from a pass socket into one slot of an output node.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Link {
    pub from: SocketRef,
    pub to_node: NodeRef,
    pub to_slot: SlotId,
}

impl Link {
    pub fn new(from: SocketRef, to_node: NodeRef, to_slot: SlotId) -> Self {
        Self {
            from,
            to_node,
            to_slot,
        }
    }

    pub fn touches(&self, node: NodeRef) -> bool {
        self.from.node == node || self.to_node == node
    }
}
