use thiserror::Error;

use crate::model::node::NodeRef;

#[derive(Error, Debug)]
pub enum GraphError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Config parsing error: {0}")]
    Config(#[from] toml::de::Error),
    #[error("Config serialization error: {0}")]
    ConfigWrite(#[from] toml::ser::Error),
    #[error("Node {0} is no longer part of the node graph")]
    StaleNode(NodeRef),
    #[error("Render layer not found: {0}")]
    UnknownLayer(String),
    #[error("Unknown AOV: {0}")]
    UnknownAov(String),
    #[error("Host error: {0}")]
    Host(String),
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl GraphError {
    pub fn host(msg: impl Into<String>) -> Self {
        GraphError::Host(msg.into())
    }

    pub fn is_stale(&self) -> bool {
        matches!(self, GraphError::StaleNode(_))
    }
}
