pub mod connection;
pub mod layer;
pub mod node;
pub mod output;

pub use connection::{Link, SlotId, SocketRef};
pub use layer::{PassDescriptor, RenderLayer};
pub use node::{Dimensions, NodeKind, NodeRef, Position, PropertyKey, PropertyValue};
pub use output::{ColorDepth, FileFormat, OutputKind, OutputNodeHandle, OutputNodeTriad, Rgb};
