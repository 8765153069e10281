//! Power-line network: typed support nodes joined by wire segments.

pub mod graph;

pub use graph::{
    NodeKey, PowerlineEntities, PowerlineGraph, PowerlineNode, PowerlineNodeType,
    PowerlineSegment,
};
