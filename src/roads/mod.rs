//! Road network: linked vertex chains, junction polygons and snapping.

pub mod graph;
pub mod intersection;
pub mod road;
pub mod segment_group;

pub use graph::RoadGraph;
pub use intersection::{Direction, Intersection};
pub use road::{IntersectionId, LinkedVertex, Road, RoadId, VertexId};
pub use segment_group::{Projection, SegmentGroup};
