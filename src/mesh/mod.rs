pub mod builder;
pub mod extrusion;
pub mod ribbon;
pub mod stl;
pub mod triangulation;
pub mod validation;

pub use builder::{Facing, MeshBuffers, MeshBuilder, Triangle, Vertex};
pub use extrusion::{extrude_footprint, extrude_skirt};
pub use ribbon::{extrude_ribbon, extrude_sloped_ribbon};
pub use stl::write_stl;
pub use triangulation::{triangulate, triangulate_points};
pub use validation::{ValidationResult, validate_and_fix, validate_roof_geometry};
