pub mod buildings;
pub mod powerlines;
pub mod roads;

pub use buildings::generate_building_meshes;
pub use powerlines::{build_powerline_graph, generate_powerline_meshes};
pub use roads::{build_road_graph, generate_road_meshes};
