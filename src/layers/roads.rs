use tracing::{debug, warn};

use crate::config::{RoadLayerConfig, heights};
use crate::domain::RoadFeature;
use crate::geometry::Multipolygon;
use crate::mesh::{Facing, MeshBuilder, Triangle, Vertex, extrude_footprint, extrude_ribbon};
use crate::roads::RoadGraph;

/// Build the road graph and link its intersections
pub fn build_road_graph(roads: &[RoadFeature], config: &RoadLayerConfig) -> RoadGraph {
    let mut graph = RoadGraph::new();
    for (i, road) in roads.iter().enumerate() {
        if let Err(e) = graph.add_road(&road.points(), road.width_or(config.default_width)) {
            warn!(road = i, error = %e, "skipping road");
        }
    }
    graph.build_intersections();
    graph
}

/// Road ribbons between junctions plus one slab per junction
///
/// Ribbons stop at the trimmed ends so they do not overlap the junction
/// slabs, which sit slightly higher.
pub fn generate_road_meshes(graph: &mut RoadGraph, config: &RoadLayerConfig) -> Vec<Triangle> {
    let mut all_triangles = Vec::new();

    let ids: Vec<_> = graph.roads().iter().map(|r| (r.id(), r.width())).collect();
    for (id, width) in ids {
        for piece in graph.trimmed_polylines(id) {
            all_triangles.extend(extrude_ribbon(&piece, width, config.thickness, config.base));
        }
    }

    let bottom = config.base;
    let top = config.base + config.thickness + heights::JUNCTION_LIFT;
    let mut slabs = 0;
    for (id, polygon) in graph.intersection_polygons() {
        if polygon.len() < 3 {
            continue;
        }
        match Multipolygon::from_outer(polygon) {
            Ok(junction) => {
                all_triangles.extend(extrude_footprint(&junction, bottom as f32, top as f32));
                all_triangles.extend(top_cap(&junction, top));
                slabs += 1;
            }
            Err(e) => debug!(intersection = id.0, error = %e, "skipping junction slab"),
        }
    }
    debug!(junctions = slabs, triangles = all_triangles.len(), "built road meshes");

    all_triangles
}

fn top_cap(footprint: &Multipolygon, z: f64) -> Vec<Triangle> {
    let mut builder = MeshBuilder::new();
    for tri in footprint.triangles() {
        builder.add_triangle(
            tri.map(|p| Vertex::new([p.x, z, p.y], [p.x, p.y])),
            Facing::Up,
            0,
        );
    }
    builder.finish().to_triangles()
}
