use tracing::debug;

use crate::config::{PowerlineConfig, heights};
use crate::domain::{PowerlineFeature, PowerlineNodeFeature};
use crate::geometry::{Point2D, PointExt, pt};
use crate::mesh::{Triangle, extrude_sloped_ribbon};
use crate::powerlines::{PowerlineEntities, PowerlineGraph, PowerlineNode, PowerlineNodeType};

/// Samples per wire span
const WIRE_SAMPLES: usize = 8;

pub fn build_powerline_graph(
    lines: &[PowerlineFeature],
    nodes: &[PowerlineNodeFeature],
) -> PowerlineGraph {
    let mut graph = PowerlineGraph::new();
    for node in nodes {
        graph.add_powerline_node(node.position(), node.node_type);
    }
    for line in lines {
        graph.add_powerline_polyline(&line.points());
    }
    graph.process_graph();
    graph
}

/// Support structures as rotated boxes and wires as sagging ribbons
pub fn generate_powerline_meshes(
    entities: &PowerlineEntities,
    config: &PowerlineConfig,
) -> Vec<Triangle> {
    let mut all_triangles = Vec::new();

    for node in &entities.nodes {
        let Some((size, height)) = support_dimensions(node.node_type, config) else {
            continue;
        };
        // Cross-arm runs perpendicular to the wires
        let arm = pt(1.0, 0.0).rotated(-node.rotation);
        all_triangles.extend(generate_box(node.position, arm, size, size, 0.0, height));
        all_triangles.extend(generate_box(
            node.position,
            arm,
            size * 3.0,
            size / 4.0,
            height - size / 4.0,
            height,
        ));
    }

    for &(a, b) in &entities.segments {
        let (from, to) = (&entities.nodes[a], &entities.nodes[b]);
        let (points, bases) = wire_span(from, to, config);
        all_triangles.extend(extrude_sloped_ribbon(
            &points,
            &bases,
            config.wire_width,
            config.wire_width,
        ));
    }

    debug!(
        nodes = entities.nodes.len(),
        wires = entities.segments.len(),
        triangles = all_triangles.len(),
        "built power-line meshes"
    );
    all_triangles
}

/// Footprint size and height; ground nodes have no structure
fn support_dimensions(
    node_type: PowerlineNodeType,
    config: &PowerlineConfig,
) -> Option<(f64, f64)> {
    match node_type {
        PowerlineNodeType::Tower => Some((config.tower_size, config.tower_height)),
        PowerlineNodeType::Pole => Some((config.pole_size, config.pole_height)),
        PowerlineNodeType::Ground => None,
    }
}

fn attach_height(node: &PowerlineNode, config: &PowerlineConfig) -> f64 {
    support_dimensions(node.node_type, config).map_or(heights::GROUND, |(_, h)| h)
}

/// Wire centerline and elevations between two nodes.
///
/// The wire hangs along a parabola whose lowest point keeps `WIRE_SAG` of
/// the lower attachment height.
fn wire_span(
    from: &PowerlineNode,
    to: &PowerlineNode,
    config: &PowerlineConfig,
) -> (Vec<Point2D>, Vec<f64>) {
    let (h0, h1) = (attach_height(from, config), attach_height(to, config));
    let drop = (1.0 - heights::WIRE_SAG) * h0.min(h1);

    (0..=WIRE_SAMPLES)
        .map(|i| {
            let t = i as f64 / WIRE_SAMPLES as f64;
            let p = from.position + (to.position - from.position) * t;
            let h = h0 + (h1 - h0) * t - 4.0 * t * (1.0 - t) * drop;
            (p, h)
        })
        .unzip()
}

/// Box centered on `center` with its length along `axis`
fn generate_box(
    center: Point2D,
    axis: Point2D,
    length: f64,
    depth: f64,
    z_bottom: f64,
    z_top: f64,
) -> Vec<Triangle> {
    let along = axis * (length / 2.0);
    let across = axis.left_normal() * (depth / 2.0);
    // Counter-clockwise from above
    let corners = [
        center - along - across,
        center + along - across,
        center + along + across,
        center - along + across,
    ];
    let at = |p: Point2D, z: f64| [p.x as f32, p.y as f32, z as f32];
    let [c0, c1, c2, c3] = corners;

    let mut triangles = vec![
        // Bottom (normal pointing down)
        Triangle::new(at(c0, z_bottom), at(c2, z_bottom), at(c1, z_bottom)),
        Triangle::new(at(c0, z_bottom), at(c3, z_bottom), at(c2, z_bottom)),
        // Top (normal pointing up)
        Triangle::new(at(c0, z_top), at(c1, z_top), at(c2, z_top)),
        Triangle::new(at(c0, z_top), at(c2, z_top), at(c3, z_top)),
    ];

    for i in 0..4 {
        let (p, q) = (corners[i], corners[(i + 1) % 4]);
        triangles.push(Triangle::new(at(p, z_bottom), at(q, z_bottom), at(q, z_top)));
        triangles.push(Triangle::new(at(p, z_bottom), at(q, z_top), at(p, z_top)));
    }

    triangles
}
