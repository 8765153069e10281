use std::collections::BTreeMap;
use std::f64::consts::FRAC_PI_2;

use serde::Deserialize;
use tracing::debug;

use crate::geometry::{Point2D, PointExt, coordinate_key};

/// Directions averaging shorter than this leave the rotation untouched
const MIN_AVERAGE_LENGTH: f64 = 0.5;

pub type NodeKey = (i64, i64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerlineNodeType {
    Tower,
    Pole,
    /// Placeholder for a wire end without a support structure
    Ground,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PowerlineNode {
    pub position: Point2D,
    pub node_type: PowerlineNodeType,
    /// Unit vectors of the wires leaving this node
    pub directions: Vec<Point2D>,
    /// Heading of the cross-arm in radians
    pub rotation: f64,
}

impl PowerlineNode {
    pub fn new(position: Point2D, node_type: PowerlineNodeType) -> Self {
        Self {
            position,
            node_type,
            directions: Vec::new(),
            rotation: 0.0,
        }
    }

    pub fn key(&self) -> NodeKey {
        coordinate_key(self.position)
    }

    pub fn add_direction(&mut self, direction: Point2D) {
        if let Some(unit) = direction.normalized() {
            self.directions.push(unit);
        }
    }

    /// Turn perpendicular to the incident directions.
    ///
    /// Several directions are averaged first; when they nearly cancel the
    /// previous rotation is kept.
    pub fn update_rotation(&mut self) {
        let heading = match self.directions.as_slice() {
            [] => return,
            [single] => *single,
            many => {
                let sum = many.iter().fold(Point2D::default(), |acc, &d| acc + d);
                let average = sum / many.len() as f64;
                if average.length() < MIN_AVERAGE_LENGTH {
                    return;
                }
                average
            }
        };
        self.rotation = -heading.y.atan2(heading.x) + FRAC_PI_2;
    }
}

/// Wire between two nodes, referenced by key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PowerlineSegment {
    pub from: NodeKey,
    pub to: NodeKey,
}

/// Immutable snapshot handed to the renderer
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PowerlineEntities {
    pub nodes: Vec<PowerlineNode>,
    /// Index pairs into `nodes`
    pub segments: Vec<(usize, usize)>,
}

/// Staged node and polyline inputs, resolved into a graph by [`process_graph`].
///
/// [`process_graph`]: PowerlineGraph::process_graph
#[derive(Debug, Clone, Default)]
pub struct PowerlineGraph {
    node_inputs: Vec<(Point2D, PowerlineNodeType)>,
    segment_inputs: Vec<(Point2D, Point2D)>,
    nodes: BTreeMap<NodeKey, PowerlineNode>,
    segments: Vec<PowerlineSegment>,
}

impl PowerlineGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage every consecutive point pair as a segment
    pub fn add_powerline_polyline(&mut self, points: &[Point2D]) {
        self.segment_inputs.extend(points.windows(2).map(|w| (w[0], w[1])));
    }

    pub fn add_powerline_node(&mut self, position: Point2D, node_type: PowerlineNodeType) {
        self.node_inputs.push((position, node_type));
    }

    /// Resolve staged inputs into nodes and segments and derive rotations.
    ///
    /// Explicit nodes sharing a coordinate collapse to the first one. Segment
    /// ends with no explicit node get a `Ground` placeholder, which receives
    /// no directions.
    pub fn process_graph(&mut self) {
        self.nodes.clear();
        self.segments.clear();

        for &(position, node_type) in &self.node_inputs {
            self.nodes
                .entry(coordinate_key(position))
                .or_insert_with(|| PowerlineNode::new(position, node_type));
        }

        for &(a, b) in &self.segment_inputs {
            let (from, to) = (coordinate_key(a), coordinate_key(b));
            if from == to {
                continue;
            }
            self.nodes
                .entry(from)
                .or_insert_with(|| PowerlineNode::new(a, PowerlineNodeType::Ground));
            self.nodes
                .entry(to)
                .or_insert_with(|| PowerlineNode::new(b, PowerlineNodeType::Ground));

            // Each end records the wire leaving it
            for (key, direction) in [(from, b - a), (to, a - b)] {
                if let Some(node) = self.nodes.get_mut(&key) {
                    if node.node_type != PowerlineNodeType::Ground {
                        node.add_direction(direction);
                    }
                }
            }
            self.segments.push(PowerlineSegment { from, to });
        }

        for node in self.nodes.values_mut() {
            node.update_rotation();
        }

        debug!(
            nodes = self.nodes.len(),
            segments = self.segments.len(),
            "processed power-line graph"
        );
    }

    pub fn node(&self, position: Point2D) -> Option<&PowerlineNode> {
        self.nodes.get(&coordinate_key(position))
    }

    pub fn nodes(&self) -> impl Iterator<Item = &PowerlineNode> {
        self.nodes.values()
    }

    pub fn segments(&self) -> &[PowerlineSegment] {
        &self.segments
    }

    pub fn create_entities(&self) -> PowerlineEntities {
        let index: BTreeMap<NodeKey, usize> = self
            .nodes
            .keys()
            .enumerate()
            .map(|(i, &key)| (key, i))
            .collect();
        let segments = self
            .segments
            .iter()
            .filter_map(|s| Some((*index.get(&s.from)?, *index.get(&s.to)?)))
            .collect();

        PowerlineEntities {
            nodes: self.nodes.values().cloned().collect(),
            segments,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::pt;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_4;

    #[test]
    fn test_single_direction_rotation() {
        let mut node = PowerlineNode::new(pt(0.0, 0.0), PowerlineNodeType::Pole);
        node.add_direction(pt(1.0, 0.0));
        node.update_rotation();
        assert_relative_eq!(node.rotation, FRAC_PI_2);
    }

    #[test]
    fn test_opposite_directions_keep_rotation() {
        let mut graph = PowerlineGraph::new();
        graph.add_powerline_node(pt(0.0, 0.0), PowerlineNodeType::Tower);
        graph.add_powerline_polyline(&[pt(0.0, 0.0), pt(10.0, 0.0)]);
        graph.add_powerline_polyline(&[pt(0.0, 0.0), pt(-10.0, 0.0)]);
        graph.process_graph();

        let node = graph.node(pt(0.0, 0.0)).unwrap();
        assert_eq!(node.directions.len(), 2);
        assert_eq!(node.rotation, 0.0);
    }

    #[test]
    fn test_straight_through_pole_keeps_default_rotation() {
        let mut graph = PowerlineGraph::new();
        graph.add_powerline_node(pt(10.0, 0.0), PowerlineNodeType::Pole);
        graph.add_powerline_polyline(&[pt(0.0, 0.0), pt(10.0, 0.0), pt(20.0, 0.0)]);
        graph.process_graph();

        let node = graph.node(pt(10.0, 0.0)).unwrap();
        assert_eq!(node.directions, vec![pt(-1.0, 0.0), pt(1.0, 0.0)]);
        assert_eq!(node.rotation, 0.0);
    }

    #[test]
    fn test_corner_pole_turns_to_the_bisector() {
        let mut graph = PowerlineGraph::new();
        graph.add_powerline_node(pt(10.0, 0.0), PowerlineNodeType::Pole);
        graph.add_powerline_node(pt(20.0, 10.0), PowerlineNodeType::Pole);
        graph.add_powerline_polyline(&[pt(0.0, 0.0), pt(10.0, 0.0), pt(10.0, 10.0)]);
        graph.add_powerline_polyline(&[pt(10.0, 10.0), pt(20.0, 10.0)]);
        graph.process_graph();

        // Leaving west and north averages to a heading of 135 degrees
        let corner = graph.node(pt(10.0, 0.0)).unwrap();
        assert_relative_eq!(corner.rotation, -FRAC_PI_4, epsilon = 1e-12);

        // A line end points back along its only wire
        let end = graph.node(pt(20.0, 10.0)).unwrap();
        assert_eq!(end.directions, vec![pt(-1.0, 0.0)]);
        assert_relative_eq!(end.rotation, -FRAC_PI_2, epsilon = 1e-12);
    }

    #[test]
    fn test_ground_placeholders() {
        let mut graph = PowerlineGraph::new();
        graph.add_powerline_node(pt(5.0, 0.0), PowerlineNodeType::Pole);
        graph.add_powerline_node(pt(5.0004, 0.0), PowerlineNodeType::Tower);
        graph.add_powerline_polyline(&[pt(0.0, 0.0), pt(5.0, 0.0), pt(10.0, 0.0)]);
        graph.process_graph();

        assert_eq!(graph.nodes().count(), 3);
        let ends: Vec<_> = graph
            .nodes()
            .filter(|n| n.node_type == PowerlineNodeType::Ground)
            .collect();
        assert_eq!(ends.len(), 2);
        assert!(ends.iter().all(|n| n.directions.is_empty()));
        // Coincident inputs collapse to the first node
        assert_eq!(
            graph.node(pt(5.0, 0.0)).unwrap().node_type,
            PowerlineNodeType::Pole
        );

        let entities = graph.create_entities();
        assert_eq!(entities.nodes.len(), 3);
        assert_eq!(entities.segments.len(), 2);
        for &(a, b) in &entities.segments {
            let span = entities.nodes[a].position.distance_to(entities.nodes[b].position);
            assert_relative_eq!(span, 5.0, epsilon = 1e-3);
        }
    }

    #[test]
    fn test_process_is_repeatable() {
        let mut graph = PowerlineGraph::new();
        graph.add_powerline_node(pt(0.0, 0.0), PowerlineNodeType::Pole);
        graph.add_powerline_polyline(&[pt(0.0, 0.0), pt(3.0, 4.0)]);
        graph.process_graph();
        graph.process_graph();
        assert_eq!(graph.segments().len(), 1);
        assert_eq!(graph.node(pt(0.0, 0.0)).unwrap().directions.len(), 1);
    }
}
