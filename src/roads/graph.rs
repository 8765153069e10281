use std::collections::BTreeMap;

use tracing::debug;

use super::intersection::Intersection;
use super::road::{IntersectionId, Road, RoadId, VertexId};
use super::segment_group::SegmentGroup;
use crate::error::Result;
use crate::geometry::{Point2D, PointExt, coordinate_key};

/// Arena of roads plus the intersection table linking their shared vertices
#[derive(Debug, Clone, Default)]
pub struct RoadGraph {
    roads: Vec<Road>,
    intersections: Vec<Intersection>,
}

impl RoadGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_road(&mut self, points: &[Point2D], width: f64) -> Result<RoadId> {
        let id = RoadId(self.roads.len());
        self.roads.push(Road::new(id, points, width)?);
        Ok(id)
    }

    pub fn roads(&self) -> &[Road] {
        &self.roads
    }

    pub fn road(&self, id: RoadId) -> &Road {
        &self.roads[id.0]
    }

    pub fn intersections(&self) -> &[Intersection] {
        &self.intersections
    }

    pub fn intersection(&self, id: IntersectionId) -> &Intersection {
        &self.intersections[id.0]
    }

    /// Link every coordinate shared by two or more road vertices.
    ///
    /// Rebuilds the intersection table from scratch and computes each
    /// junction polygon, which also fixes the trimmed road ends. Returns the
    /// number of intersections.
    pub fn build_intersections(&mut self) -> usize {
        for road in &mut self.roads {
            let ids: Vec<VertexId> = road.vertex_ids().collect();
            for v in ids {
                road.set_intersection(v, None);
            }
        }
        self.intersections.clear();

        let mut shared: BTreeMap<(i64, i64), Vec<(RoadId, VertexId)>> = BTreeMap::new();
        for road in &self.roads {
            for v in road.vertex_ids() {
                shared
                    .entry(coordinate_key(road.vertex(v).point))
                    .or_default()
                    .push((road.id(), v));
            }
        }

        for members in shared.into_values().filter(|m| m.len() >= 2) {
            let id = IntersectionId(self.intersections.len());
            let (first_road, first_vertex) = members[0];
            let center = self.roads[first_road.0].vertex(first_vertex).point;
            let mut intersection = Intersection::new(id, center);

            for &(road_id, v) in &members {
                let road = &self.roads[road_id.0];
                let vertex = road.vertex(v);
                for toward in [vertex.prev, vertex.next].into_iter().flatten() {
                    intersection.add_direction(road, v, toward);
                }
            }
            for &(road_id, v) in &members {
                self.roads[road_id.0].set_intersection(v, Some(id));
            }

            intersection.polygon();
            self.intersections.push(intersection);
        }

        debug!(
            roads = self.roads.len(),
            intersections = self.intersections.len(),
            "built road intersections"
        );
        self.intersections.len()
    }

    /// Junction polygons of every intersection
    pub fn intersection_polygons(&mut self) -> Vec<(IntersectionId, Vec<Point2D>)> {
        self.intersections
            .iter_mut()
            .map(|i| (i.id(), i.polygon().to_vec()))
            .collect()
    }

    /// Centerline pieces of a road between intersections, trimmed back so
    /// they stop where the junction polygons begin.
    ///
    /// Pieces whose trimmed ends cross over are dropped.
    pub fn trimmed_polylines(&self, id: RoadId) -> Vec<Vec<Point2D>> {
        let road = self.road(id);
        let n = road.vertices().len();
        let cuts: Vec<usize> = road
            .vertex_ids()
            .filter(|&v| road.vertex(v).intersection.is_some())
            .map(|v| v.0)
            .collect();

        let runs: Vec<Vec<usize>> = if road.is_closed() {
            if cuts.is_empty() {
                vec![(0..=n).map(|i| i % n).collect()]
            } else {
                (0..cuts.len())
                    .map(|k| {
                        let from = cuts[k];
                        let to = if k + 1 < cuts.len() {
                            cuts[k + 1]
                        } else {
                            cuts[0] + n
                        };
                        (from..=to).map(|i| i % n).collect()
                    })
                    .collect()
            }
        } else {
            let mut breaks: Vec<usize> = vec![0];
            breaks.extend(cuts.iter().copied().filter(|&c| c != 0 && c != n - 1));
            breaks.push(n - 1);
            breaks.windows(2).map(|w| (w[0]..=w[1]).collect()).collect()
        };

        runs.into_iter()
            .filter_map(|run| self.trim_run(road, &run))
            .collect()
    }

    fn trim_run(&self, road: &Road, run: &[usize]) -> Option<Vec<Point2D>> {
        if run.len() < 2 {
            return None;
        }
        let last = run.len() - 1;
        let mut points: Vec<Point2D> = run.iter().map(|&i| road.vertex(VertexId(i)).point).collect();
        let original = (points[0], points[last]);

        let trimmed = |at: usize, toward: usize| {
            road.vertex(VertexId(at))
                .intersection
                .and_then(|i| self.intersections[i.0].trimmed_end(road.id(), VertexId(toward)))
        };
        if let Some(p) = trimmed(run[0], run[1]) {
            points[0] = p;
        }
        if let Some(p) = trimmed(run[last], run[last - 1]) {
            points[last] = p;
        }

        if points.len() == 2 && (points[1] - points[0]).dot(original.1 - original.0) <= 0.0 {
            return None;
        }
        points.dedup_by(|a, b| a.approx_eq(*b));
        (points.len() >= 2).then_some(points)
    }

    /// Every road centerline as one snapping target
    pub fn segment_group(&self) -> SegmentGroup {
        let lines: Vec<Vec<Point2D>> = self.roads.iter().map(Road::points).collect();
        SegmentGroup::from_polylines(lines.iter().map(Vec::as_slice))
    }
}
