//! Junction polygons.
//!
//! Each road leaving the junction is treated as a band of its width with a
//! left and a right edge. Sorting the bands by angle and intersecting the
//! left edge of each band with the right edge of the next one gives the
//! corners of the junction; the bands are trimmed back to just past those
//! corners so road ribbons and the junction slab do not overlap. Where two
//! neighboring bands are more than a half turn apart, the outside of the bend
//! is closed with a miter corner, or with the bands' cross-sections at the
//! center when the miter would be too long.

use std::cmp::Ordering;

use super::road::{IntersectionId, Road, RoadId, VertexId};
use crate::geometry::{EPSILON, Point2D, PointExt, line_intersection};

/// Longest outside miter, in multiples of the wider half width
const MITER_LIMIT: f64 = 2.0;

/// One road leaving the junction toward a neighboring vertex
#[derive(Debug, Clone, PartialEq)]
pub struct Direction {
    pub road: RoadId,
    /// Vertex of `road` sitting at the junction center
    pub vertex: VertexId,
    /// Neighbor vertex the direction points to
    pub toward: VertexId,
    pub toward_point: Point2D,
    pub width: f64,
    /// Where the straight road geometry should begin, once computed
    pub trimmed_end: Option<Point2D>,
}

impl Direction {
    fn unit(&self, center: Point2D) -> Option<Point2D> {
        (self.toward_point - center).normalized()
    }

    fn length(&self, center: Point2D) -> f64 {
        center.distance_to(self.toward_point)
    }
}

#[derive(Debug, Clone)]
pub struct Intersection {
    id: IntersectionId,
    center: Point2D,
    directions: Vec<Direction>,
    polygon: Option<Vec<Point2D>>,
}

impl Intersection {
    pub fn new(id: IntersectionId, center: Point2D) -> Self {
        Self {
            id,
            center,
            directions: Vec::new(),
            polygon: None,
        }
    }

    pub fn id(&self) -> IntersectionId {
        self.id
    }

    pub fn center(&self) -> Point2D {
        self.center
    }

    pub fn directions(&self) -> &[Direction] {
        &self.directions
    }

    /// Register the direction from `vertex` (at the center) toward `toward`
    pub fn add_direction(&mut self, road: &Road, vertex: VertexId, toward: VertexId) {
        self.directions.push(Direction {
            road: road.id(),
            vertex,
            toward,
            toward_point: road.vertex(toward).point,
            width: road.width(),
            trimmed_end: None,
        });
        self.polygon = None;
    }

    /// Trimmed end recorded for the direction along `road` toward `toward`
    pub fn trimmed_end(&self, road: RoadId, toward: VertexId) -> Option<Point2D> {
        self.directions
            .iter()
            .find(|d| d.road == road && d.toward == toward)
            .and_then(|d| d.trimmed_end)
    }

    /// Trimmed ends of every direction, in registration order
    pub fn trimmed_ends(&self) -> Vec<Point2D> {
        self.directions.iter().filter_map(|d| d.trimmed_end).collect()
    }

    /// Junction boundary, computed on first use.
    ///
    /// Also records every direction's trimmed end.
    pub fn polygon(&mut self) -> &[Point2D] {
        if self.polygon.is_none() {
            let polygon = self.compute_polygon();
            self.polygon = Some(polygon);
        }
        self.polygon.as_deref().unwrap_or_default()
    }

    fn compute_polygon(&mut self) -> Vec<Point2D> {
        let center = self.center;

        // Directions with a usable heading, sorted counter-clockwise
        let mut order: Vec<(usize, Point2D)> = self
            .directions
            .iter()
            .enumerate()
            .filter_map(|(i, d)| d.unit(center).map(|u| (i, u)))
            .collect();
        order.sort_by(|(_, a), (_, b)| {
            a.y.atan2(a.x)
                .partial_cmp(&b.y.atan2(b.x))
                .unwrap_or(Ordering::Equal)
        });

        let m = order.len();
        if m == 0 {
            return Vec::new();
        }

        let halves: Vec<f64> = order
            .iter()
            .map(|&(i, _)| self.directions[i].width / 2.0)
            .collect();
        let lengths: Vec<f64> = order
            .iter()
            .map(|&(i, _)| self.directions[i].length(center))
            .collect();
        let left_origin = |k: usize| center + order[k].1.left_normal() * halves[k];
        let right_origin = |k: usize| center + order[k].1.right_normal() * halves[k];

        // corners[k] sits between direction k and the next one counter-clockwise
        let corners: Vec<Option<Point2D>> = (0..m)
            .map(|k| {
                let j = (k + 1) % m;
                if m < 2 || order[k].1.cross(order[j].1) <= EPSILON {
                    return None;
                }
                line_intersection(left_origin(k), order[k].1, right_origin(j), order[j].1)
                    .map(|s| left_origin(k) + order[k].1 * s)
            })
            .collect();

        let mut trims = vec![0.0; m];
        for k in 0..m {
            let prev = (k + m - 1) % m;
            let dir = order[k].1;
            let reach = [corners[k], corners[prev]]
                .into_iter()
                .flatten()
                .map(|c| (c - center).dot(dir))
                .fold(0.0, f64::max);
            trims[k] = reach.min(lengths[k]);
        }

        let mut polygon = Vec::with_capacity(m * 3);
        for k in 0..m {
            let j = (k + 1) % m;
            let dir = order[k].1;
            let along = dir * trims[k];
            polygon.push(right_origin(k) + along);
            polygon.push(left_origin(k) + along);
            match corners[k] {
                Some(corner) => polygon.push(corner),
                None => {
                    // Outside of a bend: both edges extended back past the center
                    let limit = MITER_LIMIT * halves[k].max(halves[j]);
                    let miter = line_intersection(
                        left_origin(k),
                        order[k].1,
                        right_origin(j),
                        order[j].1,
                    )
                    .filter(|&s| s <= 0.0)
                    .map(|s| left_origin(k) + order[k].1 * s)
                    .filter(|&c| c.distance_to(center) <= limit);
                    match miter {
                        Some(corner) => polygon.push(corner),
                        None => {
                            polygon.push(left_origin(k));
                            polygon.push(right_origin(j));
                        }
                    }
                }
            }
            self.directions[order[k].0].trimmed_end = Some(center + along);
        }

        polygon.dedup_by(|a, b| a.approx_eq(*b));
        while polygon.len() > 1 && polygon[0].approx_eq(polygon[polygon.len() - 1]) {
            polygon.pop();
        }
        polygon
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Ring, RingKind, pt, signed_area};

    fn star(angles_deg: &[f64], width: f64) -> (Intersection, Vec<Road>) {
        let center = pt(0.0, 0.0);
        let mut intersection = Intersection::new(IntersectionId(0), center);
        let roads: Vec<Road> = angles_deg
            .iter()
            .enumerate()
            .map(|(i, a)| {
                let a = a.to_radians();
                Road::new(RoadId(i), &[center, pt(10.0 * a.cos(), 10.0 * a.sin())], width)
                    .unwrap()
            })
            .collect();
        for road in &roads {
            intersection.add_direction(road, VertexId(0), VertexId(1));
        }
        (intersection, roads)
    }

    #[test]
    fn test_three_way_junction() {
        let (mut intersection, roads) = star(&[0.0, 120.0, 240.0], 2.0);
        let polygon = intersection.polygon().to_vec();

        // Each band is trimmed exactly to its corners, so only the corners remain
        assert_eq!(polygon.len(), 3);
        assert!(signed_area(&polygon) > 0.0);

        let ends = intersection.trimmed_ends();
        assert_eq!(ends.len(), 3);
        for (road, end) in roads.iter().zip(&ends) {
            let first_untrimmed = road.vertex(VertexId(1)).point;
            let center = intersection.center();
            assert!(center.distance_to(*end) < center.distance_to(first_untrimmed));
            assert!(center.distance_to(*end) > 0.0);
            // Half width / tan(60)
            assert!((center.distance_to(*end) - 1.0 / 3f64.sqrt()).abs() < 1e-9);
        }
    }

    #[test]
    fn test_trimmed_end_lookup() {
        let (mut intersection, _) = star(&[0.0, 90.0], 4.0);
        intersection.polygon();
        let end = intersection.trimmed_end(RoadId(0), VertexId(1)).unwrap();
        assert!(end.approx_eq(pt(2.0, 0.0)));
        assert!(intersection.trimmed_end(RoadId(0), VertexId(0)).is_none());
    }

    #[test]
    fn test_right_angle_bend_covers_outer_corner() {
        let (mut intersection, _) = star(&[0.0, 90.0], 2.0);
        let polygon = intersection.polygon().to_vec();

        assert_eq!(polygon.len(), 4);
        assert!((signed_area(&polygon) - 4.0).abs() < 1e-9);
        assert!(polygon.iter().any(|p| p.approx_eq(pt(-1.0, -1.0))));

        // Road surface between the center and the trimmed end stays covered
        let ring = Ring::new(polygon, RingKind::Outer).unwrap();
        assert!(ring.contains_point(pt(0.5, -0.9)));
        assert!(ring.contains_point(pt(-0.9, 0.5)));
    }

    #[test]
    fn test_narrow_fork_falls_back_to_cross_sections() {
        let (mut intersection, _) = star(&[0.0, 10.0], 2.0);
        let polygon = intersection.polygon().to_vec();

        // No long spike behind the center
        assert!(polygon.iter().all(|p| p.distance_to(pt(0.0, 0.0)) < 12.0));
        assert!(polygon.iter().all(|p| p.x > -1.0));
    }

    #[test]
    fn test_straight_through_has_no_corners() {
        let (mut intersection, _) = star(&[0.0, 180.0], 2.0);
        let polygon = intersection.polygon().to_vec();
        // Both bands collapse to the same cross-section at the center
        assert!(polygon.len() <= 2);
        for end in intersection.trimmed_ends() {
            assert!(end.approx_eq(pt(0.0, 0.0)));
        }
    }

    #[test]
    fn test_trim_clamped_to_segment() {
        let center = pt(0.0, 0.0);
        let mut intersection = Intersection::new(IntersectionId(0), center);
        let short = Road::new(RoadId(0), &[center, pt(0.5, 0.0)], 20.0).unwrap();
        let long = Road::new(RoadId(1), &[center, pt(0.0, 50.0)], 20.0).unwrap();
        intersection.add_direction(&short, VertexId(0), VertexId(1));
        intersection.add_direction(&long, VertexId(0), VertexId(1));
        intersection.polygon();

        let end = intersection.trimmed_end(RoadId(0), VertexId(1)).unwrap();
        assert!(end.approx_eq(pt(0.5, 0.0)));
    }
}
