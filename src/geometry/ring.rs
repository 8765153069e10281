use geo::{Contains, LineString, Point, Polygon};

use super::bounds::Aabb;
use super::point::{EPSILON, Point2D, dedupe_loop, signed_area};
use super::segment::Segment;
use crate::error::{Error, Result};
use serde::Deserialize;

/// Whether a ring bounds a solid area or a hole
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RingKind {
    Outer,
    Inner,
}

/// A closed loop of points.
///
/// Points are stored without the repeated closing point. Outer rings wind
/// counter-clockwise, inner rings clockwise; the constructor re-winds input
/// that arrives the other way around.
#[derive(Debug, Clone, PartialEq)]
pub struct Ring {
    points: Vec<Point2D>,
    kind: RingKind,
}

impl Ring {
    pub fn new(mut points: Vec<Point2D>, kind: RingKind) -> Result<Self> {
        dedupe_loop(&mut points);
        if points.len() < 3 {
            return Err(Error::DegenerateGeometry(format!(
                "ring has {} distinct points",
                points.len()
            )));
        }

        let area = signed_area(&points);
        if area.abs() < EPSILON {
            return Err(Error::DegenerateGeometry("ring has zero area".to_string()));
        }

        let wants_ccw = kind == RingKind::Outer;
        if (area > 0.0) != wants_ccw {
            points.reverse();
        }

        Ok(Self { points, kind })
    }

    pub fn points(&self) -> &[Point2D] {
        &self.points
    }

    pub fn kind(&self) -> RingKind {
        self.kind
    }

    pub fn is_outer(&self) -> bool {
        self.kind == RingKind::Outer
    }

    /// Edges of the loop, including the closing edge
    pub fn edges(&self) -> impl Iterator<Item = Segment> + '_ {
        let n = self.points.len();
        (0..n).map(move |i| Segment::new(self.points[i], self.points[(i + 1) % n]))
    }

    /// Unsigned enclosed area
    pub fn area(&self) -> f64 {
        signed_area(&self.points).abs()
    }

    pub fn aabb(&self) -> Aabb {
        // A ring always has at least three points
        Aabb::from_points(&self.points).unwrap_or(Aabb {
            min_x: 0.0,
            max_x: 0.0,
            min_y: 0.0,
            max_y: 0.0,
        })
    }

    /// Closed `geo` line string of the loop
    pub fn to_geo(&self) -> LineString<f64> {
        let mut line = LineString::from(self.points.clone());
        line.close();
        line
    }

    /// Strict interior test; points on the boundary are outside
    pub fn contains_point(&self, p: Point2D) -> bool {
        Polygon::new(self.to_geo(), vec![]).contains(&Point::from(p))
    }

    /// Distance from `p` to the nearest edge
    pub fn distance_to_boundary(&self, p: Point2D) -> f64 {
        self.edges()
            .map(|edge| edge.distance_to(p))
            .fold(f64::INFINITY, f64::min)
    }
}
