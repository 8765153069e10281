use std::cell::OnceCell;

use geo::{Area, MinimumRotatedRect, MultiPoint, Point, Polygon};
use tracing::debug;

use super::bounds::Aabb;
use super::point::{Point2D, PointExt, pt};
use super::ring::Ring;
use crate::error::{Error, Result};
use crate::mesh::triangulation::triangulate_points;
use crate::mesh::{Facing, MeshBuilder, Vertex};

/// Outer ring index plus the indices of the holes it contains
#[derive(Debug, Clone, PartialEq)]
pub struct RingGroup {
    pub outer: usize,
    pub inner: Vec<usize>,
}

/// Oriented minimum bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ombb {
    /// Corners in counter-clockwise order
    pub corners: [Point2D; 4],
}

impl Ombb {
    /// Unit vector along the first edge and its length
    pub fn axis(&self) -> (Point2D, f64) {
        let edge = self.corners[1] - self.corners[0];
        (edge.normalized().unwrap_or(pt(1.0, 0.0)), edge.length())
    }

    /// Unit vector along the second edge and its length
    pub fn cross_axis(&self) -> (Point2D, f64) {
        let edge = self.corners[2] - self.corners[1];
        (edge.normalized().unwrap_or(pt(0.0, 1.0)), edge.length())
    }

    pub fn area(&self) -> f64 {
        self.axis().1 * self.cross_axis().1
    }

    fn from_aabb(aabb: &Aabb) -> Self {
        Self {
            corners: aabb.corners(),
        }
    }
}

/// A footprint made of outer rings and the holes cut into them.
///
/// Immutable after construction; the AABB, OMBB and triangulation are
/// computed on first use and memoized.
#[derive(Debug)]
pub struct Multipolygon {
    rings: Vec<Ring>,
    groups: Vec<RingGroup>,
    aabb: OnceCell<Aabb>,
    ombb: OnceCell<Result<Ombb>>,
    triangles: OnceCell<Vec<Vec<[Point2D; 3]>>>,
}

impl Multipolygon {
    /// Group rings into outer rings and holes.
    ///
    /// An inner ring is assigned to the outer ring containing its first
    /// point; inner rings contained in no outer ring are dropped.
    pub fn new(rings: Vec<Ring>) -> Result<Self> {
        let mut groups: Vec<RingGroup> = rings
            .iter()
            .enumerate()
            .filter(|(_, ring)| ring.is_outer())
            .map(|(outer, _)| RingGroup {
                outer,
                inner: Vec::new(),
            })
            .collect();

        if groups.is_empty() {
            return Err(Error::DegenerateGeometry(
                "multipolygon has no outer ring".to_string(),
            ));
        }

        for (index, ring) in rings.iter().enumerate() {
            if ring.is_outer() {
                continue;
            }
            let sample = ring.points()[0];
            match groups
                .iter_mut()
                .find(|group| rings[group.outer].contains_point(sample))
            {
                Some(group) => group.inner.push(index),
                None => debug!(ring = index, "dropping inner ring outside every outer ring"),
            }
        }

        Ok(Self {
            rings,
            groups,
            aabb: OnceCell::new(),
            ombb: OnceCell::new(),
            triangles: OnceCell::new(),
        })
    }

    /// Convenience constructor for a single outer ring without holes
    pub fn from_outer(points: Vec<Point2D>) -> Result<Self> {
        Self::new(vec![Ring::new(points, super::RingKind::Outer)?])
    }

    pub fn rings(&self) -> &[Ring] {
        &self.rings
    }

    pub fn ring(&self, index: usize) -> &Ring {
        &self.rings[index]
    }

    pub fn groups(&self) -> &[RingGroup] {
        &self.groups
    }

    /// Outer rings only
    pub fn outer_rings(&self) -> impl Iterator<Item = (usize, &Ring)> {
        self.groups
            .iter()
            .map(|group| (group.outer, &self.rings[group.outer]))
    }

    /// Area of the outer rings minus their holes
    pub fn area(&self) -> f64 {
        (0..self.groups.len())
            .map(|group| self.group_polygon(group).unsigned_area())
            .sum()
    }

    /// One ring group as a `geo` polygon with its holes
    pub fn group_polygon(&self, group: usize) -> Polygon<f64> {
        let group = &self.groups[group];
        Polygon::new(
            self.rings[group.outer].to_geo(),
            group.inner.iter().map(|&i| self.rings[i].to_geo()).collect(),
        )
    }

    pub fn aabb(&self) -> Aabb {
        *self.aabb.get_or_init(|| {
            let mut bounds = self.rings[self.groups[0].outer].aabb();
            for (_, ring) in self.outer_rings() {
                for p in ring.points() {
                    bounds.include(*p);
                }
            }
            bounds
        })
    }

    /// Oriented minimum bounding box of the outer rings.
    ///
    /// Fails with `DegenerateGeometry` for fewer than three points or a
    /// near-zero area; see [`Multipolygon::ombb_or_aabb`].
    pub fn ombb(&self) -> Result<Ombb> {
        self.ombb.get_or_init(|| self.compute_ombb()).clone()
    }

    /// OMBB, falling back to the axis-aligned bounds
    pub fn ombb_or_aabb(&self) -> Ombb {
        match self.ombb() {
            Ok(ombb) => ombb,
            Err(e) => {
                debug!(error = %e, "falling back to axis-aligned bounds");
                Ombb::from_aabb(&self.aabb())
            }
        }
    }

    fn compute_ombb(&self) -> Result<Ombb> {
        let points: Vec<Point<f64>> = self
            .outer_rings()
            .flat_map(|(_, ring)| ring.points().iter().map(|&c| Point::from(c)))
            .collect();
        if points.len() < 3 {
            return Err(Error::DegenerateGeometry(
                "OMBB needs at least three points".to_string(),
            ));
        }

        let rect = MultiPoint::new(points)
            .minimum_rotated_rect()
            .ok_or_else(|| Error::DegenerateGeometry("OMBB is undefined".to_string()))?;
        if rect.unsigned_area() < 1e-6 {
            return Err(Error::DegenerateGeometry("OMBB has zero area".to_string()));
        }

        let mut corners: Vec<Point2D> = rect.exterior().0.clone();
        corners.dedup_by(|a, b| a.approx_eq(*b));
        if corners.len() > 1 && corners[0].approx_eq(corners[corners.len() - 1]) {
            corners.pop();
        }
        if corners.len() != 4 {
            return Err(Error::DegenerateGeometry(format!(
                "OMBB has {} corners",
                corners.len()
            )));
        }
        if super::signed_area(&corners) < 0.0 {
            corners.reverse();
        }

        Ok(Ombb {
            corners: [corners[0], corners[1], corners[2], corners[3]],
        })
    }

    fn triangulated_groups(&self) -> &[Vec<[Point2D; 3]>] {
        self.triangles.get_or_init(|| {
            self.groups
                .iter()
                .map(|group| {
                    let holes: Vec<&[Point2D]> =
                        group.inner.iter().map(|&i| self.rings[i].points()).collect();
                    triangulate_points(self.rings[group.outer].points(), &holes).unwrap_or_else(
                        |e| {
                            debug!(error = %e, ring = group.outer, "skipping untriangulable ring");
                            Vec::new()
                        },
                    )
                })
                .collect()
        })
    }

    /// Triangles covering one ring group (outer ring minus its holes)
    pub fn group_triangles(&self, group: usize) -> &[[Point2D; 3]] {
        &self.triangulated_groups()[group]
    }

    /// Triangles covering the footprint (outer rings minus holes)
    pub fn triangles(&self) -> impl Iterator<Item = &[Point2D; 3]> {
        self.triangulated_groups().iter().flatten()
    }

    /// Flat triangle list of the footprint at a uniform height.
    ///
    /// Triangles face up; `flip` makes them face down.
    pub fn footprint(&self, height: f64, flip: bool) -> Vec<f32> {
        let mut builder = MeshBuilder::new().with_flip(flip);
        for tri in self.triangles() {
            builder.add_triangle(
                tri.map(|p| Vertex::new([p.x, height, p.y], [p.x, p.y])),
                Facing::Up,
                0,
            );
        }
        builder.finish().positions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::RingKind;
    use approx::assert_relative_eq;

    fn square(x: f64, y: f64, size: f64, kind: RingKind) -> Ring {
        Ring::new(
            vec![
                pt(x, y),
                pt(x + size, y),
                pt(x + size, y + size),
                pt(x, y + size),
            ],
            kind,
        )
        .unwrap()
    }

    #[test]
    fn test_holes_grouped_with_outer() {
        let mp = Multipolygon::new(vec![
            square(0.0, 0.0, 10.0, RingKind::Outer),
            square(20.0, 0.0, 10.0, RingKind::Outer),
            square(22.0, 2.0, 2.0, RingKind::Inner),
        ])
        .unwrap();

        assert_eq!(mp.groups().len(), 2);
        assert!(mp.groups()[0].inner.is_empty());
        assert_eq!(mp.groups()[1].inner, vec![2]);
        assert_relative_eq!(mp.area(), 196.0);

        let polygon = mp.group_polygon(1);
        assert_eq!(polygon.interiors().len(), 1);
        assert_relative_eq!(polygon.unsigned_area(), 96.0);
    }

    #[test]
    fn test_no_outer_ring_is_degenerate() {
        let result = Multipolygon::new(vec![square(0.0, 0.0, 1.0, RingKind::Inner)]);
        assert!(matches!(result, Err(Error::DegenerateGeometry(_))));
    }

    #[test]
    fn test_footprint_faces_up_and_flips() {
        let mp = Multipolygon::new(vec![
            square(0.0, 0.0, 10.0, RingKind::Outer),
            square(4.0, 4.0, 2.0, RingKind::Inner),
        ])
        .unwrap();

        let up = mp.footprint(3.0, false);
        assert_eq!(up.len() % 9, 0);
        assert!(up.chunks(3).all(|v| v[1] == 3.0));

        let mut area = 0.0;
        for tri in up.chunks(9) {
            let (ax, az) = (tri[0] as f64, tri[2] as f64);
            let (bx, bz) = (tri[3] as f64, tri[5] as f64);
            let (cx, cz) = (tri[6] as f64, tri[8] as f64);
            // Upward normals mean clockwise winding in the (x, z) plane
            let cross = (bx - ax) * (cz - az) - (bz - az) * (cx - ax);
            assert!(cross < 0.0);
            area += -cross / 2.0;
        }
        assert_relative_eq!(area, 96.0, epsilon = 1e-3);

        let down = mp.footprint(3.0, true);
        assert_eq!(down.len(), up.len());
        assert_ne!(down, up);
    }

    #[test]
    fn test_ombb_of_rotated_rectangle() {
        let angle = 30f64.to_radians();
        let points: Vec<Point2D> = [pt(0.0, 0.0), pt(8.0, 0.0), pt(8.0, 2.0), pt(0.0, 2.0)]
            .iter()
            .map(|p| p.rotated(angle))
            .collect();
        let mp = Multipolygon::from_outer(points).unwrap();

        let ombb = mp.ombb().unwrap();
        assert_relative_eq!(ombb.area(), 16.0, epsilon = 1e-6);
        assert!(ombb.area() < mp.aabb().area());
    }

    #[test]
    fn test_ombb_is_memoized() {
        let mp = Multipolygon::new(vec![square(0.0, 0.0, 4.0, RingKind::Outer)]).unwrap();
        assert_eq!(mp.ombb(), mp.ombb());
        assert_relative_eq!(mp.ombb_or_aabb().area(), 16.0, epsilon = 1e-6);
    }
}
