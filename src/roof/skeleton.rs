//! Straight skeleton oracle interface and a convex reference implementation.

use crate::error::{Error, Result};
use crate::geometry::{EPSILON, Point2D, PointExt, pt, signed_area};

/// A facet vertex with its skeleton height (distance to the base edge line)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkeletonVertex {
    pub point: Point2D,
    pub height: f64,
}

/// One face of a straight skeleton, swept inward from a single footprint edge
#[derive(Debug, Clone, PartialEq)]
pub struct SkeletonFacet {
    /// Boundary loop; the base edge endpoints have height zero
    pub polygon: Vec<SkeletonVertex>,
    /// Originating footprint edge
    pub edge: (Point2D, Point2D),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Skeleton {
    pub facets: Vec<SkeletonFacet>,
    /// Greatest vertex height over all facets
    pub max_height: f64,
}

/// Computes straight skeletons for roof builders.
///
/// Implementations are shared between tile tasks and must not keep hidden
/// mutable state. Callers must not rely on facet order.
pub trait SkeletonOracle: Send + Sync {
    fn facets_for(&self, outer: &[Point2D], holes: &[&[Point2D]]) -> Result<Skeleton>;
}

/// Wavefront vertex: position at the current time and velocity
#[derive(Debug, Clone, Copy)]
struct Wave {
    pos: Point2D,
    vel: Point2D,
}

/// Straight skeleton of convex, hole-free rings.
///
/// Simulates the shrinking wavefront: each step finds the first edge whose
/// two end vertices meet, collapses it into a skeleton node and continues
/// with the remaining edges until two are left. Anything else is rejected
/// with `OracleFailure` so the roof falls back to flat.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConvexSkeleton;

impl SkeletonOracle for ConvexSkeleton {
    fn facets_for(&self, outer: &[Point2D], holes: &[&[Point2D]]) -> Result<Skeleton> {
        if !holes.is_empty() {
            return Err(Error::OracleFailure(
                "convex skeleton does not support holes".to_string(),
            ));
        }
        let mut points = outer.to_vec();
        crate::geometry::point::dedupe_loop(&mut points);
        if points.len() < 3 {
            return Err(Error::OracleFailure(format!(
                "ring has {} vertices",
                points.len()
            )));
        }
        if signed_area(&points) < 0.0 {
            points.reverse();
        }
        let n = points.len();
        for i in 0..n {
            let a = points[i];
            let b = points[(i + 1) % n];
            let c = points[(i + 2) % n];
            if (b - a).cross(c - b) < -EPSILON {
                return Err(Error::OracleFailure("ring is not convex".to_string()));
            }
        }

        let dirs: Vec<Point2D> = (0..n)
            .map(|i| {
                (points[(i + 1) % n] - points[i])
                    .normalized()
                    .ok_or_else(|| Error::OracleFailure("zero-length edge".to_string()))
            })
            .collect::<Result<_>>()?;

        // active[k] is an original edge index; waves[k] sits at its start
        let mut active: Vec<usize> = (0..n).collect();
        let mut waves: Vec<Wave> = (0..n)
            .map(|i| Wave {
                pos: points[i],
                vel: bisector_velocity(dirs[(i + n - 1) % n], dirs[i]),
            })
            .collect();
        let mut start_chain: Vec<Vec<SkeletonVertex>> = vec![Vec::new(); n];
        let mut end_chain: Vec<Vec<SkeletonVertex>> = vec![Vec::new(); n];
        let mut finished: Vec<Option<SkeletonFacet>> = vec![None; n];
        let mut time = 0.0;

        while active.len() > 2 {
            let m = active.len();
            let mut next_event: Option<(f64, usize)> = None;
            for k in 0..m {
                let a = waves[k];
                let b = waves[(k + 1) % m];
                let d = dirs[active[k]];
                let length = (b.pos - a.pos).dot(d);
                let rate = (a.vel - b.vel).dot(d);
                if rate <= EPSILON {
                    continue;
                }
                let dt = (length / rate).max(0.0);
                if next_event.is_none_or(|(best, _)| dt < best) {
                    next_event = Some((dt, k));
                }
            }

            let (dt, k) = next_event.ok_or_else(|| {
                Error::OracleFailure("wavefront stopped before collapsing".to_string())
            })?;
            time += dt;
            for wave in waves.iter_mut() {
                wave.pos = wave.pos + wave.vel * dt;
            }

            let next = (k + 1) % m;
            let node = SkeletonVertex {
                point: (waves[k].pos + waves[next].pos) * 0.5,
                height: time,
            };
            let edge = active[k];
            let prev_edge = active[(k + m - 1) % m];
            let next_edge = active[next];

            start_chain[edge].push(node);
            end_chain[edge].push(node);
            finished[edge] = Some(assemble_facet(
                points[edge],
                points[(edge + 1) % n],
                &start_chain[edge],
                &end_chain[edge],
            ));
            end_chain[prev_edge].push(node);
            start_chain[next_edge].push(node);

            waves[next] = Wave {
                pos: node.point,
                vel: bisector_velocity(dirs[prev_edge], dirs[next_edge]),
            };
            active.remove(k);
            waves.remove(k);
        }

        // The last two edges meet along the final ridge (or at a point)
        for k in 0..active.len() {
            let edge = active[k];
            let start = waves[k];
            let end = waves[(k + 1) % active.len()];
            start_chain[edge].push(SkeletonVertex {
                point: start.pos,
                height: time,
            });
            end_chain[edge].push(SkeletonVertex {
                point: end.pos,
                height: time,
            });
            finished[edge] = Some(assemble_facet(
                points[edge],
                points[(edge + 1) % n],
                &start_chain[edge],
                &end_chain[edge],
            ));
        }

        let facets: Vec<SkeletonFacet> = finished.into_iter().flatten().collect();
        if facets.len() != n || time <= EPSILON {
            return Err(Error::OracleFailure("skeleton did not close".to_string()));
        }

        Ok(Skeleton {
            facets,
            max_height: time,
        })
    }
}

/// Velocity of a wavefront vertex between two edges moving inward at unit speed
fn bisector_velocity(incoming: Point2D, outgoing: Point2D) -> Point2D {
    let n1 = incoming.left_normal();
    let n2 = outgoing.left_normal();
    let det = n1.cross(n2);
    if det.abs() < EPSILON {
        // Collinear edges keep moving together; opposite edges have met
        return if n1.dot(n2) > 0.0 { n1 } else { pt(0.0, 0.0) };
    }
    // Solve v.n1 = 1 and v.n2 = 1
    pt((n2.y - n1.y) / det, (n1.x - n2.x) / det)
}

fn assemble_facet(
    a: Point2D,
    b: Point2D,
    start_chain: &[SkeletonVertex],
    end_chain: &[SkeletonVertex],
) -> SkeletonFacet {
    let mut polygon = vec![
        SkeletonVertex {
            point: a,
            height: 0.0,
        },
        SkeletonVertex {
            point: b,
            height: 0.0,
        },
    ];
    polygon.extend_from_slice(end_chain);
    polygon.extend(start_chain.iter().rev().copied());

    polygon.dedup_by(|x, y| x.point.approx_eq(y.point));
    while polygon.len() > 1 && polygon[0].point.approx_eq(polygon[polygon.len() - 1].point) {
        polygon.pop();
    }

    SkeletonFacet {
        polygon,
        edge: (a, b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn rect(w: f64, h: f64) -> Vec<Point2D> {
        vec![pt(0.0, 0.0), pt(w, 0.0), pt(w, h), pt(0.0, h)]
    }

    #[test]
    fn test_bisector_velocity_square_corner() {
        let v = bisector_velocity(pt(0.0, -1.0), pt(1.0, 0.0));
        assert_relative_eq!(v.x, 1.0);
        assert_relative_eq!(v.y, 1.0);
    }

    #[test]
    fn test_square_is_four_triangles() {
        let skeleton = ConvexSkeleton.facets_for(&rect(10.0, 10.0), &[]).unwrap();
        assert_eq!(skeleton.facets.len(), 4);
        assert_relative_eq!(skeleton.max_height, 5.0, epsilon = 1e-9);
        for facet in &skeleton.facets {
            assert_eq!(facet.polygon.len(), 3);
            assert!(facet.polygon[2].point.approx_eq(pt(5.0, 5.0)));
        }
    }

    #[test]
    fn test_rectangle_has_ridge() {
        let skeleton = ConvexSkeleton.facets_for(&rect(20.0, 10.0), &[]).unwrap();
        assert_eq!(skeleton.facets.len(), 4);
        assert_relative_eq!(skeleton.max_height, 5.0, epsilon = 1e-9);

        let sizes: Vec<usize> = skeleton.facets.iter().map(|f| f.polygon.len()).collect();
        assert_eq!(sizes.iter().filter(|&&s| s == 3).count(), 2);
        assert_eq!(sizes.iter().filter(|&&s| s == 4).count(), 2);

        let ridge_ends: Vec<Point2D> = skeleton
            .facets
            .iter()
            .flat_map(|f| f.polygon.iter())
            .filter(|v| v.height > 4.999)
            .map(|v| v.point)
            .collect();
        assert!(ridge_ends.iter().any(|p| p.approx_eq(pt(5.0, 5.0))));
        assert!(ridge_ends.iter().any(|p| p.approx_eq(pt(15.0, 5.0))));
    }

    #[test]
    fn test_facet_area_sums_to_footprint() {
        let outline = vec![pt(0.0, 0.0), pt(12.0, 0.0), pt(15.0, 6.0), pt(6.0, 11.0), pt(-2.0, 5.0)];
        let skeleton = ConvexSkeleton.facets_for(&outline, &[]).unwrap();
        let total: f64 = skeleton
            .facets
            .iter()
            .map(|f| {
                let pts: Vec<Point2D> = f.polygon.iter().map(|v| v.point).collect();
                signed_area(&pts)
            })
            .sum();
        assert_relative_eq!(total, signed_area(&outline), epsilon = 1e-6);
    }

    #[test]
    fn test_rejects_concave_and_holes() {
        let l_shape = vec![
            pt(0.0, 0.0),
            pt(10.0, 0.0),
            pt(10.0, 4.0),
            pt(4.0, 4.0),
            pt(4.0, 10.0),
            pt(0.0, 10.0),
        ];
        assert!(matches!(
            ConvexSkeleton.facets_for(&l_shape, &[]),
            Err(Error::OracleFailure(_))
        ));

        let hole = rect(1.0, 1.0);
        assert!(ConvexSkeleton.facets_for(&rect(10.0, 10.0), &[&hole]).is_err());
    }
}
