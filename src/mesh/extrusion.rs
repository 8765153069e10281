use super::Triangle;
use crate::geometry::{Multipolygon, Point2D, PointExt};
use crate::roof::SkirtPoint;

/// Extrude building walls from `z_bottom` to `z_top` with a bottom cap.
///
/// Rings follow the winding convention (outer CCW, holes CW), so one wall
/// routine produces outward-facing walls for both.
pub fn extrude_footprint(footprint: &Multipolygon, z_bottom: f32, z_top: f32) -> Vec<Triangle> {
    let mut triangles = Vec::new();
    if z_top <= z_bottom {
        return triangles;
    }

    for tri in footprint.triangles() {
        let ccw = (tri[1] - tri[0]).cross(tri[2] - tri[0]) > 0.0;
        let [p0, p1, p2] = tri.map(|p| [p.x as f32, p.y as f32, z_bottom]);
        // Facing down
        if ccw {
            triangles.push(Triangle::new(p0, p2, p1));
        } else {
            triangles.push(Triangle::new(p0, p1, p2));
        }
    }

    for group in footprint.groups() {
        for &index in std::iter::once(&group.outer).chain(&group.inner) {
            let ring = footprint.ring(index);
            let heights = vec![z_top; ring.points().len()];
            add_side_walls(&mut triangles, ring.points(), &heights, z_bottom);
        }
    }

    triangles
}

/// Close the gap between the wall top and the roof eaves.
///
/// Each skirt is one ring's eave line; wall quads are raised from `z_bottom`
/// to the skirt height at every point. Spans already at the wall top are
/// skipped.
pub fn extrude_skirt(skirt: &[SkirtPoint], z_bottom: f32) -> Vec<Triangle> {
    let points: Vec<Point2D> = skirt.iter().map(|s| s.point).collect();
    let heights: Vec<f32> = skirt.iter().map(|s| s.height as f32).collect();

    let mut triangles = Vec::new();
    add_side_walls(&mut triangles, &points, &heights, z_bottom);
    triangles
}

fn add_side_walls(
    triangles: &mut Vec<Triangle>,
    ring: &[Point2D],
    z_top: &[f32],
    z_bottom: f32,
) {
    let n = ring.len();
    if n < 2 {
        return;
    }

    for i in 0..n {
        let j = (i + 1) % n;
        let (p1, p2) = (ring[i], ring[j]);
        let (t1, t2) = (z_top[i], z_top[j]);
        if t1 <= z_bottom + 1e-4 && t2 <= z_bottom + 1e-4 {
            continue;
        }

        let b1 = [p1.x as f32, p1.y as f32, z_bottom];
        let b2 = [p2.x as f32, p2.y as f32, z_bottom];
        let u1 = [p1.x as f32, p1.y as f32, t1];
        let u2 = [p2.x as f32, p2.y as f32, t2];

        if t2 > z_bottom + 1e-4 {
            triangles.push(Triangle::new(b1, b2, u2));
        }
        if t1 > z_bottom + 1e-4 {
            triangles.push(Triangle::new(b1, u2, u1));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Multipolygon, Ring, RingKind, pt};

    fn square() -> Multipolygon {
        Multipolygon::new(vec![
            Ring::new(
                vec![pt(0.0, 0.0), pt(10.0, 0.0), pt(10.0, 10.0), pt(0.0, 10.0)],
                RingKind::Outer,
            )
            .unwrap(),
        ])
        .unwrap()
    }

    #[test]
    fn test_extrude_square() {
        let triangles = extrude_footprint(&square(), 0.0, 3.0);
        // 2 bottom + 4 walls * 2
        assert_eq!(triangles.len(), 10);
    }

    #[test]
    fn test_walls_face_outward() {
        let triangles = extrude_footprint(&square(), 0.0, 3.0);
        for tri in triangles.iter().skip(2) {
            let cx = tri.vertices.iter().map(|v| v[0]).sum::<f32>() / 3.0 - 5.0;
            let cy = tri.vertices.iter().map(|v| v[1]).sum::<f32>() / 3.0 - 5.0;
            assert!(tri.normal[0] * cx + tri.normal[1] * cy > 0.0);
        }
    }

    #[test]
    fn test_flat_skirt_produces_nothing() {
        let skirt: Vec<SkirtPoint> = [pt(0.0, 0.0), pt(1.0, 0.0), pt(1.0, 1.0)]
            .into_iter()
            .map(|point| SkirtPoint { point, height: 4.0 })
            .collect();
        assert!(extrude_skirt(&skirt, 4.0).is_empty());
    }

    #[test]
    fn test_sloped_skirt() {
        // One edge rises from 4 to 6, the rest sits at the wall top
        let skirt = vec![
            SkirtPoint { point: pt(0.0, 0.0), height: 4.0 },
            SkirtPoint { point: pt(10.0, 0.0), height: 6.0 },
            SkirtPoint { point: pt(10.0, 10.0), height: 4.0 },
        ];
        let triangles = extrude_skirt(&skirt, 4.0);
        assert_eq!(triangles.len(), 2);
    }
}
