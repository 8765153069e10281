use super::Triangle;
use crate::geometry::{Point2D, PointExt, pt};

/// Extrude a 2D polyline into a 3D ribbon mesh
///
/// Creates a ribbon of the specified width and thickness from a series of 2D
/// points. The ribbon has top, bottom, side faces and end caps.
///
/// # Arguments
/// * `points` - centerline in tile meters
/// * `width` - Ribbon width in meters
/// * `thickness` - Ribbon height in meters
/// * `base_z` - Base Z level in meters
pub fn extrude_ribbon(points: &[Point2D], width: f64, thickness: f64, base_z: f64) -> Vec<Triangle> {
    let bases = vec![base_z; points.len()];
    extrude_sloped_ribbon(points, &bases, width, thickness)
}

/// Ribbon whose bottom follows a per-point elevation, used for wires
pub fn extrude_sloped_ribbon(
    points: &[Point2D],
    bases: &[f64],
    width: f64,
    thickness: f64,
) -> Vec<Triangle> {
    if points.len() < 2 || bases.len() != points.len() {
        return Vec::new();
    }

    let mut triangles = Vec::new();
    let half_width = width / 2.0;

    // Left and right edge points for each input point
    let edges: Vec<(Point2D, Point2D)> = points
        .iter()
        .enumerate()
        .map(|(i, &p)| {
            let dir = if i == 0 {
                direction(points[0], points[1])
            } else if i == points.len() - 1 {
                direction(points[i - 1], points[i])
            } else {
                // Average directions for a miter join
                let d1 = direction(points[i - 1], points[i]);
                let d2 = direction(points[i], points[i + 1]);
                (d1 + d2).normalized().unwrap_or(d1)
            };

            let offset = dir.left_normal() * half_width;
            (p + offset, p - offset)
        })
        .collect();

    let bottom = |i: usize| bases[i] as f32;
    let top = |i: usize| (bases[i] + thickness) as f32;
    let at = |p: Point2D, z: f32| [p.x as f32, p.y as f32, z];

    for i in 0..edges.len() - 1 {
        let j = i + 1;
        let (l0, r0) = edges[i];
        let (l1, r1) = edges[j];

        // Top face (CCW when viewed from above)
        triangles.push(Triangle::new(at(r0, top(i)), at(r1, top(j)), at(l1, top(j))));
        triangles.push(Triangle::new(at(r0, top(i)), at(l1, top(j)), at(l0, top(i))));

        // Bottom face
        triangles.push(Triangle::new(at(r0, bottom(i)), at(l1, bottom(j)), at(r1, bottom(j))));
        triangles.push(Triangle::new(at(r0, bottom(i)), at(l0, bottom(i)), at(l1, bottom(j))));

        // Left side face
        triangles.push(Triangle::new(at(l0, bottom(i)), at(l0, top(i)), at(l1, top(j))));
        triangles.push(Triangle::new(at(l0, bottom(i)), at(l1, top(j)), at(l1, bottom(j))));

        // Right side face
        triangles.push(Triangle::new(at(r0, bottom(i)), at(r1, top(j)), at(r0, top(i))));
        triangles.push(Triangle::new(at(r0, bottom(i)), at(r1, bottom(j)), at(r1, top(j))));
    }

    // Start cap
    let (l, r) = edges[0];
    triangles.push(Triangle::new(at(l, bottom(0)), at(r, top(0)), at(l, top(0))));
    triangles.push(Triangle::new(at(l, bottom(0)), at(r, bottom(0)), at(r, top(0))));

    // End cap
    let k = edges.len() - 1;
    let (l, r) = edges[k];
    triangles.push(Triangle::new(at(l, bottom(k)), at(l, top(k)), at(r, top(k))));
    triangles.push(Triangle::new(at(l, bottom(k)), at(r, top(k)), at(r, bottom(k))));

    triangles
}

/// Normalized direction vector between two points
fn direction(p1: Point2D, p2: Point2D) -> Point2D {
    (p2 - p1).normalized().unwrap_or(pt(1.0, 0.0))
}
