use super::{RoofGeometry, RoofParams, group_skirt, textures};
use crate::error::{Error, Result};
use crate::geometry::{EPSILON, Multipolygon, Point2D, PointExt, pt};
use crate::mesh::builder::face_normal;
use crate::mesh::{MeshBuilder, Vertex};

/// Single sloped plane descending toward `params.direction`.
///
/// The footprint is rotated so the slope runs along one axis; heights ramp
/// linearly across the rotated extent of the outer ring.
pub fn build_group(
    footprint: &Multipolygon,
    group: usize,
    params: &RoofParams,
) -> Result<RoofGeometry> {
    let angle = params.direction.unwrap_or(0.0).to_radians();
    let downhill = pt(angle.cos(), angle.sin());
    let across = downhill.left_normal();

    let outer = footprint.ring(footprint.groups()[group].outer);
    let (low, high) = outer
        .points()
        .iter()
        .map(|p| p.dot(downhill))
        .fold((f64::MAX, f64::MIN), |(lo, hi), d| (lo.min(d), hi.max(d)));
    let extent = high - low;
    if extent < EPSILON {
        return Err(Error::DegenerateGeometry(
            "skillion footprint has no extent along its slope".to_string(),
        ));
    }

    let min_height = params.min_height;
    let roof_height = params.height;
    let height_at = |p: Point2D| min_height + roof_height * (high - p.dot(downhill)) / extent;
    let slope_factor = (1.0 + (roof_height / extent).powi(2)).sqrt();
    let vertex = |p: Point2D| {
        Vertex::new(
            [p.x, height_at(p), p.y],
            [p.dot(across), (p.dot(downhill) - low) * slope_factor],
        )
    };

    let triangles = footprint.group_triangles(group);
    let first = triangles.first().ok_or_else(|| {
        Error::DegenerateGeometry("skillion footprint did not triangulate".to_string())
    })?;
    let [a, b, c] = first.map(|p| vertex(p).position);
    let mut normal = face_normal(a, b, c);
    if normal[1] < 0.0 {
        normal = normal.map(|n| -n);
    }

    let mut builder = MeshBuilder::new().with_flip(params.flip);
    for tri in triangles {
        builder.add_triangle_with_normal(tri.map(vertex), normal, textures::ROOF_TILES);
    }

    Ok(RoofGeometry {
        mesh: builder.finish(),
        skirt: group_skirt(footprint, group, height_at),
        can_extend_outside_footprint: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roof::RoofType;
    use approx::assert_relative_eq;

    fn footprint() -> Multipolygon {
        Multipolygon::from_outer(vec![pt(0.0, 0.0), pt(10.0, 0.0), pt(10.0, 4.0), pt(0.0, 4.0)])
            .unwrap()
    }

    #[test]
    fn test_slope_descends_toward_direction() {
        let params = RoofParams {
            direction: Some(0.0),
            ..RoofParams::new(RoofType::Skillion, 3.0, 2.0)
        };
        let geometry = build_group(&footprint(), 0, &params).unwrap();

        for p in geometry.mesh.positions.chunks(3) {
            let expected = 3.0 + 2.0 * (10.0 - p[0]) / 10.0;
            assert_relative_eq!(p[1], expected as f32, epsilon = 1e-5);
        }
        // One shared normal leaning toward +x
        let first = &geometry.mesh.normals[0..3];
        assert!(first[0] > 0.0 && first[1] > 0.0);
        assert!(geometry.mesh.normals.chunks(3).all(|n| n == first));
    }

    #[test]
    fn test_skirt_follows_slope() {
        let params = RoofParams {
            direction: Some(90.0),
            ..RoofParams::new(RoofType::Skillion, 3.0, 2.0)
        };
        let geometry = build_group(&footprint(), 0, &params).unwrap();
        for s in &geometry.skirt[&0] {
            let expected = 3.0 + 2.0 * (4.0 - s.point.y) / 4.0;
            assert_relative_eq!(s.height, expected, epsilon = 1e-9);
        }
    }
}
