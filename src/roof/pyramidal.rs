use super::{RoofGeometry, RoofParams, group_skirt, textures};
use crate::error::{Error, Result};
use crate::geometry::{EPSILON, Multipolygon, Point2D, PointExt};
use crate::mesh::{Facing, MeshBuilder, Vertex};

/// Grid precision for the apex search, in meters
pub(crate) const APEX_PRECISION: f64 = 0.1;

/// Pole of inaccessibility of a ring group, used as the apex of pointed roofs
pub(crate) fn apex(footprint: &Multipolygon, group: usize) -> Result<Point2D> {
    polylabel::polylabel(&footprint.group_polygon(group), &APEX_PRECISION)
        .map(|p| p.0)
        .map_err(|e| Error::DegenerateGeometry(format!("no roof apex: {e}")))
}

/// One triangle per outer edge, all meeting at the apex
pub fn build_group(
    footprint: &Multipolygon,
    group: usize,
    params: &RoofParams,
) -> Result<RoofGeometry> {
    let outer = footprint.ring(footprint.groups()[group].outer);
    let center = apex(footprint, group)?;
    let top = params.top();
    let mut builder = MeshBuilder::new().with_flip(params.flip);

    for edge in outer.edges() {
        let Some(dir) = (edge.end - edge.start).normalized() else {
            continue;
        };
        // Apex distance from the edge line; zero when the apex sits on it
        let run = (center - edge.start).cross(dir).abs();
        if run < EPSILON {
            continue;
        }
        let slope = run.hypot(params.height);
        let along = (center - edge.start).dot(dir);

        builder.add_triangle(
            [
                Vertex::new([edge.start.x, params.min_height, edge.start.y], [0.0, 0.0]),
                Vertex::new(
                    [edge.end.x, params.min_height, edge.end.y],
                    [edge.length(), 0.0],
                ),
                Vertex::new([center.x, top, center.y], [along, slope]),
            ],
            Facing::Up,
            textures::ROOF_TILES,
        );
    }

    if builder.is_empty() {
        return Err(Error::DegenerateGeometry(
            "pyramid apex lies on every edge".to_string(),
        ));
    }

    Ok(RoofGeometry {
        mesh: builder.finish(),
        skirt: group_skirt(footprint, group, |_| params.min_height),
        can_extend_outside_footprint: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::pt;
    use crate::roof::RoofType;
    use approx::assert_relative_eq;

    #[test]
    fn test_square_pyramid() {
        let footprint = Multipolygon::from_outer(vec![
            pt(0.0, 0.0),
            pt(10.0, 0.0),
            pt(10.0, 10.0),
            pt(0.0, 10.0),
        ])
        .unwrap();
        let params = RoofParams::new(RoofType::Pyramidal, 4.0, 5.0);
        let geometry = build_group(&footprint, 0, &params).unwrap();

        assert_eq!(geometry.mesh.triangle_count(), 4);
        let apexes: Vec<&[f32]> = geometry
            .mesh
            .positions
            .chunks(3)
            .filter(|p| p[1] > 8.9)
            .collect();
        assert_eq!(apexes.len(), 4);
        for p in apexes {
            assert_relative_eq!(p[0], 5.0, epsilon = 0.2);
            assert_relative_eq!(p[2], 5.0, epsilon = 0.2);
        }
        // Per-triangle normals all point up and outward
        assert!(geometry.mesh.normals.chunks(3).all(|n| n[1] > 0.0));
        assert!(geometry.skirt[&0].iter().all(|s| s.height == 4.0));
    }

    #[test]
    fn test_apex_of_l_shape_stays_inside() {
        let footprint = Multipolygon::from_outer(vec![
            pt(0.0, 0.0),
            pt(20.0, 0.0),
            pt(20.0, 4.0),
            pt(4.0, 4.0),
            pt(4.0, 20.0),
            pt(0.0, 20.0),
        ])
        .unwrap();
        let center = apex(&footprint, 0).unwrap();
        let ring = footprint.ring(0);
        assert!(ring.contains_point(center));
        assert!(ring.distance_to_boundary(center) > 1.5);
    }
}
