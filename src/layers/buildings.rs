use tracing::{debug, warn};

use crate::config::BuildingConfig;
use crate::domain::BuildingFeature;
use crate::mesh::{Triangle, extrude_footprint, extrude_skirt};
use crate::roof::RoofBuilder;

/// Walls, roofs and eave skirts for every building
///
/// Buildings whose footprint cannot be built are skipped with a warning;
/// every other building always gets a roof, flat at worst.
pub fn generate_building_meshes(
    buildings: &[BuildingFeature],
    roofs: &RoofBuilder,
    config: &BuildingConfig,
) -> Vec<Triangle> {
    let mut all_triangles = Vec::new();

    for building in buildings {
        let footprint = match building.footprint() {
            Ok(footprint) => footprint,
            Err(e) => {
                warn!(feature = building.id, error = %e, "skipping building footprint");
                continue;
            }
        };

        let params = building.roof_params(config);
        let wall_top = params.min_height as f32;
        all_triangles.extend(extrude_footprint(
            &footprint,
            building.min_height as f32,
            wall_top,
        ));

        let roof = roofs.build(&footprint, &params);
        debug!(
            feature = building.id,
            roof = ?params.roof_type,
            triangles = roof.mesh.triangle_count(),
            "built roof"
        );
        all_triangles.extend(roof.mesh.to_triangles());
        for eave in roof.skirt.values() {
            all_triangles.extend(extrude_skirt(eave, wall_top));
        }
    }

    all_triangles
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RoofConfig;
    use crate::input::parse_tile;
    use crate::roof::ConvexSkeleton;

    #[test]
    fn test_gabled_building_has_gable_walls() {
        let tile = parse_tile(
            r#"{"buildings": [{"outer": [[[0,0],[20,0],[20,10],[0,10]]],
                "height": 9, "roof": {"type": "gabled", "height": 3}}]}"#,
        )
        .unwrap();
        let roofs = RoofBuilder::new(&ConvexSkeleton, RoofConfig::default());
        let triangles =
            generate_building_meshes(&tile.buildings, &roofs, &BuildingConfig::default());

        let top = triangles
            .iter()
            .flat_map(|t| t.vertices)
            .map(|v| v[2])
            .fold(f32::MIN, f32::max);
        assert!((top - 9.0).abs() < 1e-5);
        // Nothing below the ground or outside the footprint
        for v in triangles.iter().flat_map(|t| t.vertices) {
            assert!(v[2] >= -1e-5);
            assert!((-1e-3..=20.001).contains(&v[0]));
            assert!((-1e-3..=10.001).contains(&v[1]));
        }
    }

    #[test]
    fn test_bad_footprint_is_skipped() {
        let tile = parse_tile(
            r#"{"buildings": [
                {"outer": [[[0,0],[1,0]]]},
                {"outer": [[[0,0],[10,0],[10,10],[0,10]]]}
            ]}"#,
        )
        .unwrap();
        let roofs = RoofBuilder::new(&ConvexSkeleton, RoofConfig::default());
        let triangles =
            generate_building_meshes(&tile.buildings, &roofs, &BuildingConfig::default());
        // Flat box: 2 bottom + 8 walls + 2 roof
        assert_eq!(triangles.len(), 12);
    }
}
