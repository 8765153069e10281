use rand::{Rng, SeedableRng};
use rand_xorshift::XorShiftRng;

use super::{RoofGeometry, RoofParams, group_skirt, textures};
use crate::config::RoofConfig;
use crate::geometry::Multipolygon;
use crate::mesh::{Facing, MeshBuilder, Vertex};

/// Flat roof over every ring group at `height`
pub fn build(
    footprint: &Multipolygon,
    params: &RoofParams,
    height: f64,
    config: &RoofConfig,
) -> RoofGeometry {
    let mut geometry = RoofGeometry::default();
    for group in 0..footprint.groups().len() {
        geometry.append(build_group(footprint, group, params, height, config));
    }
    geometry
}

/// Flat roof over one ring group.
///
/// Also the fallback for every other roof shape, so it cannot fail: a group
/// that does not triangulate yields an empty mesh but still gets its skirt.
pub fn build_group(
    footprint: &Multipolygon,
    group: usize,
    params: &RoofParams,
    height: f64,
    config: &RoofConfig,
) -> RoofGeometry {
    let texture_id = texture_for(footprint, params, config);
    let mut builder = MeshBuilder::new().with_flip(params.flip);

    for tri in footprint.group_triangles(group) {
        builder.add_triangle(
            tri.map(|p| Vertex::new([p.x, height, p.y], [p.x, p.y])),
            Facing::Up,
            texture_id,
        );
    }

    RoofGeometry {
        mesh: builder.finish(),
        skirt: group_skirt(footprint, group, |_| height),
        can_extend_outside_footprint: false,
    }
}

/// Texture for a flat roof.
///
/// Mid-sized roofs get a variant seeded by the feature id; tiny roofs and
/// roofs with large bounds keep the descriptor texture so a tiled texture is
/// not stretched or repeated conspicuously.
pub fn texture_for(footprint: &Multipolygon, params: &RoofParams, config: &RoofConfig) -> u8 {
    let area = footprint.area();
    let aabb_area = footprint.aabb().area();
    if area <= config.flat_texture_min_area || aabb_area >= config.flat_texture_max_aabb_area {
        return params.texture_id;
    }

    let mut rng = XorShiftRng::seed_from_u64(params.feature_id);
    textures::FLAT_VARIANTS[rng.gen_range(0..textures::FLAT_VARIANTS.len())]
}
