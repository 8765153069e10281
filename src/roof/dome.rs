//! Revolution roofs: the outer ring scaled toward the apex level by level.

use std::f64::consts::FRAC_PI_2;

use super::pyramidal::apex;
use super::{RoofGeometry, RoofParams, group_skirt, textures};
use crate::config::RoofConfig;
use crate::error::{Error, Result};
use crate::geometry::{EPSILON, Multipolygon, Point2D, PointExt};
use crate::mesh::builder::normalize;
use crate::mesh::{MeshBuilder, Vertex};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevolutionProfile {
    /// Radius shrinks monotonically along a quarter circle
    Dome,
    /// Bulges past the footprint before tapering to a point
    Onion,
}

pub const DOME: RevolutionProfile = RevolutionProfile::Dome;
pub const ONION: RevolutionProfile = RevolutionProfile::Onion;

/// (radius scale, height fraction) control points of an onion dome
const ONION_PROFILE: &[(f64, f64)] = &[
    (1.0, 0.0),
    (1.15, 0.1),
    (1.25, 0.25),
    (1.15, 0.4),
    (0.85, 0.55),
    (0.5, 0.7),
    (0.25, 0.82),
    (0.1, 0.92),
    (0.0, 1.0),
];

impl RevolutionProfile {
    /// Profile from the eave (radius 1, height 0) to the tip (radius 0, height 1)
    fn levels(&self, segments: usize) -> Vec<(f64, f64)> {
        match self {
            RevolutionProfile::Dome => {
                let segments = segments.max(2);
                (0..=segments)
                    .map(|i| {
                        let angle = i as f64 / segments as f64 * FRAC_PI_2;
                        if i == segments {
                            (0.0, 1.0)
                        } else {
                            (angle.cos(), angle.sin())
                        }
                    })
                    .collect()
            }
            RevolutionProfile::Onion => ONION_PROFILE.to_vec(),
        }
    }

    pub fn can_extend_outside_footprint(&self) -> bool {
        matches!(self, RevolutionProfile::Onion)
    }
}

pub fn build_group(
    footprint: &Multipolygon,
    group: usize,
    params: &RoofParams,
    profile: RevolutionProfile,
    config: &RoofConfig,
) -> Result<RoofGeometry> {
    let outer = footprint.ring(footprint.groups()[group].outer).points();
    let center = apex(footprint, group)?;
    let levels = profile.levels(config.dome_segments);
    let n = outer.len();

    // Running perimeter for the u coordinate
    let mut perimeter = Vec::with_capacity(n + 1);
    let mut total = 0.0;
    for i in 0..=n {
        perimeter.push(total);
        total += outer[i % n].distance_to(outer[(i + 1) % n]);
    }

    // Arc length of the profile for the v coordinate, at unit radius
    let mut arc = vec![0.0; levels.len()];
    for k in 1..levels.len() {
        let (r0, h0) = levels[k - 1];
        let (r1, h1) = levels[k];
        arc[k] = arc[k - 1] + (r1 - r0).hypot((h1 - h0) * params.height);
    }

    let position = |k: usize, i: usize| -> Point2D {
        let (scale, _) = levels[k];
        center + (outer[i % n] - center) * scale
    };
    let vertex = |k: usize, i: usize| {
        let p = position(k, i);
        let (scale, fraction) = levels[k];
        Vertex::new(
            [p.x, params.min_height + fraction * params.height, p.y],
            [perimeter[i] * scale, arc[k]],
        )
    };
    let normal = |k: usize, i: usize| -> [f64; 3] {
        let radial = outer[i % n] - center;
        let reach = radial.length();
        let Some(dir) = radial.normalized() else {
            return [0.0, 1.0, 0.0];
        };
        let (prev, next) = (levels[k.saturating_sub(1)], levels[(k + 1).min(levels.len() - 1)]);
        let dr = (next.0 - prev.0) * reach;
        let dh = (next.1 - prev.1) * params.height;
        // Perpendicular to the profile tangent, away from the axis
        normalize([dh * dir.x, -dr, dh * dir.y]).unwrap_or([0.0, 1.0, 0.0])
    };

    let mut builder = MeshBuilder::new().with_flip(params.flip);
    for k in 0..levels.len() - 1 {
        let tip = levels[k + 1].0 < EPSILON;
        for i in 0..n {
            let j = i + 1;
            if tip {
                builder.add_smooth_triangle(
                    [vertex(k, i), vertex(k, j), vertex(k + 1, i)],
                    [normal(k, i), normal(k, j), normal(k + 1, i)],
                    textures::METAL,
                );
                continue;
            }
            builder.add_smooth_triangle(
                [vertex(k, i), vertex(k, j), vertex(k + 1, j)],
                [normal(k, i), normal(k, j), normal(k + 1, j)],
                textures::METAL,
            );
            builder.add_smooth_triangle(
                [vertex(k, i), vertex(k + 1, j), vertex(k + 1, i)],
                [normal(k, i), normal(k + 1, j), normal(k + 1, i)],
                textures::METAL,
            );
        }
    }

    if builder.is_empty() {
        return Err(Error::DegenerateGeometry(
            "revolution profile produced no triangles".to_string(),
        ));
    }

    Ok(RoofGeometry {
        mesh: builder.finish(),
        skirt: group_skirt(footprint, group, |_| params.min_height),
        can_extend_outside_footprint: profile.can_extend_outside_footprint(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::pt;
    use crate::roof::{RoofBuilder, RoofType, skeleton::ConvexSkeleton};
    use approx::assert_relative_eq;

    fn square() -> Multipolygon {
        Multipolygon::from_outer(vec![pt(0.0, 0.0), pt(10.0, 0.0), pt(10.0, 10.0), pt(0.0, 10.0)])
            .unwrap()
    }

    #[test]
    fn test_dome_profile_is_decreasing() {
        let levels = DOME.levels(8);
        assert_eq!(levels.len(), 9);
        assert!(levels.windows(2).all(|w| w[1].0 < w[0].0 && w[1].1 > w[0].1));
        assert_eq!(levels[8], (0.0, 1.0));
    }

    #[test]
    fn test_dome_stays_inside_footprint() {
        let params = RoofParams::new(RoofType::Dome, 3.0, 5.0);
        let geometry = build_group(&square(), 0, &params, DOME, &RoofConfig::default()).unwrap();

        assert!(!geometry.can_extend_outside_footprint);
        for p in geometry.mesh.positions.chunks(3) {
            assert!((-1e-4..=10.0001).contains(&p[0]));
            assert!((-1e-4..=10.0001).contains(&p[2]));
        }
        let top = geometry.mesh.positions.chunks(3).map(|p| p[1]).fold(f32::MIN, f32::max);
        assert_relative_eq!(top, 8.0, epsilon = 1e-5);
        // Smooth normals lean away from the center
        for (p, n) in geometry
            .mesh
            .positions
            .chunks(3)
            .zip(geometry.mesh.normals.chunks(3))
        {
            let (dx, dz) = (p[0] - 5.0, p[2] - 5.0);
            assert!(n[0] * dx + n[2] * dz >= -1e-4);
            assert!(n[1] >= 0.0);
        }
    }

    #[test]
    fn test_onion_bulges_and_is_kept() {
        let builder = RoofBuilder::new(&ConvexSkeleton, RoofConfig::default());
        let geometry = builder.build(&square(), &RoofParams::new(RoofType::Onion, 3.0, 5.0));

        assert!(geometry.can_extend_outside_footprint);
        let max_x = geometry.mesh.positions.chunks(3).map(|p| p[0]).fold(f32::MIN, f32::max);
        assert!(max_x > 10.5);
        // Not replaced by the flat fallback
        assert!(geometry.mesh.positions.chunks(3).any(|p| p[1] > 7.9));
    }
}
