//! Roof builders.
//!
//! Every roof shape turns a [`Multipolygon`] footprint plus a resolved
//! [`RoofParams`] descriptor into a [`RoofGeometry`]. Shapes are built one
//! ring group (outer ring and its holes) at a time so a failure in one part
//! of a building only flattens that part.

pub mod dome;
pub mod flat;
pub mod hipped;
pub mod profile;
pub mod pyramidal;
pub mod skeleton;
pub mod skillion;

use std::collections::BTreeMap;

use serde::Deserialize;
use tracing::warn;

use crate::config::RoofConfig;
use crate::error::Result;
use crate::geometry::{Multipolygon, Point2D};
use crate::mesh::MeshBuffers;
use crate::mesh::validation::validate_roof_geometry;

pub use hipped::{FacetStyle, MANSARD, QUADRUPLE_SALTBOX, SplitCoefficients};
pub use skeleton::{ConvexSkeleton, Skeleton, SkeletonFacet, SkeletonOracle, SkeletonVertex};

/// Texture ids written into the per-vertex texture buffer
pub mod textures {
    pub const DEFAULT: u8 = 0;
    pub const ROOF_TILES: u8 = 1;
    pub const METAL: u8 = 2;
    pub const CONCRETE: u8 = 3;
    /// Variants picked for mid-sized flat roofs
    pub const FLAT_VARIANTS: [u8; 4] = [10, 11, 12, 13];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoofType {
    #[default]
    Flat,
    Pyramidal,
    Hipped,
    Gabled,
    Mansard,
    QuadrupleSaltbox,
    Skillion,
    Dome,
    Onion,
    #[serde(alias = "gambrel")]
    OrientedGambrel,
    #[serde(alias = "saltbox")]
    OrientedSaltbox,
}

/// Whether an oriented roof's ridge follows the long or the short side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoofOrientation {
    #[default]
    Along,
    Across,
}

/// Fully resolved roof descriptor
#[derive(Debug, Clone, PartialEq)]
pub struct RoofParams {
    pub roof_type: RoofType,
    /// Eave elevation (top of the walls)
    pub min_height: f64,
    /// Vertical extent of the roof above the eaves
    pub height: f64,
    /// Slope direction in degrees, counter-clockwise from +x
    pub direction: Option<f64>,
    pub orientation: RoofOrientation,
    /// Stable feature id, seeds texture variation
    pub feature_id: u64,
    pub texture_id: u8,
    /// Emit downward-facing geometry
    pub flip: bool,
}

impl RoofParams {
    pub fn new(roof_type: RoofType, min_height: f64, height: f64) -> Self {
        Self {
            roof_type,
            min_height,
            height,
            direction: None,
            orientation: RoofOrientation::Along,
            feature_id: 0,
            texture_id: textures::DEFAULT,
            flip: false,
        }
    }

    pub fn top(&self) -> f64 {
        self.min_height + self.height
    }
}

/// One point of a roof's eave line
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkirtPoint {
    pub point: Point2D,
    pub height: f64,
}

/// Eave lines keyed by ring index in the footprint
pub type Skirt = BTreeMap<usize, Vec<SkirtPoint>>;

/// Roof mesh plus the eave lines used to close the gap to the walls
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoofGeometry {
    pub mesh: MeshBuffers,
    pub skirt: Skirt,
    pub can_extend_outside_footprint: bool,
}

impl RoofGeometry {
    pub fn append(&mut self, other: RoofGeometry) {
        self.mesh.append(other.mesh);
        self.skirt.extend(other.skirt);
        self.can_extend_outside_footprint |= other.can_extend_outside_footprint;
    }
}

/// Eave line for every ring of one group, with heights from `height`
pub(crate) fn group_skirt(
    footprint: &Multipolygon,
    group: usize,
    height: impl Fn(Point2D) -> f64,
) -> Skirt {
    let group = &footprint.groups()[group];
    std::iter::once(group.outer)
        .chain(group.inner.iter().copied())
        .map(|index| {
            let points = footprint
                .ring(index)
                .points()
                .iter()
                .map(|&point| SkirtPoint {
                    point,
                    height: height(point),
                })
                .collect();
            (index, points)
        })
        .collect()
}

/// Front door for roof construction.
///
/// Dispatches on the roof type, falls back to a flat roof for any ring group
/// the chosen shape cannot handle, and replaces the whole roof with a flat
/// one if the result leaves the footprint.
pub struct RoofBuilder<'a> {
    oracle: &'a dyn SkeletonOracle,
    config: RoofConfig,
}

impl<'a> RoofBuilder<'a> {
    pub fn new(oracle: &'a dyn SkeletonOracle, config: RoofConfig) -> Self {
        Self { oracle, config }
    }

    pub fn config(&self) -> &RoofConfig {
        &self.config
    }

    pub fn build(&self, footprint: &Multipolygon, params: &RoofParams) -> RoofGeometry {
        let mut geometry = RoofGeometry::default();

        for group in 0..footprint.groups().len() {
            let part = match self.build_group(footprint, group, params) {
                Ok(part) => part,
                Err(e) => {
                    warn!(
                        feature = params.feature_id,
                        roof = ?params.roof_type,
                        error = %e,
                        "roof shape failed, using a flat roof for this ring"
                    );
                    flat::build_group(footprint, group, params, params.min_height, &self.config)
                }
            };
            geometry.append(part);
        }

        if !geometry.can_extend_outside_footprint
            && let Err(e) =
                validate_roof_geometry(&geometry, footprint, self.config.validation_padding)
        {
            warn!(
                feature = params.feature_id,
                roof = ?params.roof_type,
                error = %e,
                "discarding roof geometry, using a flat roof"
            );
            return flat::build(footprint, params, params.min_height, &self.config);
        }

        geometry
    }

    fn build_group(
        &self,
        footprint: &Multipolygon,
        group: usize,
        params: &RoofParams,
    ) -> Result<RoofGeometry> {
        let config = &self.config;
        match params.roof_type {
            RoofType::Flat => Ok(flat::build_group(
                footprint,
                group,
                params,
                params.top(),
                config,
            )),
            RoofType::Pyramidal => pyramidal::build_group(footprint, group, params),
            RoofType::Skillion => skillion::build_group(footprint, group, params),
            RoofType::Hipped => {
                hipped::build_group(footprint, group, params, self.oracle, FacetStyle::Hipped)
            }
            RoofType::Gabled => {
                hipped::build_group(footprint, group, params, self.oracle, FacetStyle::Gabled)
            }
            RoofType::Mansard => hipped::build_group(
                footprint,
                group,
                params,
                self.oracle,
                FacetStyle::Split(MANSARD),
            ),
            RoofType::QuadrupleSaltbox => hipped::build_group(
                footprint,
                group,
                params,
                self.oracle,
                FacetStyle::Split(QUADRUPLE_SALTBOX),
            ),
            RoofType::Dome => dome::build_group(footprint, group, params, dome::DOME, config),
            RoofType::Onion => dome::build_group(footprint, group, params, dome::ONION, config),
            RoofType::OrientedGambrel => {
                profile::build_group(footprint, group, params, profile::GAMBREL)
            }
            RoofType::OrientedSaltbox => {
                profile::build_group(footprint, group, params, profile::SALTBOX)
            }
        }
    }
}
