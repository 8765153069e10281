//! Pre-classified feature descriptors as they arrive from upstream.

pub mod building;
pub mod powerline;
pub mod road;

pub use building::{BuildingFeature, RoofDescriptor};
pub use powerline::{PowerlineFeature, PowerlineNodeFeature};
pub use road::RoadFeature;

use crate::geometry::{Point2D, pt};

/// Raw `[x, y]` pairs in tile-local meters
pub type RawPoints = Vec<[f64; 2]>;

pub(crate) fn to_points(raw: &[[f64; 2]]) -> Vec<Point2D> {
    raw.iter().map(|&[x, y]| pt(x, y)).collect()
}
