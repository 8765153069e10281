use serde::Deserialize;

use super::{RawPoints, to_points};
use crate::geometry::{Point2D, pt};
use crate::powerlines::PowerlineNodeType;

/// Wire route as a polyline
#[derive(Debug, Clone, Deserialize)]
pub struct PowerlineFeature {
    pub points: RawPoints,
}

impl PowerlineFeature {
    pub fn points(&self) -> Vec<Point2D> {
        to_points(&self.points)
    }
}

/// Support structure placed somewhere along a route
#[derive(Debug, Clone, Deserialize)]
pub struct PowerlineNodeFeature {
    pub position: [f64; 2],
    #[serde(rename = "type")]
    pub node_type: PowerlineNodeType,
}

impl PowerlineNodeFeature {
    pub fn position(&self) -> Point2D {
        pt(self.position[0], self.position[1])
    }
}
