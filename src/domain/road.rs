use serde::Deserialize;

use super::{RawPoints, to_points};
use crate::geometry::Point2D;

/// A road centerline; a closed loop repeats its first point at the end
#[derive(Debug, Clone, Deserialize)]
pub struct RoadFeature {
    pub points: RawPoints,
    #[serde(default)]
    pub width: Option<f64>,
}

impl RoadFeature {
    pub fn points(&self) -> Vec<Point2D> {
        to_points(&self.points)
    }

    pub fn width_or(&self, default: f64) -> f64 {
        self.width.filter(|w| *w > 0.0).unwrap_or(default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_width_fallback() {
        let road: RoadFeature = serde_json::from_str(r#"{"points": [[0,0],[5,0]]}"#).unwrap();
        assert_eq!(road.width_or(6.0), 6.0);
        let road: RoadFeature =
            serde_json::from_str(r#"{"points": [[0,0],[5,0]], "width": 0}"#).unwrap();
        assert_eq!(road.width_or(6.0), 6.0);
        let road: RoadFeature =
            serde_json::from_str(r#"{"points": [[0,0],[5,0]], "width": 3.5}"#).unwrap();
        assert_eq!(road.width_or(6.0), 3.5);
        assert_eq!(road.points().len(), 2);
    }
}
