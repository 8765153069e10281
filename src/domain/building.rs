use serde::Deserialize;

use super::{RawPoints, to_points};
use crate::config::BuildingConfig;
use crate::error::Result;
use crate::geometry::{Multipolygon, Ring, RingKind};
use crate::roof::{RoofOrientation, RoofParams, RoofType, textures};

/// Roof part of a building descriptor
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RoofDescriptor {
    #[serde(rename = "type")]
    pub roof_type: RoofType,
    /// Roof height above the eaves
    pub height: Option<f64>,
    /// Slope direction in degrees
    pub direction: Option<f64>,
    pub orientation: RoofOrientation,
    pub texture_id: Option<u8>,
}

/// A building area with its resolved descriptor
#[derive(Debug, Clone, Deserialize)]
pub struct BuildingFeature {
    #[serde(default)]
    pub id: u64,
    /// Outer rings; inner rings are matched to the outer ring containing them
    pub outer: Vec<RawPoints>,
    #[serde(default)]
    pub inner: Vec<RawPoints>,
    /// Total height to the top of the roof
    #[serde(default)]
    pub height: Option<f64>,
    /// Elevation of the building base
    #[serde(default)]
    pub min_height: f64,
    #[serde(default)]
    pub roof: RoofDescriptor,
}

impl BuildingFeature {
    pub fn footprint(&self) -> Result<Multipolygon> {
        let outer = self
            .outer
            .iter()
            .map(|r| Ring::new(to_points(r), RingKind::Outer));
        let inner = self
            .inner
            .iter()
            .map(|r| Ring::new(to_points(r), RingKind::Inner));
        let rings = outer.chain(inner).collect::<Result<Vec<_>>>()?;
        Multipolygon::new(rings)
    }

    /// Roof height, falling back to the configured default for sloped shapes
    pub fn roof_height(&self, config: &BuildingConfig) -> f64 {
        match (self.roof.height, self.roof.roof_type) {
            (Some(h), _) => h.max(0.0),
            (None, RoofType::Flat) => 0.0,
            (None, _) => config.default_roof_height,
        }
    }

    /// Top of the roof
    pub fn total_height(&self, config: &BuildingConfig) -> f64 {
        self.height
            .unwrap_or(self.min_height + config.default_height + self.roof_height(config))
    }

    /// Eave elevation, never below the building base
    pub fn wall_top(&self, config: &BuildingConfig) -> f64 {
        (self.total_height(config) - self.roof_height(config)).max(self.min_height)
    }

    pub fn roof_params(&self, config: &BuildingConfig) -> RoofParams {
        let min_height = self.wall_top(config);
        let height = (self.total_height(config) - min_height).max(0.0);
        let mut params = RoofParams::new(self.roof.roof_type, min_height, height);
        params.direction = self.roof.direction;
        params.orientation = self.roof.orientation;
        params.feature_id = self.id;
        params.texture_id = self.roof.texture_id.unwrap_or(match self.roof.roof_type {
            RoofType::Flat => textures::CONCRETE,
            _ => textures::ROOF_TILES,
        });
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn building(json: &str) -> BuildingFeature {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_defaults_for_sloped_roof() {
        let b = building(
            r#"{"id": 7, "outer": [[[0,0],[10,0],[10,10],[0,10]]], "roof": {"type": "gabled"}}"#,
        );
        let config = BuildingConfig::default();
        let params = b.roof_params(&config);
        assert_eq!(params.roof_type, RoofType::Gabled);
        assert_eq!(params.min_height, config.default_height);
        assert_eq!(params.height, config.default_roof_height);
        assert_eq!(params.feature_id, 7);
        assert_eq!(params.texture_id, textures::ROOF_TILES);
    }

    #[test]
    fn test_explicit_heights() {
        let b = building(
            r#"{"outer": [[[0,0],[10,0],[10,10],[0,10]]], "height": 12, "min_height": 2,
                "roof": {"type": "skillion", "height": 4, "direction": 90}}"#,
        );
        let config = BuildingConfig::default();
        assert_eq!(b.wall_top(&config), 8.0);
        let params = b.roof_params(&config);
        assert_eq!(params.top(), 12.0);
        assert_eq!(params.direction, Some(90.0));
    }

    #[test]
    fn test_roof_taller_than_building() {
        let b = building(
            r#"{"outer": [[[0,0],[10,0],[10,10],[0,10]]], "height": 3, "min_height": 2,
                "roof": {"type": "pyramidal", "height": 5}}"#,
        );
        let params = b.roof_params(&BuildingConfig::default());
        assert_eq!(params.min_height, 2.0);
        assert_eq!(params.height, 1.0);
    }

    #[test]
    fn test_footprint_with_hole() {
        let b = building(
            r#"{"outer": [[[0,0],[10,0],[10,10],[0,10]]],
                "inner": [[[3,3],[3,7],[7,7],[7,3]]]}"#,
        );
        let footprint = b.footprint().unwrap();
        assert_eq!(footprint.groups().len(), 1);
        assert_eq!(footprint.groups()[0].inner.len(), 1);
        assert!((footprint.area() - 84.0).abs() < 1e-9);
    }
}
