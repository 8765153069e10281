use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::info;

use crate::domain::{BuildingFeature, PowerlineFeature, PowerlineNodeFeature, RoadFeature};

/// One tile of pre-classified features in tile-local meters
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TileInput {
    pub buildings: Vec<BuildingFeature>,
    pub roads: Vec<RoadFeature>,
    pub powerlines: Vec<PowerlineFeature>,
    pub powerline_nodes: Vec<PowerlineNodeFeature>,
}

impl TileInput {
    pub fn is_empty(&self) -> bool {
        self.buildings.is_empty() && self.roads.is_empty() && self.powerlines.is_empty()
    }
}

/// Read and parse a tile file
pub fn load_tile(path: &Path) -> Result<TileInput> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read tile file: {}", path.display()))?;
    let tile = parse_tile(&contents)
        .with_context(|| format!("Failed to parse tile file: {}", path.display()))?;
    info!(
        buildings = tile.buildings.len(),
        roads = tile.roads.len(),
        powerlines = tile.powerlines.len(),
        nodes = tile.powerline_nodes.len(),
        "loaded tile"
    );
    Ok(tile)
}

pub fn parse_tile(json: &str) -> Result<TileInput> {
    Ok(serde_json::from_str(json)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::powerlines::PowerlineNodeType;
    use crate::roof::RoofType;
    use std::io::Write;

    const TILE: &str = r#"{
        "buildings": [
            {"id": 1, "outer": [[[0,0],[10,0],[10,10],[0,10]]], "roof": {"type": "gambrel"}}
        ],
        "roads": [{"points": [[0,0],[50,0]], "width": 5}],
        "powerlines": [{"points": [[0,20],[40,20]]}],
        "powerline_nodes": [{"position": [0,20], "type": "tower"}]
    }"#;

    #[test]
    fn test_parse_tile() {
        let tile = parse_tile(TILE).unwrap();
        assert_eq!(tile.buildings.len(), 1);
        assert_eq!(tile.buildings[0].roof.roof_type, RoofType::OrientedGambrel);
        assert_eq!(tile.roads[0].width, Some(5.0));
        assert_eq!(tile.powerline_nodes[0].node_type, PowerlineNodeType::Tower);
        assert!(!tile.is_empty());
    }

    #[test]
    fn test_missing_sections_default_to_empty() {
        let tile = parse_tile("{}").unwrap();
        assert!(tile.is_empty());
        assert!(parse_tile("{\"roads\": 3}").is_err());
    }

    #[test]
    fn test_load_tile_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(TILE.as_bytes()).unwrap();
        let tile = load_tile(file.path()).unwrap();
        assert_eq!(tile.roads.len(), 1);

        let err = load_tile(Path::new("/nonexistent/tile.json")).unwrap_err();
        assert!(err.to_string().contains("Failed to read tile file"));
    }
}
