//! Map data loader.
//!
//! Loads terrain rows and tile triggers from map RON files.
//! Unit placement is handled separately via scenario files.

use std::collections::BTreeMap;
use std::path::Path;

use game_core::{EventId, Position, StaticMap};
use serde::Deserialize;

use crate::loaders::{LoadResult, read_file};

/// Map data structure for RON files.
///
/// ```ron
/// (
///     rows: ["....", ".#..", "...~"],
///     triggers: [((x: 3, y: 0), 100)],
/// )
/// ```
#[derive(Debug, Clone, Deserialize)]
struct MapDataRon {
    rows: Vec<String>,
    #[serde(default)]
    triggers: Vec<(Position, EventId)>,
}

/// Loader for map data from RON files.
pub struct MapLoader;

impl MapLoader {
    pub fn load(path: &Path) -> LoadResult<StaticMap> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<StaticMap> {
        let data: MapDataRon = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse map RON: {}", e))?;

        let mut triggers = BTreeMap::new();
        for (position, event) in data.triggers {
            if triggers.insert(position, event).is_some() {
                anyhow::bail!("Tile {} has more than one trigger", position);
            }
        }

        let map = StaticMap::from_rows(&data.rows)
            .and_then(|map| map.with_triggers(&triggers))
            .map_err(|e| anyhow::anyhow!("Invalid map layout: {}", e))?;
        Ok(map)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use game_core::{MapDimensions, MapOracle, TerrainKind};

    use super::*;

    #[test]
    fn loads_rows_and_triggers() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"(
                rows: ["....", ".#..", "...~"],
                triggers: [((x: 3, y: 0), 100)],
            )"#
        )
        .unwrap();

        let map = MapLoader::load(file.path()).unwrap();
        assert_eq!(map.dimensions(), MapDimensions::new(4, 3));
        assert_eq!(
            map.tile(Position::new(1, 1)).unwrap().terrain(),
            TerrainKind::Wall
        );
        assert_eq!(
            map.tile(Position::new(3, 2)).unwrap().terrain(),
            TerrainKind::Water
        );
        assert_eq!(
            map.tile(Position::new(3, 0)).unwrap().trigger(),
            Some(EventId(100))
        );
    }

    #[test]
    fn triggers_are_optional() {
        let map = MapLoader::parse(r#"(rows: ["..", ".."])"#).unwrap();
        assert!(map.tile(Position::new(0, 0)).unwrap().trigger().is_none());
    }

    #[test]
    fn layout_errors_surface() {
        assert!(MapLoader::parse(r#"(rows: ["...", ".."])"#).is_err());
        assert!(MapLoader::parse(r#"(rows: ["..", ".."], triggers: [((x: 5, y: 0), 1)])"#).is_err());
    }

    #[test]
    fn duplicate_triggers_are_rejected() {
        let content = r#"(rows: [".."], triggers: [((x: 0, y: 0), 1), ((x: 0, y: 0), 2)])"#;
        let err = MapLoader::parse(content).unwrap_err();
        assert!(err.to_string().contains("more than one trigger"));
    }
}
