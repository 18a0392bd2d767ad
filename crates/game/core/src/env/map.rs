use std::collections::BTreeMap;

use crate::state::{EventId, Position};

/// Static map oracle exposing immutable layout information.
pub trait MapOracle: Send + Sync {
    fn dimensions(&self) -> MapDimensions;
    fn tile(&self, position: Position) -> Option<StaticTile>;

    fn contains(&self, position: Position) -> bool {
        self.dimensions().contains(position)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MapDimensions {
    pub width: u32,
    pub height: u32,
}

impl MapDimensions {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn contains(&self, position: Position) -> bool {
        position.x >= 0
            && position.y >= 0
            && (position.x as u32) < self.width
            && (position.y as u32) < self.height
    }

    pub fn area(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// Immutable descriptor for a tile in the static layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StaticTile {
    terrain: TerrainKind,
    trigger: Option<EventId>,
}

impl StaticTile {
    pub const fn new(terrain: TerrainKind) -> Self {
        Self {
            terrain,
            trigger: None,
        }
    }

    /// Attaches a world event fired whenever a unit ends a move on this tile.
    pub const fn with_trigger(mut self, event: EventId) -> Self {
        self.trigger = Some(event);
        self
    }

    pub fn terrain(self) -> TerrainKind {
        self.terrain
    }

    pub fn trigger(self) -> Option<EventId> {
        self.trigger
    }

    pub fn is_passable(self) -> bool {
        self.terrain.is_passable()
    }
}

/// Canonical terrain classes for static map tiles.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TerrainKind {
    Floor,
    Wall,
    Water,
    Custom(u16),
}

impl TerrainKind {
    pub fn is_passable(self) -> bool {
        matches!(self, TerrainKind::Floor)
    }

    fn from_glyph(glyph: char) -> Option<Self> {
        match glyph {
            '.' => Some(Self::Floor),
            '#' => Some(Self::Wall),
            '~' => Some(Self::Water),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum MapError {
    #[error("map has no rows")]
    Empty,

    #[error("row {row} has width {found}, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("unknown terrain glyph {glyph:?} at {position}")]
    UnknownGlyph { glyph: char, position: Position },

    #[error("trigger at {position} lies outside the map")]
    TriggerOutOfBounds { position: Position },
}

impl crate::error::GameError for MapError {
    fn severity(&self) -> crate::error::ErrorSeverity {
        crate::error::ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Empty => "MAP_EMPTY",
            Self::RaggedRow { .. } => "MAP_RAGGED_ROW",
            Self::UnknownGlyph { .. } => "MAP_UNKNOWN_GLYPH",
            Self::TriggerOutOfBounds { .. } => "MAP_TRIGGER_OUT_OF_BOUNDS",
        }
    }
}

/// Row-major in-memory map.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StaticMap {
    dimensions: MapDimensions,
    tiles: Vec<StaticTile>,
}

impl StaticMap {
    /// Builds a map from glyph rows: `.` floor, `#` wall, `~` water.
    /// Row 0 is `y = 0`.
    pub fn from_rows<S: AsRef<str>>(rows: &[S]) -> Result<Self, MapError> {
        let width = rows.first().ok_or(MapError::Empty)?.as_ref().chars().count();
        if width == 0 {
            return Err(MapError::Empty);
        }

        let mut tiles = Vec::with_capacity(width * rows.len());
        for (y, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            let found = row.chars().count();
            if found != width {
                return Err(MapError::RaggedRow {
                    row: y,
                    expected: width,
                    found,
                });
            }
            for (x, glyph) in row.chars().enumerate() {
                let terrain = TerrainKind::from_glyph(glyph).ok_or(MapError::UnknownGlyph {
                    glyph,
                    position: Position::new(x as i32, y as i32),
                })?;
                tiles.push(StaticTile::new(terrain));
            }
        }

        Ok(Self {
            dimensions: MapDimensions::new(width as u32, rows.len() as u32),
            tiles,
        })
    }

    /// Attaches trigger events to tiles.
    pub fn with_triggers(
        mut self,
        triggers: &BTreeMap<Position, EventId>,
    ) -> Result<Self, MapError> {
        for (&position, &event) in triggers {
            let index = self
                .index(position)
                .ok_or(MapError::TriggerOutOfBounds { position })?;
            self.tiles[index] = self.tiles[index].with_trigger(event);
        }
        Ok(self)
    }

    fn index(&self, position: Position) -> Option<usize> {
        if !self.dimensions.contains(position) {
            return None;
        }
        Some(position.y as usize * self.dimensions.width as usize + position.x as usize)
    }
}

impl MapOracle for StaticMap {
    fn dimensions(&self) -> MapDimensions {
        self.dimensions
    }

    fn tile(&self, position: Position) -> Option<StaticTile> {
        self.index(position).map(|index| self.tiles[index])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_glyph_rows() {
        let map = StaticMap::from_rows(&["..#", ".~."]).unwrap();

        assert_eq!(map.dimensions(), MapDimensions::new(3, 2));
        assert!(map.tile(Position::new(0, 0)).unwrap().is_passable());
        assert_eq!(
            map.tile(Position::new(2, 0)).unwrap().terrain(),
            TerrainKind::Wall
        );
        assert!(!map.tile(Position::new(1, 1)).unwrap().is_passable());
        assert!(map.tile(Position::new(3, 0)).is_none());
        assert!(map.tile(Position::new(0, -1)).is_none());
    }

    #[test]
    fn rejects_ragged_rows() {
        let err = StaticMap::from_rows(&["...", ".."]).unwrap_err();
        assert_eq!(
            err,
            MapError::RaggedRow {
                row: 1,
                expected: 3,
                found: 2
            }
        );
    }

    #[test]
    fn rejects_unknown_glyphs() {
        let err = StaticMap::from_rows(&[".x"]).unwrap_err();
        assert!(matches!(err, MapError::UnknownGlyph { glyph: 'x', .. }));
    }

    #[test]
    fn triggers_attach_to_tiles() {
        let mut triggers = BTreeMap::new();
        triggers.insert(Position::new(1, 1), EventId(7));

        let map = StaticMap::from_rows(&["...", "..."])
            .unwrap()
            .with_triggers(&triggers)
            .unwrap();

        assert_eq!(map.tile(Position::new(1, 1)).unwrap().trigger(), Some(EventId(7)));
        assert_eq!(map.tile(Position::new(0, 0)).unwrap().trigger(), None);

        triggers.insert(Position::new(9, 9), EventId(8));
        let err = map.with_triggers(&triggers).unwrap_err();
        assert_eq!(
            err,
            MapError::TriggerOutOfBounds {
                position: Position::new(9, 9)
            }
        );
    }
}
