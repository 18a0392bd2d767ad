//! Unit type catalog loader.

use std::path::Path;

use game_core::{StaticTypeRegistry, UnitType};

use crate::loaders::{LoadResult, read_file};

/// Loader for the unit type catalog from RON files.
///
/// RON format: `Vec<UnitType>`. `attack_range` defaults to melee and
/// `traits` to none when omitted.
pub struct UnitLoader;

impl UnitLoader {
    pub fn load(path: &Path) -> LoadResult<StaticTypeRegistry> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    /// Parses a catalog, rejecting duplicate type ids.
    pub fn parse(content: &str) -> LoadResult<StaticTypeRegistry> {
        let definitions: Vec<UnitType> = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse unit catalog RON: {}", e))?;

        let mut registry = StaticTypeRegistry::default();
        for definition in definitions {
            if definition.max_health == 0 {
                anyhow::bail!("Unit type '{}' has zero max_health", definition.name);
            }
            let id = definition.id;
            if registry.insert(definition).is_some() {
                anyhow::bail!("Duplicate unit type id {:?}", id);
            }
        }
        Ok(registry)
    }
}
