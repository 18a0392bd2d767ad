//! Game configuration loader.

use std::path::Path;

use game_core::GameConfig;

use crate::loaders::{LoadResult, read_file};

/// Loader for game configuration from TOML files.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load config data from a TOML file.
    ///
    /// Missing keys fall back to [`GameConfig::default`].
    pub fn load(path: &Path) -> LoadResult<GameConfig> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<GameConfig> {
        toml::from_str(content).map_err(|e| anyhow::anyhow!("Failed to parse config TOML: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use game_core::HostileMovePolicy;

    use super::*;

    #[test]
    fn partial_config_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "max_actions_per_tick = 4").unwrap();
        writeln!(file, "hostile_move = \"reject\"").unwrap();

        let config = ConfigLoader::load(file.path()).unwrap();
        assert_eq!(config.max_actions_per_tick, 4);
        assert_eq!(config.hostile_move, HostileMovePolicy::Reject);
        assert_eq!(
            config.default_max_actions_per_turn,
            GameConfig::DEFAULT_MAX_ACTIONS_PER_TURN
        );
    }

    #[test]
    fn empty_file_is_the_default_config() {
        assert_eq!(ConfigLoader::parse("").unwrap(), GameConfig::default());
    }

    #[test]
    fn unknown_policy_is_an_error() {
        assert!(ConfigLoader::parse("hostile_move = \"swap\"").is_err());
    }

    #[test]
    fn missing_file_names_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let err = ConfigLoader::load(&path).unwrap_err();
        assert!(err.to_string().contains("config.toml"));
    }
}
