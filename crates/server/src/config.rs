//! Server binary configuration.
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Directory holding `config.toml`, `units.ron`, `maps/` and `scenarios/`.
    pub content_dir: PathBuf,
    pub scenario: String,
    pub max_turns: u32,
    /// In-process replay clients checked against the server at the end.
    pub replay_clients: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            content_dir: PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/data")),
            scenario: "skirmish".into(),
            max_turns: 200,
            replay_clients: 2,
        }
    }
}

impl ServerConfig {
    /// Defaults overridden by `CONTENT_DIR`, `SCENARIO`, `MAX_TURNS` and
    /// `REPLAY_CLIENTS`. Unparsable numbers keep their defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(dir) = env::var("CONTENT_DIR") {
            config.content_dir = PathBuf::from(dir);
        }
        if let Ok(scenario) = env::var("SCENARIO") {
            config.scenario = scenario;
        }
        if let Some(turns) = read_env::<u32>("MAX_TURNS") {
            config.max_turns = turns.max(1);
        }
        if let Some(clients) = read_env::<usize>("REPLAY_CLIENTS") {
            config.replay_clients = clients;
        }

        config
    }
}

fn read_env<T: FromStr>(key: &str) -> Option<T> {
    env::var(key).ok()?.trim().parse().ok()
}
