use std::net::SocketAddr;
use std::path::Path;

use crate::ai::MAX_SEARCH_DEPTH;
use crate::error::ConfigError;
use crate::game::Player;

/// Top-level application configuration, loadable from TOML.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub search: SearchConfig,
    pub game: GameConfig,
    pub relay: RelayConfig,
}

/// The engine's single tunable: difficulty, capped to a search depth.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub difficulty: u32,
    pub max_depth: u32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            difficulty: 5,
            max_depth: MAX_SEARCH_DEPTH,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub first_player: Player,
    pub computer_side: Player,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            first_player: Player::Red,
            computer_side: Player::Yellow,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Address the relay server listens on
    pub bind: String,
    /// Address clients connect to
    pub connect: String,
}

impl Default for RelayConfig {
    fn default() -> Self {
        RelayConfig {
            bind: "127.0.0.1:7878".to_string(),
            connect: "127.0.0.1:7878".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: AppConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the file
    /// does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            log::warn!("config file '{}' not found, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=10).contains(&self.search.difficulty) {
            return Err(ConfigError::Validation(
                "search.difficulty must be in 1..=10".into(),
            ));
        }
        if !(1..=MAX_SEARCH_DEPTH).contains(&self.search.max_depth) {
            return Err(ConfigError::Validation(format!(
                "search.max_depth must be in 1..={MAX_SEARCH_DEPTH}"
            )));
        }
        if self.relay.bind.parse::<SocketAddr>().is_err() {
            return Err(ConfigError::Validation(format!(
                "relay.bind is not a socket address: {}",
                self.relay.bind
            )));
        }
        if self.relay.connect.trim().is_empty() {
            return Err(ConfigError::Validation(
                "relay.connect must not be empty".into(),
            ));
        }
        Ok(())
    }

    /// Generate a TOML string with all default values (useful for creating
    /// example config files).
    pub fn default_toml() -> String {
        toml::to_string_pretty(&AppConfig::default()).expect("default config serializes")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        config.validate().expect("default config should be valid");
        assert_eq!(config.search.difficulty, 5);
        assert_eq!(config.search.max_depth, 6);
        assert_eq!(config.game.computer_side, Player::Yellow);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let toml_str = r#"
[search]
difficulty = 8
"#;
        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.search.difficulty, 8);
        assert_eq!(config.search.max_depth, 6);
        assert_eq!(config.relay.bind, "127.0.0.1:7878");
    }

    #[test]
    fn test_sides_parse_lowercase() {
        let toml_str = r#"
[game]
computer_side = "red"
first_player = "yellow"
"#;
        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.game.computer_side, Player::Red);
        assert_eq!(config.game.first_player, Player::Yellow);
    }

    #[test]
    fn test_empty_toml_uses_all_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        let default = AppConfig::default();
        assert_eq!(config.search, default.search);
        assert_eq!(config.game, default.game);
        assert_eq!(config.relay, default.relay);
    }

    #[test]
    fn test_validation_rejects_difficulty_out_of_range() {
        let mut config = AppConfig::default();
        config.search.difficulty = 0;
        assert!(config.validate().is_err());
        config.search.difficulty = 11;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_zero_max_depth() {
        let mut config = AppConfig::default();
        config.search.max_depth = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_max_depth_above_cap() {
        let mut config = AppConfig::default();
        config.search.difficulty = 10;
        config.search.max_depth = MAX_SEARCH_DEPTH + 4;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
        config.search.max_depth = MAX_SEARCH_DEPTH;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_bad_bind_address() {
        let mut config = AppConfig::default();
        config.relay.bind = "not an address".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = AppConfig::load_or_default(Path::new("nonexistent_config.toml")).unwrap();
        assert_eq!(config.search.difficulty, 5);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test_config.toml");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(
            f,
            r#"
[relay]
connect = "10.0.0.2:9000"
"#
        )
        .unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.relay.connect, "10.0.0.2:9000");
        assert_eq!(config.search.difficulty, 5);
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[search]\ndifficulty = 42\n").unwrap();
        assert!(matches!(
            AppConfig::load(&path),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_default_toml_roundtrips() {
        let toml_str = AppConfig::default_toml();
        let config: AppConfig = toml::from_str(&toml_str).unwrap();
        config.validate().expect("roundtripped config should be valid");
    }
}
