//! Configuration - environment variable parsing

use std::env;
use std::path::PathBuf;

use crate::entities::Difficulty;

/// Host configuration loaded from environment variables
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Where log lines go; the terminal itself is the game screen
    pub log_file: PathBuf,
    /// Fixed RNG seed for reproducible rounds
    pub seed: Option<u64>,
    /// Difficulty preselected in the menu
    pub difficulty: Option<Difficulty>,
    /// Unrecognised difficulty name that was replaced by the default tier
    pub rejected_difficulty: Option<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from any key/value source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let seed = match lookup("SPACE_INVADER_SEED") {
            Some(raw) => Some(raw.trim().parse().map_err(|_| ConfigError::Invalid {
                name: "SPACE_INVADER_SEED",
                value: raw.clone(),
            })?),
            None => None,
        };

        // An unknown tier is not fatal: the menu opens on the default one.
        let raw_difficulty = lookup("SPACE_INVADER_DIFFICULTY");
        let rejected_difficulty = raw_difficulty
            .as_ref()
            .filter(|raw| raw.parse::<Difficulty>().is_err())
            .cloned();
        let difficulty = raw_difficulty.as_deref().map(Difficulty::from_name);

        Ok(Self {
            log_level: lookup("SPACE_INVADER_LOG").unwrap_or_else(|| "info".to_string()),
            log_file: lookup("SPACE_INVADER_LOG_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("space_invader.log")),
            seed,
            difficulty,
            rejected_difficulty,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_file: PathBuf::from("space_invader.log"),
            seed: None,
            difficulty: None,
            rejected_difficulty: None,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },

    #[error("Unknown difficulty: {0:?}")]
    UnknownDifficulty(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = load(&[]).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn reads_every_key() {
        let config = load(&[
            ("SPACE_INVADER_LOG", "debug"),
            ("SPACE_INVADER_LOG_FILE", "/tmp/si.log"),
            ("SPACE_INVADER_SEED", " 42 "),
            ("SPACE_INVADER_DIFFICULTY", "goddamn"),
        ])
        .unwrap();
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.log_file, PathBuf::from("/tmp/si.log"));
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.difficulty, Some(Difficulty::Goddamn));
        assert_eq!(config.rejected_difficulty, None);
    }

    #[test]
    fn rejects_bad_seed() {
        let err = load(&[("SPACE_INVADER_SEED", "lots")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "SPACE_INVADER_SEED", .. }));
    }

    #[test]
    fn unknown_difficulty_falls_back_to_easy() {
        let config = load(&[("SPACE_INVADER_DIFFICULTY", "Nightmare")]).unwrap();
        assert_eq!(config.difficulty, Some(Difficulty::Easy));
        assert_eq!(config.rejected_difficulty.as_deref(), Some("Nightmare"));
    }
}
