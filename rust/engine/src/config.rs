use serde::{Deserialize, Serialize};
use std::fs;
use thiserror::Error;

use crate::player::STARTING_BALANCE;
use crate::rules::{TableRules, DEFAULT_MAX_HANDS};
use crate::shoe::DEFAULT_DECKS;

/// Table settings resolved from defaults, an optional TOML file and the
/// environment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TableConfig {
    pub starting_balance: u32,
    pub num_decks: usize,
    pub max_hands: usize,
    pub double_after_split: bool,
    pub seed: Option<u64>,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            starting_balance: STARTING_BALANCE,
            num_decks: DEFAULT_DECKS,
            max_hands: DEFAULT_MAX_HANDS,
            double_after_split: true,
            seed: None,
        }
    }
}

impl TableConfig {
    pub fn rules(&self) -> TableRules {
        TableRules {
            num_decks: self.num_decks,
            max_hands: self.max_hands,
            double_after_split: self.double_after_split,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueSource {
    Default,
    File,
    Env,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigSources {
    pub starting_balance: ValueSource,
    pub num_decks: ValueSource,
    pub max_hands: ValueSource,
    pub double_after_split: ValueSource,
    pub seed: ValueSource,
}

impl Default for ConfigSources {
    fn default() -> Self {
        Self {
            starting_balance: ValueSource::Default,
            num_decks: ValueSource::Default,
            max_hands: ValueSource::Default,
            double_after_split: ValueSource::Default,
            seed: ValueSource::Default,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConfigResolved {
    pub config: TableConfig,
    pub sources: ConfigSources,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error reading config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub const CONFIG_ENV: &str = "BLACKJACK_CONFIG";
pub const SEED_ENV: &str = "BLACKJACK_SEED";
pub const DECKS_ENV: &str = "BLACKJACK_DECKS";
pub const STARTING_BALANCE_ENV: &str = "BLACKJACK_STARTING_BALANCE";
pub const MAX_HANDS_ENV: &str = "BLACKJACK_MAX_HANDS";
pub const DOUBLE_AFTER_SPLIT_ENV: &str = "BLACKJACK_DOUBLE_AFTER_SPLIT";

pub fn load() -> Result<TableConfig, ConfigError> {
    load_with_sources().map(|resolved| resolved.config)
}

/// Defaults, then the TOML file named by `BLACKJACK_CONFIG`, then
/// `BLACKJACK_*` environment overrides.
pub fn load_with_sources() -> Result<ConfigResolved, ConfigError> {
    let mut cfg = TableConfig::default();
    let mut sources = ConfigSources::default();

    if let Ok(path) = std::env::var(CONFIG_ENV) {
        let s = fs::read_to_string(path)?;
        let f: FileConfig = toml::from_str(&s)?;
        if let Some(v) = f.starting_balance {
            cfg.starting_balance = v;
            sources.starting_balance = ValueSource::File;
        }
        if let Some(v) = f.num_decks {
            cfg.num_decks = v;
            sources.num_decks = ValueSource::File;
        }
        if let Some(v) = f.max_hands {
            cfg.max_hands = v;
            sources.max_hands = ValueSource::File;
        }
        if let Some(v) = f.double_after_split {
            cfg.double_after_split = v;
            sources.double_after_split = ValueSource::File;
        }
        if let Some(v) = f.seed {
            cfg.seed = Some(v);
            sources.seed = ValueSource::File;
        }
    }

    if let Some(seed) = env_value(SEED_ENV) {
        cfg.seed = Some(
            seed.parse()
                .map_err(|_| ConfigError::Invalid("Invalid seed".into()))?,
        );
        sources.seed = ValueSource::Env;
    }
    if let Some(decks) = env_value(DECKS_ENV) {
        cfg.num_decks = decks
            .parse()
            .map_err(|_| ConfigError::Invalid("Invalid deck count".into()))?;
        sources.num_decks = ValueSource::Env;
    }
    if let Some(balance) = env_value(STARTING_BALANCE_ENV) {
        cfg.starting_balance = balance
            .parse()
            .map_err(|_| ConfigError::Invalid("Invalid starting balance".into()))?;
        sources.starting_balance = ValueSource::Env;
    }
    if let Some(max) = env_value(MAX_HANDS_ENV) {
        cfg.max_hands = max
            .parse()
            .map_err(|_| ConfigError::Invalid("Invalid max hands".into()))?;
        sources.max_hands = ValueSource::Env;
    }
    if let Some(das) = env_value(DOUBLE_AFTER_SPLIT_ENV) {
        cfg.double_after_split = parse_bool(&das)
            .ok_or_else(|| ConfigError::Invalid("Invalid double_after_split".into()))?;
        sources.double_after_split = ValueSource::Env;
    }

    validate(&cfg)?;
    Ok(ConfigResolved {
        config: cfg,
        sources,
    })
}

fn env_value(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

#[derive(Debug, Deserialize)]
struct FileConfig {
    #[serde(default)]
    starting_balance: Option<u32>,
    #[serde(default)]
    num_decks: Option<usize>,
    #[serde(default)]
    max_hands: Option<usize>,
    #[serde(default)]
    double_after_split: Option<bool>,
    #[serde(default)]
    seed: Option<u64>,
}

pub fn validate(cfg: &TableConfig) -> Result<(), ConfigError> {
    if cfg.num_decks == 0 {
        return Err(ConfigError::Invalid("num_decks must be >=1".into()));
    }
    if cfg.starting_balance == 0 {
        return Err(ConfigError::Invalid("starting_balance must be >0".into()));
    }
    if cfg.max_hands == 0 {
        return Err(ConfigError::Invalid("max_hands must be >=1".into()));
    }
    Ok(())
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_house_rules() {
        let cfg = TableConfig::default();
        assert_eq!(cfg.starting_balance, 5_000);
        assert_eq!(cfg.rules(), TableRules::default());
        assert!(validate(&cfg).is_ok());
    }

    #[test]
    fn zero_decks_is_rejected() {
        let cfg = TableConfig {
            num_decks: 0,
            ..TableConfig::default()
        };
        assert!(matches!(validate(&cfg), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn parse_bool_accepts_common_spellings() {
        assert_eq!(parse_bool("YES"), Some(true));
        assert_eq!(parse_bool("off"), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }
}
