// Configuration loading and parsing (matchday.toml, credentials.toml).

use chrono::NaiveDate;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub season: SeasonConfig,
    pub feed: FeedConfig,
    pub credentials: CredentialsConfig,
    pub db_path: String,
    pub data: DataPaths,
}

impl Config {
    /// The configured database path, or `matchday.db` in the platform data
    /// directory when the path is left empty.
    pub fn resolved_db_path(&self) -> PathBuf {
        if !self.db_path.trim().is_empty() {
            return PathBuf::from(&self.db_path);
        }
        match directories::ProjectDirs::from("", "", "matchday") {
            Some(dirs) => dirs.data_dir().join("matchday.db"),
            None => PathBuf::from("matchday.db"),
        }
    }

    /// The football-data.org key, if one other than the template placeholder
    /// is configured.
    pub fn api_key(&self) -> Option<&str> {
        self.credentials
            .football_data_api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty() && *k != API_KEY_PLACEHOLDER)
    }
}

/// Value shipped in `credentials.toml.example`.
pub const API_KEY_PLACEHOLDER: &str = "YOUR_API_KEY_HERE";

// ---------------------------------------------------------------------------
// matchday.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the entire matchday.toml file.
#[derive(Debug, Clone, Deserialize)]
struct MatchdayFile {
    season: SeasonConfig,
    #[serde(default)]
    feed: FeedConfig,
    #[serde(default)]
    database: DatabaseSection,
    #[serde(default)]
    data: DataPaths,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct DatabaseSection {
    #[serde(default)]
    path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SeasonConfig {
    /// Display label, e.g. "2025-26".
    pub name: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    pub base_url: String,
    pub competition_id: u32,
    pub refresh_interval_secs: u64,
    pub auto_refresh: bool,
    pub lookahead_days: u32,
    /// Below this many fixtures in the lookahead window, the current
    /// matchday's fixtures are merged in as well.
    pub min_matches: usize,
    pub timeout_secs: u64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        FeedConfig {
            base_url: "https://api.football-data.org/v4".into(),
            competition_id: 2021,
            refresh_interval_secs: 30,
            auto_refresh: true,
            lookahead_days: 7,
            min_matches: 5,
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DataPaths {
    /// Optional CSV replacing the built-in club table.
    #[serde(default)]
    pub clubs: Option<String>,
}

// ---------------------------------------------------------------------------
// credentials.toml structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Default)]
pub struct CredentialsConfig {
    pub football_data_api_key: Option<String>,
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from `config/matchday.toml` and
/// (optionally) `config/credentials.toml`, relative to `base_dir`.
///
/// Does not copy defaults; `load_config()` does.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let config_dir = base_dir.join("config");

    // --- matchday.toml (required) ---
    let main_path = config_dir.join("matchday.toml");
    let main_text = read_file(&main_path)?;
    let file: MatchdayFile = toml::from_str(&main_text).map_err(|e| ConfigError::ParseError {
        path: main_path.clone(),
        source: e,
    })?;

    // --- credentials.toml (optional) ---
    let credentials_path = config_dir.join("credentials.toml");
    let credentials = if credentials_path.exists() {
        let cred_text = read_file(&credentials_path)?;
        toml::from_str(&cred_text).map_err(|e| ConfigError::ParseError {
            path: credentials_path.clone(),
            source: e,
        })?
    } else {
        CredentialsConfig::default()
    };

    let config = Config {
        season: file.season,
        feed: file.feed,
        credentials,
        db_path: file.database.path,
        data: file.data,
    };

    validate(&config)?;

    Ok(config)
}

/// Files seeded from `defaults/` into `config/`. Credentials are never
/// seeded; `defaults/credentials.toml.example` documents them.
const SEEDED_FILES: &[&str] = &["matchday.toml"];

/// Copy seeded files that are missing from `config/`. Existing files are
/// left alone. Returns the paths that were written.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");

    if !defaults_dir.is_dir() {
        if config_dir.is_dir() {
            return Ok(vec![]);
        }
        return Err(ConfigError::DefaultsCopyError {
            message: format!(
                "neither defaults/ nor config/ found in {}",
                base_dir.display()
            ),
        });
    }

    std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to create {}: {e}", config_dir.display()),
    })?;

    let mut copied = Vec::new();
    for name in SEEDED_FILES {
        let source = defaults_dir.join(name);
        let target = config_dir.join(name);
        if target.exists() || !source.is_file() {
            continue;
        }
        std::fs::copy(&source, &target).map_err(|e| ConfigError::DefaultsCopyError {
            message: format!("failed to copy {}: {e}", source.display()),
        })?;
        copied.push(target);
    }
    Ok(copied)
}

/// Loads config relative to the current working directory, copying defaults
/// first.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    ensure_config_files(&cwd)?;
    load_config_from(&cwd)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.season.name.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "season.name".into(),
            message: "must not be empty".into(),
        });
    }

    if config.season.end <= config.season.start {
        return Err(ConfigError::ValidationError {
            field: "season.end".into(),
            message: format!(
                "must be after season.start ({}), got {}",
                config.season.start, config.season.end
            ),
        });
    }

    let feed = &config.feed;
    if !(feed.base_url.starts_with("http://") || feed.base_url.starts_with("https://")) {
        return Err(ConfigError::ValidationError {
            field: "feed.base_url".into(),
            message: format!("must be an http(s) URL, got {:?}", feed.base_url),
        });
    }

    let positive: &[(&str, u64)] = &[
        ("feed.refresh_interval_secs", feed.refresh_interval_secs),
        ("feed.timeout_secs", feed.timeout_secs),
        ("feed.competition_id", feed.competition_id as u64),
    ];
    for (name, val) in positive {
        if *val == 0 {
            return Err(ConfigError::ValidationError {
                field: name.to_string(),
                message: "must be > 0".into(),
            });
        }
    }

    if let Some(clubs) = &config.data.clubs {
        if clubs.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                field: "data.clubs".into(),
                message: "must not be empty when set".into(),
            });
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
