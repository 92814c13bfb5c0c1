//! TOML config file, loaded from the platform config directory.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration for docq
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Service base URL
    pub base_url: Option<String>,
    /// Whether to use TUI mode by default
    pub tui: Option<bool>,
    /// Color palette for the TUI ("dark" or "light")
    pub theme: Option<String>,
    /// Knowledge item ids every question is scoped to by default
    pub knowledge_ids: Option<Vec<i64>>,
    /// Row cap for knowledge listings and searches
    pub search_limit: Option<i64>,
    /// Row cap for QA history listings
    pub history_limit: Option<u32>,
}

impl Config {
    /// Directory holding the config file
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("docq")
    }

    /// Path to the config file, honoring `DOCQ_CONFIG_PATH`
    pub fn config_path() -> PathBuf {
        match std::env::var("DOCQ_CONFIG_PATH") {
            Ok(path) => PathBuf::from(path),
            Err(_) => Self::config_dir().join("config.toml"),
        }
    }

    /// Load config from the default location
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    /// Load config from a specific file. A missing file is simply the
    /// default config; anything else wrong with it earns a warning.
    pub fn load_from(path: &Path) -> Self {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Self::default(),
            Err(e) => {
                eprintln!("Warning: could not read config file: {e}");
                return Self::default();
            }
        };
        toml::from_str(&content).unwrap_or_else(|e| {
            eprintln!("Warning: could not parse config file: {e}");
            Self::default()
        })
    }

    /// Save config to the default location
    pub fn save(&self) -> std::io::Result<()> {
        self.save_to(&Self::config_path())
    }

    /// Save config to a specific file
    pub fn save_to(&self, path: &Path) -> std::io::Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let rendered = toml::to_string_pretty(self).map_err(std::io::Error::other)?;
        fs::write(path, rendered)
    }

    /// Write a starter config unless one already exists
    pub fn init() -> std::io::Result<PathBuf> {
        let path = Self::config_path();
        if !path.exists() {
            let starter = Config {
                base_url: Some(docq_api::DEFAULT_BASE_URL.to_string()),
                tui: Some(true),
                search_limit: Some(10),
                history_limit: Some(10),
                ..Config::default()
            };
            starter.save()?;
        }
        Ok(path)
    }
}

/// Starter config text shown by `--init-config`
pub fn example_config() -> &'static str {
    r#"# docq configuration file
# Place at ~/.config/docq/config.toml (Linux/Mac) or %APPDATA%\docq\config.toml (Windows)

# Service base URL
base_url = "http://localhost:8000"

# Start the full-screen TUI by default; false gives plain stdin/stdout
tui = true

# Color palette for the TUI: "dark" (default) or "light"
# theme = "dark"

# Knowledge item ids every question is scoped to by default (optional)
# knowledge_ids = [3, 9]

# Row cap for knowledge listings and searches
search_limit = 10

# Row cap for QA history listings
history_limit = 10
"#
}
