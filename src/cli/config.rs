// ABOUTME: Configuration management for the trailhead CLI
// ABOUTME: Handles loading and merging configuration from files and environment variables

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::template::DEFAULT_TEMPLATE_DIR;
use crate::wizard::DEFAULT_STORAGE_KEY;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_state_dir")]
    pub state_dir: PathBuf,

    #[serde(default = "default_storage_key")]
    pub storage_key: String,

    /// YAML step model; the built-in onboarding steps when unset
    #[serde(default)]
    pub steps_file: Option<PathBuf>,

    #[serde(default)]
    pub templates: TemplatesConfig,

    #[serde(default)]
    pub template_vars: BTreeMap<String, String>,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplatesConfig {
    /// Site root: a directory or an http(s) origin. Components resolve here.
    #[serde(default = "default_template_root")]
    pub root: String,

    /// Prefix for step template fetches, relative to `root`
    #[serde(default)]
    pub base: String,

    #[serde(default = "default_template_directory")]
    pub directory: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

fn default_state_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("trailhead"))
        .unwrap_or_else(|| PathBuf::from(".trailhead"))
}

fn default_storage_key() -> String {
    DEFAULT_STORAGE_KEY.to_string()
}

fn default_template_root() -> String {
    ".".to_string()
}

fn default_template_directory() -> String {
    DEFAULT_TEMPLATE_DIR.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            state_dir: default_state_dir(),
            storage_key: default_storage_key(),
            steps_file: None,
            templates: TemplatesConfig::default(),
            template_vars: BTreeMap::new(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for TemplatesConfig {
    fn default() -> Self {
        Self {
            root: default_template_root(),
            base: String::new(),
            directory: default_template_directory(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from file path or default locations
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p,
            None => Self::find_config_file()?,
        };

        let mut config = if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path)?;
            serde_yaml::from_str(&contents)?
        } else {
            Config::default()
        };

        config.merge_env()?;
        Ok(config)
    }

    /// Find configuration file in standard locations
    fn find_config_file() -> Result<PathBuf> {
        let possible_paths = vec![
            PathBuf::from("trailhead.yaml"),
            PathBuf::from("trailhead.yml"),
            PathBuf::from(".trailhead.yaml"),
            PathBuf::from(".trailhead.yml"),
        ];

        // Check current directory
        for path in possible_paths {
            if path.exists() {
                return Ok(path);
            }
        }

        // Check home directory
        if let Some(home_dir) = dirs::home_dir() {
            let home_config = home_dir.join(".trailhead").join("config.yaml");
            if home_config.exists() {
                return Ok(home_config);
            }
        }

        // Return default path (may not exist)
        Ok(PathBuf::from("trailhead.yaml"))
    }

    /// Merge environment variables into configuration
    fn merge_env(&mut self) -> Result<()> {
        if let Ok(dir) = std::env::var("TRAILHEAD_STATE_DIR") {
            self.state_dir = PathBuf::from(dir);
        }
        if let Ok(key) = std::env::var("TRAILHEAD_STORAGE_KEY") {
            self.storage_key = key;
        }

        // Templates
        if let Ok(root) = std::env::var("TRAILHEAD_TEMPLATE_ROOT") {
            self.templates.root = root;
        }
        if let Ok(base) = std::env::var("TRAILHEAD_TEMPLATE_BASE") {
            self.templates.base = base;
        }

        // Logging configuration
        if let Ok(level) = std::env::var("TRAILHEAD_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("TRAILHEAD_LOG_FORMAT") {
            self.logging.format = format;
        }

        Ok(())
    }

    /// Merge additional variables into template variables
    pub fn merge_variables(&mut self, vars: BTreeMap<String, String>) {
        self.template_vars.extend(vars);
    }
}
