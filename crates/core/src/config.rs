use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Root application configuration. Loaded from an optional TOML file and
/// environment variables with the prefix `NOVAMART__`.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub log: LogConfig,
}

/// Where the dataset files live.
///
/// An explicit `dir` is authoritative: when it is set, no other location is
/// considered. Without it the `candidates` list is checked in order and the
/// first existing directory is used.
#[derive(Debug, Clone, Deserialize)]
pub struct DataConfig {
    #[serde(default)]
    pub dir: Option<String>,
    #[serde(default = "default_candidates")]
    pub candidates: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_max_views")]
    pub max_views: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    #[serde(default = "default_log_filter")]
    pub filter: String,
    #[serde(default = "default_log_json")]
    pub json: bool,
}

// Default functions
fn default_candidates() -> Vec<String> {
    vec![
        "NovaMart_Marketing_Analytics_Dataset/marketing_dataset".to_string(),
        "data".to_string(),
        "marketing_dataset".to_string(),
    ]
}
fn default_max_views() -> usize {
    64
}
fn default_log_filter() -> String {
    "novamart_dashboard=info,novamart_loader=info".to_string()
}
fn default_log_json() -> bool {
    false
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            dir: None,
            candidates: default_candidates(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_views: default_max_views(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            json: default_log_json(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data: DataConfig::default(),
            cache: CacheConfig::default(),
            log: LogConfig::default(),
        }
    }
}

impl DataConfig {
    /// Config pinned to a single directory.
    pub fn with_dir(dir: impl Into<String>) -> Self {
        Self {
            dir: Some(dir.into()),
            candidates: default_candidates(),
        }
    }

    /// Directories to check, in priority order.
    pub fn candidate_dirs(&self) -> Vec<PathBuf> {
        match &self.dir {
            Some(dir) => vec![PathBuf::from(dir)],
            None => self.candidates.iter().map(PathBuf::from).collect(),
        }
    }
}

impl AppConfig {
    /// Load configuration from an optional TOML file, then environment
    /// variables (`NOVAMART__DATA__DIR`, `NOVAMART__LOG__JSON`, ...).
    pub fn load(path: Option<&Path>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }
        let builder = builder.add_source(
            config::Environment::with_prefix("NOVAMART")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("data.candidates"),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }
}
