//! # Module Configuration
//!
//! [`GuardConfig`] holds everything the module needs that is not a host collaborator:
//! its name (used as the log prefix), the hook it subscribes to, the release whose
//! behaviour it should reproduce, and where the on-disk caches live.
//!
//! Every field has a default, so an empty JSON object is a valid configuration:
//!
//! ```
//! use stock_guard::config::{GuardConfig, ModuleVersion};
//!
//! let config = GuardConfig::from_json_str(r#"{ "version": "1.1.0" }"#).unwrap();
//! assert_eq!(config.version, ModuleVersion::V1_1_0);
//! assert!(config.scan_on_install());
//! assert!(!config.invalidate_caches());
//! assert_eq!(config.module_name, "autodisablestockzero");
//! ```

use serde::{Deserialize, Serialize};
use shop_host::DEFAULT_STOCK_HOOK;
use std::path::{Path, PathBuf};

/// Environment variable overriding [`GuardConfig::cache_dir`].
pub const CACHE_DIR_ENV: &str = "STOCK_GUARD_CACHE_DIR";

/// Errors raised while loading a configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Released behaviours of the module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ModuleVersion {
    /// Disable on stock change only.
    #[serde(rename = "1.0.0")]
    V1_0_0,
    /// Adds the one-time scan of existing products at install.
    #[serde(rename = "1.1.0")]
    V1_1_0,
    /// Adds cache invalidation after a scan that disabled something.
    #[serde(rename = "1.2.1")]
    V1_2_1,
}

impl ModuleVersion {
    pub const LATEST: ModuleVersion = ModuleVersion::V1_2_1;

    pub fn as_str(self) -> &'static str {
        match self {
            ModuleVersion::V1_0_0 => "1.0.0",
            ModuleVersion::V1_1_0 => "1.1.0",
            ModuleVersion::V1_2_1 => "1.2.1",
        }
    }
}

impl Default for ModuleVersion {
    fn default() -> Self {
        Self::LATEST
    }
}

impl std::fmt::Display for ModuleVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Module configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardConfig {
    /// Technical module name, used as the `[name]` prefix of every log message.
    pub module_name: String,
    /// Host hook fired on stock quantity updates.
    pub hook_name: String,
    pub version: ModuleVersion,
    /// Root of the host's on-disk cache.
    pub cache_dir: PathBuf,
    /// Class index file under `cache_dir`, deleted on invalidation.
    pub class_index_file: PathBuf,
    /// Directories under `cache_dir` emptied on invalidation. The directories stay.
    pub cache_subdirs: Vec<PathBuf>,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            module_name: "autodisablestockzero".to_string(),
            hook_name: DEFAULT_STOCK_HOOK.to_string(),
            version: ModuleVersion::default(),
            cache_dir: PathBuf::from("var/cache/prod"),
            class_index_file: PathBuf::from("class_index.php"),
            cache_subdirs: vec![PathBuf::from("smarty/cache"), PathBuf::from("smarty/compile")],
        }
    }
}

impl GuardConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Applies `STOCK_GUARD_CACHE_DIR` when set.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(dir) = std::env::var_os(CACHE_DIR_ENV) {
            self.cache_dir = PathBuf::from(dir);
        }
        self
    }

    pub fn with_version(mut self, version: ModuleVersion) -> Self {
        self.version = version;
        self
    }

    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = dir.into();
        self
    }

    pub fn scan_on_install(&self) -> bool {
        self.version >= ModuleVersion::V1_1_0
    }

    pub fn invalidate_caches(&self) -> bool {
        self.version >= ModuleVersion::V1_2_1
    }

    /// Absolute cache artifacts derived from `cache_dir`.
    pub fn cache_paths(&self) -> CachePaths {
        CachePaths {
            class_index: self.cache_dir.join(&self.class_index_file),
            directories: self
                .cache_subdirs
                .iter()
                .map(|dir| self.cache_dir.join(dir))
                .collect(),
        }
    }
}

/// On-disk cache artifacts cleared after a scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachePaths {
    pub class_index: PathBuf,
    pub directories: Vec<PathBuf>,
}
