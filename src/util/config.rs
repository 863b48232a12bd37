//! Configuration file support for toolchest.
//!
//! toolchest supports two configuration file locations:
//! - Global: `~/.toolchest/config.toml` - User-wide defaults
//! - Project: `.toolchest/config.toml` - Project-specific overrides
//!
//! Project config takes precedence over global config.
//!
//! Known toolchains are stored separately in `toolchains.toml`, one
//! `[[toolchain]]` table per toolchain.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::builder::toolchain::{id_from_map, ToolchainData};
use crate::core::ids::InstanceId;
use crate::core::language::Language;

/// Name of the per-user and per-project configuration directory.
pub const CONFIG_DIR_NAME: &str = ".toolchest";

/// toolchest configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Toolchain detection settings
    pub detection: DetectionConfig,
}

/// How toolchains are detected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Directories searched for compilers instead of `PATH`
    pub search_paths: Vec<PathBuf>,

    /// Toolchain kinds (type ids) that are never detected or restored
    pub disabled_kinds: Vec<String>,

    /// Compilers outside the search path that detection should offer
    pub extra_compilers: Vec<ExtraCompiler>,
}

/// A compiler listed explicitly in the configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtraCompiler {
    /// Toolchain kind (`gcc`, `clang`, `custom`). Defaults to `custom`.
    #[serde(default)]
    pub kind: Option<String>,

    /// Path to the compiler executable
    pub path: PathBuf,

    /// Language the compiler is used for (`c` or `c++`)
    pub language: Language,

    /// Display name; generated from the path when missing
    #[serde(default)]
    pub name: Option<String>,

    /// Extra flags passed to the compiler (custom toolchains only)
    #[serde(default)]
    pub flags: Vec<String>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    ///
    /// Search paths are replaced, disabled kinds are combined and extra
    /// compilers are appended.
    pub fn merge(&mut self, other: Config) {
        let detection = &mut self.detection;

        if !other.detection.search_paths.is_empty() {
            detection.search_paths = other.detection.search_paths;
        }
        for kind in other.detection.disabled_kinds {
            if !detection.disabled_kinds.contains(&kind) {
                detection.disabled_kinds.push(kind);
            }
        }
        detection
            .extra_compilers
            .extend(other.detection.extra_compilers);
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.toolchest/config.toml)
/// 2. Global config (~/.toolchest/config.toml)
/// 3. Defaults
pub fn load_config(global_path: Option<&Path>, project_path: &Path) -> Config {
    let mut config = Config::default();

    if let Some(global_path) = global_path {
        config.merge(Config::load_or_default(global_path));
    }
    config.merge(Config::load_or_default(project_path));

    config
}

/// Get the global toolchest config directory (~/.toolchest).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(CONFIG_DIR_NAME))
}

/// Get the global config path (~/.toolchest/config.toml).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the project config path (.toolchest/config.toml).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(CONFIG_DIR_NAME).join("config.toml")
}

/// Default location of the toolchain store.
///
/// `~/.toolchest/toolchains.toml`, or the project directory when there is
/// no home directory.
pub fn default_store_path(project_root: &Path) -> PathBuf {
    global_config_dir()
        .unwrap_or_else(|| project_root.join(CONFIG_DIR_NAME))
        .join("toolchains.toml")
}

/// Persisted toolchains, in the order they were added.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolchainStore {
    #[serde(rename = "toolchain")]
    entries: Vec<ToolchainData>,
}

impl ToolchainStore {
    /// Load the store from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read toolchain store: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse toolchain store: {}", path.display()))
    }

    /// Load the store, starting empty if the file doesn't exist.
    ///
    /// Unlike configuration, a store that exists but cannot be parsed is an
    /// error: saving over it would lose every toolchain in it.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!("no toolchain store at {}", path.display());
            Ok(Self::default())
        }
    }

    /// Save the store to a file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("failed to create store directory: {}", parent.display())
            })?;
        }

        let contents =
            toml::to_string_pretty(self).with_context(|| "failed to serialize toolchain store")?;

        std::fs::write(path, contents)
            .with_context(|| format!("failed to write toolchain store: {}", path.display()))?;

        Ok(())
    }

    pub fn entries(&self) -> &[ToolchainData] {
        &self.entries
    }

    /// Append an entry, replacing an existing entry with the same instance id.
    pub fn upsert(&mut self, data: ToolchainData) {
        let id = id_from_map(&data);
        match self.entries.iter_mut().find(|e| id_from_map(e) == id) {
            Some(existing) => *existing = data,
            None => self.entries.push(data),
        }
    }

    /// Remove the entry with instance id `id`. Returns whether one was removed.
    pub fn remove(&mut self, id: &InstanceId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| id_from_map(e) != *id);
        self.entries.len() != before
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
