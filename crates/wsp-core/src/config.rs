//! Read and write options, loadable from TOML.
//!
//! ```toml
//! [read]
//! mode = "permissive"
//! include_disabled = true
//! max_depth = 128
//!
//! [write]
//! legacy_compatible = false
//! target_version = "9.0"
//! max_depth = 128
//! ```

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::version::Version;

/// Default recursion cap for reads and writes.
pub const DEFAULT_MAX_DEPTH: usize = 128;

static LEGACY_WRITE_MODE: AtomicBool = AtomicBool::new(false);

/// Sets the process-wide default for [`WriteOptions::legacy_compatible`].
///
/// Only affects options built after the call.
pub fn set_legacy_write_mode(enabled: bool) {
    LEGACY_WRITE_MODE.store(enabled, Ordering::Relaxed);
}

pub fn legacy_write_mode() -> bool {
    LEGACY_WRITE_MODE.load(Ordering::Relaxed)
}

// =============================================================================
// OPTIONS
// =============================================================================

/// Recovery policy used for reads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadMode {
    /// Quarantine unknown elements and drop unknown properties.
    #[default]
    Permissive,
    /// Abort on the first unresolvable element or property.
    Strict,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReadOptions {
    pub mode: ReadMode,

    /// Keep disabled assertions. When false they are pruned after thaw.
    pub include_disabled: bool,

    pub max_depth: usize,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            mode: ReadMode::default(),
            include_disabled: true,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WriteOptions {
    /// Write the older shape of dual-shape assertions.
    pub legacy_compatible: bool,

    /// Omit mappings introduced after this product version.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_version: Option<Version>,

    pub max_depth: usize,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            legacy_compatible: legacy_write_mode(),
            target_version: None,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

// =============================================================================
// CONFIG FILE
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WspConfig {
    pub read: ReadOptions,
    pub write: WriteOptions,
}

impl WspConfig {
    /// Loads and validates a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text, path.to_path_buf())
    }

    /// Parses config text not backed by a file.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Self::parse(text, PathBuf::from("<inline>"))
    }

    fn parse(text: &str, path: PathBuf) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(text).map_err(|source| ConfigError::Toml { path, source })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.read.max_depth == 0 {
            return Err(ConfigError::Invalid {
                message: "read.max_depth must be at least 1".to_string(),
            });
        }
        if self.write.max_depth == 0 {
            return Err(ConfigError::Invalid {
                message: "write.max_depth must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = WspConfig::from_toml_str("").expect("config");
        assert_eq!(config.read.mode, ReadMode::Permissive);
        assert!(config.read.include_disabled);
        assert_eq!(config.read.max_depth, DEFAULT_MAX_DEPTH);
        assert_eq!(config.write.target_version, None);
    }

    #[test]
    fn test_full_config() {
        let config = WspConfig::from_toml_str(
            r#"
            [read]
            mode = "strict"
            include_disabled = false
            max_depth = 32

            [write]
            legacy_compatible = true
            target_version = "5.0"
            "#,
        )
        .expect("config");
        assert_eq!(config.read.mode, ReadMode::Strict);
        assert!(!config.read.include_disabled);
        assert_eq!(config.read.max_depth, 32);
        assert!(config.write.legacy_compatible);
        assert_eq!(config.write.target_version, Some(Version::new([5, 0])));
    }

    #[test]
    fn test_rejects_bad_values() {
        let err = WspConfig::from_toml_str("[read]\nmax_depth = 0\n").expect_err("zero depth");
        assert!(matches!(err, ConfigError::Invalid { .. }));

        let err = WspConfig::from_toml_str("[write]\ntarget_version = \"x.1\"\n")
            .expect_err("bad version");
        assert!(matches!(err, ConfigError::Toml { .. }));

        let err = WspConfig::from_toml_str("[read]\nverbose = true\n").expect_err("unknown key");
        assert!(matches!(err, ConfigError::Toml { .. }));
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = WspConfig::load(Path::new("/nonexistent/wsp.toml")).expect_err("missing");
        assert!(err.to_string().contains("/nonexistent/wsp.toml"));
    }
}
