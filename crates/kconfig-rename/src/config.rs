//! Configuration management for kconfig-rename.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default configuration directory name.
const CONFIG_DIR_NAME: &str = "kconfig-rename";

/// Prefix for environment variable overrides.
const ENV_PREFIX: &str = "KCRENAME_";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `KCRENAME_`, sections split on `__`)
/// 2. TOML config file at `~/.config/kconfig-rename/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Tree scanning configuration.
    pub scan: ScanConfig,
    /// Output configuration.
    pub output: OutputConfig,
}

/// Which files are visited and how symbol families are matched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Kconfig file names. A file matches when its name equals an entry or
    /// starts with an entry followed by `.` (`Kconfig.defconfig`).
    pub kconfig_names: Vec<String>,
    /// Extensions (without the dot) of files holding `CONFIG_` references.
    pub source_extensions: Vec<String>,
    /// Exact file names holding `CONFIG_` references.
    pub source_file_names: Vec<String>,
    /// Directory names that are never entered.
    pub exclude_dirs: Vec<String>,
    /// Only treat `<SYMBOL>_*` as sub-symbols, not every name sharing the
    /// symbol's text as a prefix.
    pub strict_subsymbols: bool,
}

/// Output-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Print reports as JSON by default.
    pub json: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            kconfig_names: vec!["Kconfig".to_string()],
            source_extensions: vec!["c".to_string(), "h".to_string(), "conf".to_string()],
            source_file_names: vec!["CMakeLists.txt".to_string()],
            exclude_dirs: vec![".git".to_string()],
            strict_subsymbols: true,
        }
    }
}

impl ScanConfig {
    /// Check whether a file name denotes a Kconfig file.
    #[must_use]
    pub fn is_kconfig_file(&self, file_name: &str) -> bool {
        self.kconfig_names.iter().any(|name| {
            file_name == name
                || file_name
                    .strip_prefix(name.as_str())
                    .is_some_and(|rest| rest.starts_with('.'))
        })
    }

    /// Check whether a file name denotes a file with `CONFIG_` references.
    #[must_use]
    pub fn is_source_file(&self, file_name: &str) -> bool {
        if self.source_file_names.iter().any(|name| name == file_name) {
            return true;
        }
        file_name.rsplit_once('.').is_some_and(|(stem, ext)| {
            !stem.is_empty() && self.source_extensions.iter().any(|e| e == ext)
        })
    }

    /// Check whether a directory should be skipped.
    #[must_use]
    pub fn is_excluded_dir(&self, dir_name: &str) -> bool {
        self.exclude_dirs.iter().any(|d| d == dir_name)
    }
}

impl Config {
    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(CONFIG_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        let scan = &self.scan;

        if scan.kconfig_names.is_empty() {
            return Err(Error::config_validation("scan.kconfig_names must not be empty"));
        }

        if scan.source_extensions.is_empty() && scan.source_file_names.is_empty() {
            return Err(Error::config_validation(
                "scan.source_extensions and scan.source_file_names cannot both be empty",
            ));
        }

        let lists = [
            ("kconfig_names", &scan.kconfig_names),
            ("source_extensions", &scan.source_extensions),
            ("source_file_names", &scan.source_file_names),
            ("exclude_dirs", &scan.exclude_dirs),
        ];
        for (field, values) in lists {
            if values.iter().any(|v| v.trim().is_empty()) {
                return Err(Error::config_validation(format!(
                    "scan.{field} contains a blank entry"
                )));
            }
        }

        if let Some(ext) = scan.source_extensions.iter().find(|e| e.starts_with('.')) {
            return Err(Error::config_validation(format!(
                "scan.source_extensions entry '{ext}' must not start with '.'"
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.scan.kconfig_names, vec!["Kconfig"]);
        assert!(config.scan.strict_subsymbols);
        assert!(!config.output.json);
    }

    #[test]
    fn test_default_scan_config() {
        let scan = ScanConfig::default();

        assert!(scan.source_extensions.contains(&"c".to_string()));
        assert!(scan.source_extensions.contains(&"h".to_string()));
        assert!(scan.source_extensions.contains(&"conf".to_string()));
        assert_eq!(scan.source_file_names, vec!["CMakeLists.txt"]);
        assert_eq!(scan.exclude_dirs, vec![".git"]);
    }

    #[test]
    fn test_is_kconfig_file() {
        let scan = ScanConfig::default();

        assert!(scan.is_kconfig_file("Kconfig"));
        assert!(scan.is_kconfig_file("Kconfig.adxl362"));
        assert!(scan.is_kconfig_file("Kconfig.defconfig"));
        assert!(!scan.is_kconfig_file("Kconfigs"));
        assert!(!scan.is_kconfig_file("my.Kconfig"));
        assert!(!scan.is_kconfig_file("kconfig"));
    }

    #[test]
    fn test_is_source_file() {
        let scan = ScanConfig::default();

        assert!(scan.is_source_file("adxl362.c"));
        assert!(scan.is_source_file("adxl362.h"));
        assert!(scan.is_source_file("prj.conf"));
        assert!(scan.is_source_file("CMakeLists.txt"));
        assert!(!scan.is_source_file("notes.txt"));
        assert!(!scan.is_source_file("adxl362.cpp"));
        assert!(!scan.is_source_file(".c"));
    }

    #[test]
    fn test_is_excluded_dir() {
        let scan = ScanConfig::default();

        assert!(scan.is_excluded_dir(".git"));
        assert!(!scan.is_excluded_dir("drivers"));
    }

    #[test]
    fn test_validate_valid_config() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_empty_kconfig_names() {
        let mut config = Config::default();
        config.scan.kconfig_names.clear();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("kconfig_names"));
    }

    #[test]
    fn test_validate_no_source_selectors() {
        let mut config = Config::default();
        config.scan.source_extensions.clear();
        config.scan.source_file_names.clear();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("cannot both be empty"));
    }

    #[test]
    fn test_validate_dotted_extension() {
        let mut config = Config::default();
        config.scan.source_extensions.push(".cpp".to_string());

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains(".cpp"));
    }

    #[test]
    fn test_validate_blank_entry() {
        let mut config = Config::default();
        config.scan.exclude_dirs.push("  ".to_string());

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("exclude_dirs"));
    }

    #[test]
    fn test_default_config_path() {
        let path = Config::default_config_path();
        assert!(path.to_string_lossy().contains("kconfig-rename"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }

    #[test]
    fn test_load_nonexistent_config() {
        // Loading from a nonexistent path should work (uses defaults)
        let result = Config::load_from(Some(PathBuf::from("/nonexistent/config.toml")));
        assert!(result.is_ok());
        assert_eq!(result.unwrap(), Config::default());
    }

    #[test]
    fn test_load_from_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[scan]\nsource_extensions = [\"c\", \"h\", \"dts\"]\nstrict_subsymbols = false\n\n[output]\njson = true\n",
        )
        .unwrap();

        let config = Config::load_from(Some(path)).unwrap();
        assert_eq!(config.scan.source_extensions, vec!["c", "h", "dts"]);
        assert!(!config.scan.strict_subsymbols);
        assert!(config.output.json);
        // untouched keys keep their defaults
        assert_eq!(config.scan.kconfig_names, vec!["Kconfig"]);
    }

    #[test]
    fn test_load_rejects_invalid_toml_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[scan]\nkconfig_names = []\n").unwrap();

        let err = Config::load_from(Some(path)).unwrap_err();
        assert!(matches!(err, Error::ConfigValidation { .. }));
    }

    #[test]
    fn test_config_serialize() {
        let config = Config::default();
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("kconfig_names"));
        assert!(json.contains("strict_subsymbols"));
    }

    #[test]
    fn test_scan_config_deserialize() {
        let json = r#"{"exclude_dirs": [".git", "build"]}"#;
        let scan: ScanConfig = serde_json::from_str(json).unwrap();
        assert_eq!(scan.exclude_dirs, vec![".git", "build"]);
        assert_eq!(scan.kconfig_names, vec!["Kconfig"]);
    }
}
