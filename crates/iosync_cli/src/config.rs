//! CLI configuration file and flag layering.
//!
//! # Invariants
//! - Flags (and their environment variables) override file values.
//! - A missing `--config` means defaults; a named file that cannot be read
//!   is an error.

use iosync_core::{default_log_level, SyncConfig};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Contents of the TOML configuration file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliConfig {
    pub sync: SyncConfig,
    pub logging: LoggingSection,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingSection {
    pub level: Option<String>,
    pub dir: Option<PathBuf>,
}

/// Logging settings after layering; `None` dir disables logging.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingSettings {
    pub level: String,
    pub dir: Option<PathBuf>,
}

impl CliConfig {
    pub fn parse(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|err| format!("invalid configuration: {err}"))
    }

    /// Loads `path`, or defaults when no file was named.
    pub fn load(path: Option<&Path>) -> Result<Self, String> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let content = std::fs::read_to_string(path).map_err(|err| {
            format!("failed to read configuration `{}`: {err}", path.display())
        })?;
        Self::parse(&content)
    }

    /// Resolves logging settings with flag values taking precedence.
    pub fn logging_settings(
        &self,
        level_flag: Option<&str>,
        dir_flag: Option<&Path>,
    ) -> LoggingSettings {
        let level = level_flag
            .map(str::to_string)
            .or_else(|| self.logging.level.clone())
            .unwrap_or_else(|| default_log_level().to_string());
        let dir = dir_flag
            .map(Path::to_path_buf)
            .or_else(|| self.logging.dir.clone())
            .map(absolutize);
        LoggingSettings { level, dir }
    }
}

fn absolutize(dir: PathBuf) -> PathBuf {
    if dir.is_absolute() {
        return dir;
    }
    match std::env::current_dir() {
        Ok(cwd) => cwd.join(dir),
        Err(_) => dir,
    }
}

#[cfg(test)]
mod tests {
    use super::CliConfig;
    use std::path::Path;

    #[test]
    fn partial_file_keeps_defaults() {
        let config = CliConfig::parse("[sync]\npreview_limit = 20\n").unwrap();
        assert_eq!(config.sync.preview_limit, 20);
        assert_eq!(config.sync.busy_timeout_ms, 5_000);
        assert_eq!(config.logging.dir, None);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = CliConfig::parse("[logging]\nfile = \"x\"\n").unwrap_err();
        assert!(err.starts_with("invalid configuration"));
    }

    #[test]
    fn flags_override_file_values() {
        let config = CliConfig::parse(
            "[logging]\nlevel = \"warn\"\ndir = \"/var/log/iosync\"\n",
        )
        .unwrap();

        let from_file = config.logging_settings(None, None);
        assert_eq!(from_file.level, "warn");
        assert_eq!(from_file.dir.as_deref(), Some(Path::new("/var/log/iosync")));

        let overridden = config.logging_settings(Some("trace"), Some(Path::new("/tmp/logs")));
        assert_eq!(overridden.level, "trace");
        assert_eq!(overridden.dir.as_deref(), Some(Path::new("/tmp/logs")));
    }

    #[test]
    fn logging_is_off_without_a_directory() {
        let settings = CliConfig::default().logging_settings(Some("info"), None);
        assert_eq!(settings.dir, None);
    }

    #[test]
    fn relative_log_dir_is_made_absolute() {
        let settings = CliConfig::default().logging_settings(None, Some(Path::new("logs")));
        assert!(settings.dir.unwrap().is_absolute());
    }

    #[test]
    fn load_reads_named_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("iosync.toml");
        std::fs::write(&path, "[sync]\nbusy_timeout_ms = 250\n").unwrap();

        let config = CliConfig::load(Some(&path)).unwrap();
        assert_eq!(config.sync.busy_timeout_ms, 250);
        assert!(CliConfig::load(Some(&dir.path().join("absent.toml"))).is_err());
        assert_eq!(CliConfig::load(None).unwrap(), CliConfig::default());
    }
}
