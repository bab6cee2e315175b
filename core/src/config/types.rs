use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::load::get_fanout_data_dir;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Trace every planned command with `set -x`.
    #[serde(default)]
    pub debug: bool,
}

/// Where log events are written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    Off,
    #[default]
    Stderr,
    File,
    Both,
}

impl LogOutput {
    pub fn to_stderr(self) -> bool {
        matches!(self, Self::Stderr | Self::Both)
    }

    pub fn to_file(self) -> bool {
        matches!(self, Self::File | Self::Both)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub output: LogOutput,

    /// EnvFilter directive, e.g. "warn" or "fanout_core=debug".
    pub level: String,

    /// Log file directory; `~/.fanout/logs` when unset.
    pub directory: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            output: LogOutput::default(),
            level: "warn".to_string(),
            directory: None,
        }
    }
}

impl LoggingConfig {
    /// Filter used when `RUST_LOG` is unset. Debug runs also surface the
    /// planner's own grouping and batch events.
    pub fn filter_directive(&self, debug: bool) -> String {
        if debug {
            format!("{},fanout_core=debug,fanout=debug", self.level)
        } else {
            self.level.clone()
        }
    }

    pub fn log_dir(&self) -> PathBuf {
        match &self.directory {
            Some(dir) if !dir.as_os_str().is_empty() => dir.clone(),
            _ => get_fanout_data_dir()
                .map(|dir| dir.join("logs"))
                .unwrap_or_else(|| std::env::temp_dir().join("fanout")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_modes_parse_lowercase() {
        let cfg: LoggingConfig = toml::from_str("output = \"both\"").unwrap();
        assert!(cfg.output.to_stderr() && cfg.output.to_file());
        assert_eq!(cfg.level, "warn");

        let off: LoggingConfig = toml::from_str("output = \"off\"").unwrap();
        assert!(!off.output.to_stderr() && !off.output.to_file());
    }

    #[test]
    fn debug_raises_planner_verbosity() {
        let cfg = LoggingConfig::default();
        assert_eq!(cfg.filter_directive(false), "warn");
        assert_eq!(
            cfg.filter_directive(true),
            "warn,fanout_core=debug,fanout=debug"
        );
    }

    #[test]
    fn explicit_directory_wins() {
        let cfg = LoggingConfig {
            directory: Some(PathBuf::from("/var/log/fanout")),
            ..Default::default()
        };
        assert_eq!(cfg.log_dir(), PathBuf::from("/var/log/fanout"));
    }
}
