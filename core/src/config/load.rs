use std::path::{Path, PathBuf};

use crate::error::ConfigError;

use super::types::AppConfig;

/// Get the default fanout data directory: ~/.fanout
pub fn get_fanout_data_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".fanout"))
}

pub fn load_default() -> Result<AppConfig, ConfigError> {
    // Priority 1: ~/.fanout/config.toml (highest)
    let mut candidates = Vec::new();
    if let Some(dir) = get_fanout_data_dir() {
        candidates.push(dir.join("config.toml"));
    }
    // Priority 2: ./fanout.config.toml (current directory)
    candidates.push(PathBuf::from("fanout.config.toml"));

    load_from(&candidates)
}

/// Load the first existing candidate, falling back to defaults, then apply
/// environment overrides.
pub fn load_from(candidates: &[PathBuf]) -> Result<AppConfig, ConfigError> {
    let mut cfg = match candidates.iter().find(|p| p.exists()) {
        Some(path) => read_app_config(path)?,
        None => AppConfig::default(),
    };

    // Environment variable overrides (Priority 0: highest)
    if let Ok(v) = std::env::var("FANOUT_DEBUG") {
        if let Some(debug) = parse_bool(&v) {
            cfg.debug = debug;
        }
    }

    Ok(cfg)
}

fn read_app_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let s = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str::<AppConfig>(&s).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn parse_bool(v: &str) -> Option<bool> {
    match v.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LogOutput;

    #[test]
    fn missing_files_fall_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_from(&[dir.path().join("nope.toml")]).unwrap();
        assert_eq!(cfg.logging.output, LogOutput::Stderr);
        assert_eq!(cfg.logging.level, "warn");
    }

    #[test]
    fn first_existing_candidate_wins() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("a.toml");
        let second = dir.path().join("b.toml");
        std::fs::write(&first, "[logging]\nlevel = \"debug\"\n").unwrap();
        std::fs::write(&second, "[logging]\nlevel = \"trace\"\n").unwrap();

        let cfg = load_from(&[dir.path().join("missing.toml"), first, second]).unwrap();
        assert_eq!(cfg.logging.level, "debug");
        assert!(cfg.logging.output.to_stderr());
    }

    #[test]
    fn malformed_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "debug = [").unwrap();

        let err = load_from(&[path.clone()]).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { path: ref p, .. } if *p == path));
    }

    #[test]
    fn parses_boolean_overrides() {
        assert_eq!(parse_bool("TRUE"), Some(true));
        assert_eq!(parse_bool("off"), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }
}
