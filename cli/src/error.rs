use fanout_core::error::{BuildError, ConfigError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("plan failed: {0}")]
    Build(#[from] BuildError),
    #[error("invalid --env value '{0}': expected KEY=VALUE")]
    InvalidEnv(String),
    #[error("env file error: {0}")]
    EnvFile(String),
    #[error("logging setup failed: {0}")]
    Logging(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0:#}")]
    Anyhow(#[from] anyhow::Error),
}

pub fn exit_code_for_error(e: &CliError) -> i32 {
    // 0: success
    // 11: config error
    // 20: plan build / IO error
    // 50: internal/uncategorized
    match e {
        CliError::Config(_) | CliError::InvalidEnv(_) | CliError::EnvFile(_) => 11,
        CliError::Build(be) if be.is_config_conflict() => 11,
        CliError::Build(_) => 20,
        CliError::Io(_) => 20,
        CliError::Logging(_) => 50,
        CliError::Anyhow(_) => 50,
    }
}
