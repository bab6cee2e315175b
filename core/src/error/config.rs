use std::path::PathBuf;

use thiserror::Error;

use super::endpoint::EndpointError;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parsing {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("unknown network '{0}'")]
    UnknownNetwork(String),

    #[error("unknown command '{0}'")]
    UnknownCommand(String),

    #[error("invalid environment binding '{0}'")]
    InvalidEnv(String),

    #[error("network {network}: {source}")]
    Endpoint {
        network: String,
        #[source]
        source: EndpointError,
    },
}
