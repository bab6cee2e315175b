use std::path::PathBuf;

use thiserror::Error;

use super::endpoint::{EndpointError, ResolveError};

/// Errors raised while expanding a directive into tasks.
///
/// Every variant is fatal to the whole build call: no partial task list is
/// returned alongside an error.
#[derive(Error, Debug)]
pub enum BuildError {
    #[error("resolving CWD failed: {0}")]
    Cwd(#[source] std::io::Error),

    #[error("upload: {src}: {source}")]
    Resolve {
        src: String,
        #[source]
        source: ResolveError,
    },

    #[error("upload: {src}: invalid exclude pattern '{pattern}': {source}")]
    InvalidExclude {
        src: String,
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("upload: {src}: {source}")]
    Archive {
        src: String,
        #[source]
        source: std::io::Error,
    },

    #[error("upload: {src}: serial not supported when using host variables")]
    SerialConflict { src: String },

    #[error("can't open script {}: {source}", path.display())]
    ScriptOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("can't read script {}: {source}", path.display())]
    ScriptRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("connecting to localhost failed: {0}")]
    LocalConnect(#[source] EndpointError),

    #[error("no endpoints to run {kind} against")]
    NoEndpoints { kind: &'static str },
}

impl BuildError {
    /// True when the failure comes from conflicting directive settings rather
    /// than from the filesystem or an endpoint.
    pub fn is_config_conflict(&self) -> bool {
        matches!(
            self,
            Self::SerialConflict { .. } | Self::InvalidExclude { .. } | Self::NoEndpoints { .. }
        )
    }
}
