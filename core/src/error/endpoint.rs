use thiserror::Error;

#[derive(Error, Debug)]
pub enum EndpointError {
    #[error("endpoint {0} is not connected")]
    NotConnected(String),

    #[error("invalid address '{0}'")]
    InvalidAddress(String),

    #[error("spawn failed: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("stream io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Path template expansion failures.
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("undefined variable ${var}")]
    Undefined { var: String },

    #[error("empty path after expansion")]
    Empty,
}
