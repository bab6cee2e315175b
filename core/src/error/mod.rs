pub mod build;
pub mod config;
pub mod endpoint;
pub mod task;

pub use build::BuildError;
pub use config::ConfigError;
pub use endpoint::{EndpointError, ResolveError};
pub use task::TaskError;
