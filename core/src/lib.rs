//! Planning stage of a multi-host command runner.
//!
//! A [`plan::Directive`] (upload, script, local command, or remote command)
//! plus a list of [`endpoint::SharedEndpoint`]s goes in; an ordered list of
//! [`plan::Task`]s comes out, each bound to the endpoints that must run it.

pub mod config;
pub mod endpoint;
pub mod error;
pub mod plan;
pub mod resolve;

pub use error::{BuildError, ConfigError, EndpointError, ResolveError, TaskError};
pub use plan::{BuilderConfig, Directive, Task, TaskBuilder};
