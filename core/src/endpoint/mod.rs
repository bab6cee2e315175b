//! Execution endpoints and the environment they carry.
//!
//! The planner never mutates an endpoint: it only partitions a caller-owned
//! list of [`SharedEndpoint`]s and hands clones of the `Arc`s to tasks.

mod env;
mod local;
mod process;
mod ssh;

use std::fmt;
use std::io::Read;
use std::sync::Arc;

use crate::error::EndpointError;

pub use env::Environment;
pub use local::LocalhostEndpoint;
pub use ssh::SshEndpoint;

/// Byte stream fed to a command's standard input.
pub type InputReader = Box<dyn Read + Send>;

/// An opaque execution target.
pub trait Endpoint: Send + Sync + fmt::Debug {
    /// Display name used in plans and error reports.
    fn name(&self) -> &str;

    /// Per-endpoint variables used for path template expansion and command
    /// environment exports.
    fn env(&self) -> &Environment;

    fn connect(&mut self, address: &str) -> Result<(), EndpointError>;

    /// Run `command`, feeding `input` to its stdin. Returns the exit code.
    fn run(
        &self,
        command: &str,
        input: Option<InputReader>,
        tty: bool,
    ) -> Result<i32, EndpointError>;
}

/// Endpoint handle shared between the caller and every task bound to it.
pub type SharedEndpoint = Arc<dyn Endpoint>;
