//! Collaborators the task builder calls out to: resolving per-endpoint path
//! templates and turning a local subtree into an archive stream.

mod archive;
mod path;

use std::io;
use std::path::{Path, PathBuf};

use crate::endpoint::{Environment, InputReader};
use crate::error::ResolveError;

pub use archive::{LazyTarStream, TarArchiver};
pub use path::ShellPathResolver;

/// Lazy archive byte stream; single consumer, not restartable.
pub type ArchiveStream = InputReader;

/// Expands a path template with one endpoint's variables.
pub trait PathResolver: Send + Sync {
    fn resolve(
        &self,
        cwd: &Path,
        template: &str,
        env: &Environment,
    ) -> Result<PathBuf, ResolveError>;
}

/// Encodes the subtree `root` (relative to `base`) as a byte stream.
pub trait ArchiveStreamBuilder: Send + Sync {
    fn build(&self, base: &Path, root: &str, exclude: &[String]) -> io::Result<ArchiveStream>;
}

/// Remote-side command that unpacks an upload archive into `dst`.
pub fn remote_tar_command(dst: &str) -> String {
    format!("tar -C \"{}\" -xzf -", dst)
}
