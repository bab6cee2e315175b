use std::path::{Path, PathBuf};

use crate::endpoint::Environment;
use crate::error::ResolveError;

use super::PathResolver;

/// Expands `$VAR`, `${VAR}` and a leading `~` the way a shell would.
///
/// Variables are looked up in the endpoint environment first and the process
/// environment second; an unknown variable is an error rather than an empty
/// string. Relative results are anchored at `cwd`.
#[derive(Debug, Clone, Default)]
pub struct ShellPathResolver;

impl PathResolver for ShellPathResolver {
    fn resolve(
        &self,
        cwd: &Path,
        template: &str,
        env: &Environment,
    ) -> Result<PathBuf, ResolveError> {
        let home = || {
            env.get("HOME")
                .map(str::to_string)
                .or_else(|| std::env::var("HOME").ok())
        };
        let lookup = |var: &str| -> Result<Option<String>, ResolveError> {
            if let Some(value) = env.get(var) {
                return Ok(Some(value.to_string()));
            }
            match std::env::var(var) {
                Ok(value) => Ok(Some(value)),
                Err(_) => Err(ResolveError::Undefined {
                    var: var.to_string(),
                }),
            }
        };

        let expanded = shellexpand::full_with_context(template, home, lookup)
            .map_err(|e| e.cause)?;

        let expanded = expanded.trim_end_matches('/');
        if expanded.is_empty() {
            // A bare "/" template trims down to nothing.
            return if template.starts_with('/') {
                Ok(PathBuf::from("/"))
            } else {
                Err(ResolveError::Empty)
            };
        }

        let path = Path::new(expanded);
        if path.is_absolute() {
            Ok(path.to_path_buf())
        } else {
            Ok(cwd.join(path))
        }
    }
}
