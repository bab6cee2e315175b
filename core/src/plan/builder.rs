use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::endpoint::{Endpoint, Environment, LocalhostEndpoint, SharedEndpoint};
use crate::error::BuildError;
use crate::resolve::{
    remote_tar_command, ArchiveStreamBuilder, PathResolver, ShellPathResolver, TarArchiver,
};

use super::directive::{Action, Directive, Upload};
use super::grouping::{group_for, GroupMode};
use super::task::{make_batch_task, ArchiveSpec, InputSource, Task, TaskTemplate, DIR_ROOT};

/// Shell trace prefix applied to every non-upload command in debug mode.
pub const DEBUG_PREFIX: &str = "set -x;";

/// Address the synthetic local endpoint is connected to.
pub const LOCAL_ADDRESS: &str = "localhost";

#[derive(Debug, Clone, Default)]
pub struct BuilderConfig {
    /// Prefix command bodies with [`DEBUG_PREFIX`].
    pub debug: bool,
}

/// Expands directives into ordered, endpoint-bound tasks.
///
/// Synchronous and stateless between calls; the only side effects are
/// reading script files and connecting the synthetic local endpoint.
pub struct TaskBuilder {
    config: BuilderConfig,
    resolver: Arc<dyn PathResolver>,
    archiver: Arc<dyn ArchiveStreamBuilder>,
    working_dir: Option<PathBuf>,
}

/// Endpoints whose upload source resolved to the same local path.
#[derive(Debug)]
struct PathGroup {
    path: PathBuf,
    members: Vec<usize>,
}

impl TaskBuilder {
    pub fn new(config: BuilderConfig) -> Self {
        Self {
            config,
            resolver: Arc::new(ShellPathResolver),
            archiver: Arc::new(TarArchiver::default()),
            working_dir: None,
        }
    }

    pub fn with_resolver(mut self, resolver: Arc<dyn PathResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn with_archiver(mut self, archiver: Arc<dyn ArchiveStreamBuilder>) -> Self {
        self.archiver = archiver;
        self
    }

    /// Anchor relative upload sources here instead of the process CWD.
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    /// Expand one directive. On error nothing is returned; callers must not
    /// treat a failed build as a partial plan.
    ///
    /// Upload, script and run directives against an empty endpoint list fail
    /// with [`BuildError::NoEndpoints`] rather than yielding no tasks.
    pub fn build(
        &self,
        directive: &Directive,
        endpoints: &[SharedEndpoint],
        env: &Environment,
    ) -> Result<Vec<Task>, BuildError> {
        let mut tasks = Vec::new();
        let mode = directive.mode();

        match &directive.action {
            Action::Upload(uploads) => {
                let cwd = self.working_dir()?;
                for upload in uploads {
                    self.build_upload(upload, mode, &cwd, endpoints, env, &mut tasks)?;
                }
            }
            Action::Script(path) => {
                let body = read_script(path)?;
                self.build_command(directive, "script", &body, endpoints, &mut tasks)?;
            }
            Action::Local(command) => {
                tasks.push(self.build_local(directive, command, env)?);
            }
            Action::Run(command) => {
                self.build_command(directive, "run", command, endpoints, &mut tasks)?;
            }
        }

        tracing::info!(
            kind = directive.action.kind(),
            %mode,
            endpoints = endpoints.len(),
            tasks = tasks.len(),
            "built tasks"
        );
        Ok(tasks)
    }

    /// Expand several directives in order into one sequence.
    pub fn build_all<'a, I>(
        &self,
        directives: I,
        endpoints: &[SharedEndpoint],
        env: &Environment,
    ) -> Result<Vec<Task>, BuildError>
    where
        I: IntoIterator<Item = &'a Directive>,
    {
        let mut tasks = Vec::new();
        for directive in directives {
            tasks.extend(self.build(directive, endpoints, env)?);
        }
        Ok(tasks)
    }

    fn working_dir(&self) -> Result<PathBuf, BuildError> {
        match &self.working_dir {
            Some(dir) => Ok(dir.clone()),
            None => std::env::current_dir().map_err(BuildError::Cwd),
        }
    }

    fn command_body(&self, body: &str) -> String {
        if self.config.debug {
            format!("{}{}", DEBUG_PREFIX, body)
        } else {
            body.to_string()
        }
    }

    fn build_upload(
        &self,
        upload: &Upload,
        mode: GroupMode,
        cwd: &Path,
        endpoints: &[SharedEndpoint],
        env: &Environment,
        tasks: &mut Vec<Task>,
    ) -> Result<(), BuildError> {
        if endpoints.is_empty() {
            return Err(BuildError::NoEndpoints { kind: "upload" });
        }
        for pattern in &upload.exclude {
            glob::Pattern::new(pattern).map_err(|source| BuildError::InvalidExclude {
                src: upload.src.clone(),
                pattern: pattern.clone(),
                source,
            })?;
        }

        let groups = self.group_by_resolved_path(upload, cwd, endpoints, env)?;
        let command = remote_tar_command(&upload.dst);
        let template_for = |group: &PathGroup| TaskTemplate {
            command: command.clone(),
            input: InputSource::Archive(archive_spec(upload, &group.path)),
            tty: false,
        };

        match mode {
            GroupMode::Once => {
                // Groups are in first-seen order, so groups[0] holds endpoint 0.
                let template = template_for(&groups[0]);
                tasks.push(make_batch_task(
                    &template,
                    vec![endpoints[0].clone()],
                    self.archiver.as_ref(),
                )?);
            }
            GroupMode::Serial(_) => {
                if groups.len() > 1 {
                    return Err(BuildError::SerialConflict {
                        src: upload.src.clone(),
                    });
                }
                let template = template_for(&groups[0]);
                for (phase, batch) in group_for(mode, endpoints).into_iter().enumerate() {
                    tracing::debug!(src = %upload.src, phase, size = batch.len(), "upload batch");
                    tasks.push(make_batch_task(&template, batch, self.archiver.as_ref())?);
                }
            }
            GroupMode::AllAtOnce => {
                for group in &groups {
                    let members = group
                        .members
                        .iter()
                        .map(|&i| endpoints[i].clone())
                        .collect();
                    tasks.push(make_batch_task(
                        &template_for(group),
                        members,
                        self.archiver.as_ref(),
                    )?);
                }
            }
        }
        Ok(())
    }

    /// Resolve `upload.src` for every endpoint and bucket endpoints by the
    /// resulting path, keeping buckets in order of first appearance.
    fn group_by_resolved_path(
        &self,
        upload: &Upload,
        cwd: &Path,
        endpoints: &[SharedEndpoint],
        env: &Environment,
    ) -> Result<Vec<PathGroup>, BuildError> {
        let mut groups: Vec<PathGroup> = Vec::new();

        for (i, endpoint) in endpoints.iter().enumerate() {
            let vars = env.layered(endpoint.env());
            let path = self
                .resolver
                .resolve(cwd, &upload.src, &vars)
                .map_err(|source| BuildError::Resolve {
                    src: upload.src.clone(),
                    source,
                })?;

            match groups.iter_mut().find(|g| g.path == path) {
                Some(group) => group.members.push(i),
                None => groups.push(PathGroup {
                    path,
                    members: vec![i],
                }),
            }
        }

        for group in &groups {
            tracing::debug!(
                src = %upload.src,
                path = %group.path.display(),
                endpoints = group.members.len(),
                "resolved upload source"
            );
        }
        Ok(groups)
    }

    fn build_command(
        &self,
        directive: &Directive,
        kind: &'static str,
        body: &str,
        endpoints: &[SharedEndpoint],
        tasks: &mut Vec<Task>,
    ) -> Result<(), BuildError> {
        if endpoints.is_empty() {
            return Err(BuildError::NoEndpoints { kind });
        }
        let template = TaskTemplate {
            command: self.command_body(body),
            input: stdin_source(directive),
            tty: true,
        };
        for (phase, group) in group_for(directive.mode(), endpoints)
            .into_iter()
            .enumerate()
        {
            tracing::debug!(kind, phase, size = group.len(), "command batch");
            tasks.push(make_batch_task(&template, group, self.archiver.as_ref())?);
        }
        Ok(())
    }

    fn build_local(
        &self,
        directive: &Directive,
        command: &str,
        env: &Environment,
    ) -> Result<Task, BuildError> {
        let local_env = env.layered(&Environment::new().with("SUP_HOST", LOCAL_ADDRESS));
        let mut local = LocalhostEndpoint::new(local_env);
        local
            .connect(LOCAL_ADDRESS)
            .map_err(BuildError::LocalConnect)?;

        let template = TaskTemplate {
            command: self.command_body(command),
            input: stdin_source(directive),
            tty: true,
        };
        let endpoint: SharedEndpoint = Arc::new(local);
        make_batch_task(&template, vec![endpoint], self.archiver.as_ref())
    }
}

fn stdin_source(directive: &Directive) -> InputSource {
    if directive.stdin {
        InputSource::Stdin
    } else {
        InputSource::None
    }
}

fn archive_spec(upload: &Upload, path: &Path) -> ArchiveSpec {
    let (base, root) = if upload.is_dir() {
        (path.to_path_buf(), DIR_ROOT.to_string())
    } else {
        split_last_component(path)
    };

    ArchiveSpec {
        src: upload.src.clone(),
        base,
        root,
        exclude: upload.exclude.clone(),
    }
}

/// Split on the last separator of the literal path string. `Path::file_name`
/// skips a trailing `.`, which would turn `/work/.` into `("/", "work")`.
fn split_last_component(path: &Path) -> (PathBuf, String) {
    let text = path.to_string_lossy();
    match text.rsplit_once('/') {
        Some((_, "")) => (path.to_path_buf(), DIR_ROOT.to_string()),
        Some(("", name)) => (PathBuf::from("/"), name.to_string()),
        Some((dir, name)) => (PathBuf::from(dir), name.to_string()),
        None => (PathBuf::from(DIR_ROOT), text.into_owned()),
    }
}

fn read_script(path: &Path) -> Result<String, BuildError> {
    let mut file = std::fs::File::open(path).map_err(|source| BuildError::ScriptOpen {
        path: path.to_path_buf(),
        source,
    })?;
    let mut data = Vec::new();
    file.read_to_end(&mut data)
        .map_err(|source| BuildError::ScriptRead {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(String::from_utf8_lossy(&data).into_owned())
}
