use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

use crate::endpoint::{InputReader, SharedEndpoint};
use crate::error::BuildError;
use crate::resolve::{ArchiveStream, ArchiveStreamBuilder};

/// Archive root used when a whole directory's contents are uploaded.
pub const DIR_ROOT: &str = ".";

/// Input bound to a task. Consumed by exactly one executor, once.
pub enum TaskInput {
    /// The caller's standard input.
    Stdin,
    Archive(ArchiveStream),
}

impl TaskInput {
    pub fn kind(&self) -> TaskInputKind {
        match self {
            Self::Stdin => TaskInputKind::Stdin,
            Self::Archive(_) => TaskInputKind::Archive,
        }
    }

    pub fn into_reader(self) -> InputReader {
        match self {
            Self::Stdin => Box::new(std::io::stdin()),
            Self::Archive(stream) => stream,
        }
    }
}

impl fmt::Debug for TaskInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stdin => f.write_str("Stdin"),
            Self::Archive(_) => f.write_str("Archive(..)"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskInputKind {
    None,
    Stdin,
    Archive,
}

impl fmt::Display for TaskInputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("none"),
            Self::Stdin => f.write_str("stdin"),
            Self::Archive => f.write_str("archive"),
        }
    }
}

/// One endpoint-bound unit of work. Immutable once built.
#[derive(Debug)]
pub struct Task {
    command: String,
    input: Option<TaskInput>,
    endpoints: Vec<SharedEndpoint>,
    tty: bool,
}

/// A task taken apart by its executor.
#[derive(Debug)]
pub struct TaskParts {
    pub command: String,
    pub input: Option<TaskInput>,
    pub endpoints: Vec<SharedEndpoint>,
    pub tty: bool,
}

impl Task {
    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn input_kind(&self) -> TaskInputKind {
        self.input
            .as_ref()
            .map_or(TaskInputKind::None, TaskInput::kind)
    }

    pub fn endpoints(&self) -> &[SharedEndpoint] {
        &self.endpoints
    }

    pub fn tty(&self) -> bool {
        self.tty
    }

    pub fn summary(&self) -> TaskSummary {
        TaskSummary {
            command: self.command.clone(),
            endpoints: self
                .endpoints
                .iter()
                .map(|ep| ep.name().to_string())
                .collect(),
            tty: self.tty,
            input: self.input_kind(),
        }
    }

    /// Consume the task; the input stream can only be taken this way.
    pub fn into_parts(self) -> TaskParts {
        TaskParts {
            command: self.command,
            input: self.input,
            endpoints: self.endpoints,
            tty: self.tty,
        }
    }
}

/// Serializable view of a task, for plan rendering and error reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskSummary {
    pub command: String,
    pub endpoints: Vec<String>,
    pub tty: bool,
    pub input: TaskInputKind,
}

/// Where a task's input comes from. Materialised once per emitted task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    None,
    Stdin,
    Archive(ArchiveSpec),
}

/// Upload payload: `root` archived relative to `base`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveSpec {
    /// Upload source template, kept for error context.
    pub src: String,
    pub base: PathBuf,
    pub root: String,
    pub exclude: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskTemplate {
    pub command: String,
    pub input: InputSource,
    pub tty: bool,
}

/// Build a fresh task for one endpoint group. Archive inputs get their own
/// stream, so batches never share a reader.
pub fn make_batch_task(
    template: &TaskTemplate,
    group: Vec<SharedEndpoint>,
    archiver: &dyn ArchiveStreamBuilder,
) -> Result<Task, BuildError> {
    let input = match &template.input {
        InputSource::None => None,
        InputSource::Stdin => Some(TaskInput::Stdin),
        InputSource::Archive(spec) => {
            let stream = archiver
                .build(&spec.base, &spec.root, &spec.exclude)
                .map_err(|source| BuildError::Archive {
                    src: spec.src.clone(),
                    source,
                })?;
            Some(TaskInput::Archive(stream))
        }
    };

    Ok(Task {
        command: template.command.clone(),
        input,
        endpoints: group,
        tty: template.tty,
    })
}
