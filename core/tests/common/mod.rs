#![allow(dead_code)]

use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use fanout_core::endpoint::{Endpoint, Environment, InputReader, SharedEndpoint};
use fanout_core::error::{EndpointError, ResolveError};
use fanout_core::plan::{BuilderConfig, Task, TaskBuilder};
use fanout_core::resolve::{ArchiveStream, ArchiveStreamBuilder, PathResolver};

/// Endpoint that records what it was asked to run.
#[derive(Debug)]
pub struct FakeEndpoint {
    name: String,
    env: Environment,
    pub ran: Mutex<Vec<(String, Vec<u8>, bool)>>,
}

impl FakeEndpoint {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            env: Environment::new().with("SUP_HOST", name),
            ran: Mutex::new(Vec::new()),
        }
    }

    pub fn with_var(mut self, key: &str, value: &str) -> Self {
        self.env.set(key, value);
        self
    }
}

impl Endpoint for FakeEndpoint {
    fn name(&self) -> &str {
        &self.name
    }

    fn env(&self) -> &Environment {
        &self.env
    }

    fn connect(&mut self, _address: &str) -> Result<(), EndpointError> {
        Ok(())
    }

    fn run(
        &self,
        command: &str,
        input: Option<InputReader>,
        tty: bool,
    ) -> Result<i32, EndpointError> {
        let mut bytes = Vec::new();
        if let Some(mut rd) = input {
            rd.read_to_end(&mut bytes)?;
        }
        self.ran
            .lock()
            .unwrap()
            .push((command.to_string(), bytes, tty));
        Ok(0)
    }
}

pub fn endpoints(n: usize) -> Vec<SharedEndpoint> {
    (0..n)
        .map(|i| Arc::new(FakeEndpoint::new(&format!("host{}", i))) as SharedEndpoint)
        .collect()
}

/// Substitutes `$NAME` tokens from the environment; errors on unknown names.
pub struct TemplateResolver;

impl PathResolver for TemplateResolver {
    fn resolve(
        &self,
        cwd: &Path,
        template: &str,
        env: &Environment,
    ) -> Result<PathBuf, ResolveError> {
        let mut out = String::new();
        for (i, part) in template.split('$').enumerate() {
            if i == 0 {
                out.push_str(part);
                continue;
            }
            let end = part
                .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
                .unwrap_or(part.len());
            let (var, rest) = part.split_at(end);
            let value = env.get(var).ok_or_else(|| ResolveError::Undefined {
                var: var.to_string(),
            })?;
            out.push_str(value);
            out.push_str(rest);
        }
        Ok(cwd.join(out.trim_end_matches('/')))
    }
}

/// Archiver whose stream is the "base|root" pair, so tests can see which
/// payload each task carries.
#[derive(Default)]
pub struct EchoArchiver {
    pub built: Mutex<usize>,
}

impl ArchiveStreamBuilder for EchoArchiver {
    fn build(&self, base: &Path, root: &str, _exclude: &[String]) -> io::Result<ArchiveStream> {
        *self.built.lock().unwrap() += 1;
        let payload = format!("{}|{}", base.display(), root);
        Ok(Box::new(io::Cursor::new(payload.into_bytes())))
    }
}

pub fn builder(debug: bool) -> (TaskBuilder, Arc<EchoArchiver>) {
    let archiver = Arc::new(EchoArchiver::default());
    let builder = TaskBuilder::new(BuilderConfig { debug })
        .with_resolver(Arc::new(TemplateResolver))
        .with_archiver(archiver.clone())
        .with_working_dir("/work");
    (builder, archiver)
}

pub fn endpoint_names(task: &Task) -> Vec<String> {
    task.endpoints()
        .iter()
        .map(|e| e.name().to_string())
        .collect()
}
