use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::grouping::GroupMode;

/// One upload: a local source template, a remote destination, and tar
/// exclusion patterns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Upload {
    pub src: String,
    pub dst: String,
    #[serde(default, alias = "exc")]
    pub exclude: Vec<String>,
}

impl Upload {
    pub fn new(src: impl Into<String>, dst: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            dst: dst.into(),
            exclude: Vec::new(),
        }
    }

    pub fn excluding(mut self, pattern: impl Into<String>) -> Self {
        self.exclude.push(pattern.into());
        self
    }

    /// A trailing separator uploads the directory contents rather than the
    /// directory itself.
    pub fn is_dir(&self) -> bool {
        self.src.ends_with('/')
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Upload(Vec<Upload>),
    /// Local file whose contents become a multi-line remote command.
    Script(PathBuf),
    /// Command run once on a synthetic localhost endpoint.
    Local(String),
    /// Command run on the remote endpoints.
    Run(String),
}

impl Action {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Upload(_) => "upload",
            Self::Script(_) => "script",
            Self::Local(_) => "local",
            Self::Run(_) => "run",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    pub action: Action,
    pub once: bool,
    /// Batch size; 0 means unbounded.
    pub serial: usize,
    /// Wire the caller's stdin into the task.
    pub stdin: bool,
}

impl Directive {
    pub fn new(action: Action) -> Self {
        Self {
            action,
            once: false,
            serial: 0,
            stdin: false,
        }
    }

    pub fn run(command: impl Into<String>) -> Self {
        Self::new(Action::Run(command.into()))
    }

    pub fn local(command: impl Into<String>) -> Self {
        Self::new(Action::Local(command.into()))
    }

    pub fn script(path: impl Into<PathBuf>) -> Self {
        Self::new(Action::Script(path.into()))
    }

    pub fn upload(uploads: Vec<Upload>) -> Self {
        Self::new(Action::Upload(uploads))
    }

    pub fn once(mut self, once: bool) -> Self {
        self.once = once;
        self
    }

    pub fn serial(mut self, serial: usize) -> Self {
        self.serial = serial;
        self
    }

    pub fn stdin(mut self, stdin: bool) -> Self {
        self.stdin = stdin;
        self
    }

    pub fn mode(&self) -> GroupMode {
        GroupMode::from_flags(self.once, self.serial)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_means_directory() {
        assert!(Upload::new("dist/", "/srv").is_dir());
        assert!(!Upload::new("dist", "/srv").is_dir());
    }

    #[test]
    fn upload_accepts_short_exclude_key() {
        let upload: Upload =
            toml::from_str("src = \"dist/\"\ndst = \"/srv\"\nexc = [\"*.map\"]").unwrap();
        assert_eq!(upload, Upload::new("dist/", "/srv").excluding("*.map"));
    }

    #[test]
    fn mode_follows_modifiers() {
        assert_eq!(Directive::run("uptime").mode(), GroupMode::AllAtOnce);
        assert_eq!(Directive::run("uptime").serial(2).once(true).mode(), GroupMode::Once);
        assert!(matches!(
            Directive::run("uptime").serial(2).mode(),
            GroupMode::Serial(n) if n.get() == 2
        ));
    }
}
