use std::io::{self, Read};
use std::path::Path;
use std::process::{Child, ChildStdout, Command, Stdio};

use super::{ArchiveStream, ArchiveStreamBuilder};

/// Builds gzip'd tar streams with the system `tar`.
#[derive(Debug, Clone)]
pub struct TarArchiver {
    program: String,
}

impl Default for TarArchiver {
    fn default() -> Self {
        Self {
            program: "tar".to_string(),
        }
    }
}

impl TarArchiver {
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn args(base: &Path, root: &str, exclude: &[String]) -> Vec<String> {
        let mut args = vec![
            "-C".to_string(),
            base.to_string_lossy().into_owned(),
            "-czf".to_string(),
            "-".to_string(),
        ];
        args.extend(exclude.iter().map(|pattern| format!("--exclude={}", pattern)));
        args.push(root.to_string());
        args
    }
}

impl ArchiveStreamBuilder for TarArchiver {
    fn build(&self, base: &Path, root: &str, exclude: &[String]) -> io::Result<ArchiveStream> {
        let mut cmd = Command::new(&self.program);
        cmd.args(Self::args(base, root, exclude));
        Ok(Box::new(LazyTarStream::new(cmd)))
    }
}

/// Archive stream that only spawns `tar` on the first read.
///
/// Building a plan therefore never touches the filesystem; a non-zero `tar`
/// exit surfaces as an I/O error at end of stream.
#[derive(Debug)]
pub struct LazyTarStream {
    command: Option<Command>,
    child: Option<Child>,
    stdout: Option<ChildStdout>,
}

impl LazyTarStream {
    pub fn new(command: Command) -> Self {
        Self {
            command: Some(command),
            child: None,
            stdout: None,
        }
    }

    pub fn is_started(&self) -> bool {
        self.command.is_none()
    }

    fn start(&mut self) -> io::Result<()> {
        let Some(mut cmd) = self.command.take() else {
            return Ok(());
        };
        let mut child = cmd
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()?;
        self.stdout = child.stdout.take();
        self.child = Some(child);
        Ok(())
    }

    fn finish(&mut self) -> io::Result<()> {
        self.stdout = None;
        if let Some(mut child) = self.child.take() {
            let status = child.wait()?;
            if !status.success() {
                return Err(io::Error::new(
                    io::ErrorKind::Other,
                    format!("tar exited with {}", status),
                ));
            }
        }
        Ok(())
    }
}

impl Read for LazyTarStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.start()?;
        let n = match self.stdout.as_mut() {
            Some(out) => out.read(buf)?,
            None => 0,
        };
        if n == 0 && !buf.is_empty() {
            self.finish()?;
        }
        Ok(n)
    }
}

impl Drop for LazyTarStream {
    fn drop(&mut self) {
        // Unread archives still need their tar process reaped.
        self.stdout = None;
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn args_put_excludes_before_root() {
        let args = TarArchiver::args(
            Path::new("/work/dist"),
            "app",
            &["*.log".to_string(), ".git".to_string()],
        );
        assert_eq!(
            args,
            vec!["-C", "/work/dist", "-czf", "-", "--exclude=*.log", "--exclude=.git", "app"]
        );
    }

    #[test]
    fn stream_is_lazy_until_read() {
        let stream = LazyTarStream::new(Command::new("definitely-not-a-real-tar-binary"));
        assert!(!stream.is_started());
    }

    #[test]
    fn spawn_failure_surfaces_on_read() {
        let mut stream = LazyTarStream::new(Command::new("definitely-not-a-real-tar-binary"));
        let mut buf = [0u8; 16];
        assert!(stream.read(&mut buf).is_err());
        assert!(stream.is_started());
    }

    #[cfg(unix)]
    #[test]
    fn archives_a_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("app")).unwrap();
        std::fs::write(dir.path().join("app/index.html"), "hello").unwrap();

        let mut stream = TarArchiver::default()
            .build(dir.path(), "app", &[])
            .unwrap();
        let mut bytes = Vec::new();
        stream.read_to_end(&mut bytes).unwrap();

        // gzip magic
        assert_eq!(&bytes[..2], &[0x1f, 0x8b]);
    }
}
