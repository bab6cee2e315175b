use std::process::Command;

use crate::error::EndpointError;

use super::process::run_with_input;
use super::{Endpoint, Environment, InputReader};

/// Synthetic endpoint that runs commands on this machine through `bash -c`.
#[derive(Debug, Clone)]
pub struct LocalhostEndpoint {
    env: Environment,
    address: Option<String>,
}

impl LocalhostEndpoint {
    pub fn new(env: Environment) -> Self {
        Self { env, address: None }
    }

    pub fn is_connected(&self) -> bool {
        self.address.is_some()
    }
}

impl Endpoint for LocalhostEndpoint {
    fn name(&self) -> &str {
        self.address.as_deref().unwrap_or("localhost")
    }

    fn env(&self) -> &Environment {
        &self.env
    }

    fn connect(&mut self, address: &str) -> Result<(), EndpointError> {
        if address.trim().is_empty() {
            return Err(EndpointError::InvalidAddress(address.to_string()));
        }
        self.address = Some(address.to_string());
        Ok(())
    }

    fn run(
        &self,
        command: &str,
        input: Option<InputReader>,
        _tty: bool,
    ) -> Result<i32, EndpointError> {
        if !self.is_connected() {
            return Err(EndpointError::NotConnected(self.name().to_string()));
        }

        let mut cmd = Command::new("bash");
        cmd.arg("-c")
            .arg(format!("{}{}", self.env.to_export_prefix(), command));

        tracing::debug!(endpoint = self.name(), "running local command");
        run_with_input(cmd, input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connect_sets_name() {
        let mut local = LocalhostEndpoint::new(Environment::new());
        assert!(!local.is_connected());

        local.connect("localhost").unwrap();
        assert!(local.is_connected());
        assert_eq!(local.name(), "localhost");
    }

    #[test]
    fn connect_rejects_blank_address() {
        let mut local = LocalhostEndpoint::new(Environment::new());
        assert!(matches!(
            local.connect("  "),
            Err(EndpointError::InvalidAddress(_))
        ));
    }

    #[test]
    fn run_requires_connect() {
        let local = LocalhostEndpoint::new(Environment::new());
        assert!(matches!(
            local.run("true", None, false),
            Err(EndpointError::NotConnected(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn run_exports_environment_and_reports_exit_code() {
        let env = Environment::new().with("SUP_HOST", "localhost");
        let mut local = LocalhostEndpoint::new(env);
        local.connect("localhost").unwrap();

        let code = local
            .run("test \"$SUP_HOST\" = localhost && exit 3", None, false)
            .unwrap();
        assert_eq!(code, 3);
    }

    #[cfg(unix)]
    #[test]
    fn run_feeds_input_to_stdin() {
        let mut local = LocalhostEndpoint::new(Environment::new());
        local.connect("localhost").unwrap();

        let input: InputReader = Box::new(std::io::Cursor::new(b"ping\n".to_vec()));
        let code = local
            .run("read line; test \"$line\" = ping", Some(input), false)
            .unwrap();
        assert_eq!(code, 0);
    }
}
