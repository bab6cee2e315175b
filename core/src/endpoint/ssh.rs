use std::process::Command;

use crate::error::EndpointError;

use super::process::run_with_input;
use super::{Endpoint, Environment, InputReader};

const DEFAULT_PORT: u16 = 22;

/// Remote endpoint reached through the system `ssh` client.
///
/// `ssh` opens its own session per command, so `connect` only validates and
/// records the address.
#[derive(Debug, Clone)]
pub struct SshEndpoint {
    address: String,
    user: Option<String>,
    host: String,
    port: u16,
    env: Environment,
    connected: bool,
}

impl SshEndpoint {
    /// Parse `[user@]host[:port]`. `SUP_HOST` is bound to the host on top of
    /// the supplied environment.
    pub fn parse(address: &str, env: Environment) -> Result<Self, EndpointError> {
        let (user, host, port) = split_address(address)?;
        let env = env.with("SUP_HOST", host.clone());
        Ok(Self {
            address: address.to_string(),
            user,
            host,
            port,
            env,
            connected: false,
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    fn destination(&self) -> String {
        match &self.user {
            Some(user) => format!("{}@{}", user, self.host),
            None => self.host.clone(),
        }
    }

    fn build_ssh_args(&self, command: &str, tty: bool) -> Vec<String> {
        let mut args = Vec::new();

        if self.port != DEFAULT_PORT {
            args.push("-p".to_string());
            args.push(self.port.to_string());
        }

        if tty {
            args.push("-t".to_string());
        } else {
            args.extend([
                "-o".to_string(),
                "BatchMode=yes".to_string(),
                "-o".to_string(),
                "ConnectTimeout=10".to_string(),
            ]);
        }

        args.push(self.destination());
        args.push(format!("{}{}", self.env.to_export_prefix(), command));
        args
    }
}

fn split_address(address: &str) -> Result<(Option<String>, String, u16), EndpointError> {
    let invalid = || EndpointError::InvalidAddress(address.to_string());
    let trimmed = address.trim();

    let (user, rest) = match trimmed.split_once('@') {
        Some((user, rest)) if !user.is_empty() => (Some(user.to_string()), rest),
        Some(_) => return Err(invalid()),
        None => (None, trimmed),
    };

    let (host, port) = match rest.rsplit_once(':') {
        Some((host, port)) => (host, port.parse::<u16>().map_err(|_| invalid())?),
        None => (rest, DEFAULT_PORT),
    };

    if host.is_empty() || host.contains(char::is_whitespace) {
        return Err(invalid());
    }

    Ok((user, host.to_string(), port))
}

impl Endpoint for SshEndpoint {
    fn name(&self) -> &str {
        &self.address
    }

    fn env(&self) -> &Environment {
        &self.env
    }

    fn connect(&mut self, address: &str) -> Result<(), EndpointError> {
        let (user, host, port) = split_address(address)?;
        if host != self.host {
            self.env.set("SUP_HOST", host.clone());
        }
        self.user = user;
        self.host = host;
        self.port = port;
        self.address = address.to_string();
        self.connected = true;
        Ok(())
    }

    fn run(
        &self,
        command: &str,
        input: Option<InputReader>,
        tty: bool,
    ) -> Result<i32, EndpointError> {
        if !self.connected {
            return Err(EndpointError::NotConnected(self.address.clone()));
        }

        let mut cmd = Command::new("ssh");
        cmd.args(self.build_ssh_args(command, tty));

        tracing::debug!(endpoint = %self.address, tty, "running remote command");
        run_with_input(cmd, input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_user_host_and_port() {
        let ep = SshEndpoint::parse("deploy@web1:2222", Environment::new()).unwrap();
        assert_eq!(ep.user(), Some("deploy"));
        assert_eq!(ep.host(), "web1");
        assert_eq!(ep.port(), 2222);
        assert_eq!(ep.name(), "deploy@web1:2222");
        assert_eq!(ep.env().get("SUP_HOST"), Some("web1"));
    }

    #[test]
    fn bare_host_uses_default_port() {
        let ep = SshEndpoint::parse("web2", Environment::new()).unwrap();
        assert_eq!(ep.user(), None);
        assert_eq!(ep.port(), 22);
    }

    #[test]
    fn rejects_malformed_addresses() {
        for addr in ["", "@web1", "web1:notaport", "deploy@", "web 1"] {
            assert!(
                SshEndpoint::parse(addr, Environment::new()).is_err(),
                "expected {addr:?} to be rejected"
            );
        }
    }

    #[test]
    fn ssh_args_carry_port_tty_and_exports() {
        let env = Environment::new().with("STAGE", "prod");
        let ep = SshEndpoint::parse("deploy@web1:2222", env).unwrap();

        let args = ep.build_ssh_args("uptime", true);
        assert_eq!(
            args,
            vec![
                "-p".to_string(),
                "2222".to_string(),
                "-t".to_string(),
                "deploy@web1".to_string(),
                "export STAGE=\"prod\";export SUP_HOST=\"web1\";uptime".to_string(),
            ]
        );

        let batch = ep.build_ssh_args("uptime", false);
        assert!(batch.contains(&"BatchMode=yes".to_string()));
        assert!(!batch.contains(&"-t".to_string()));
    }

    #[test]
    fn run_before_connect_fails() {
        let ep = SshEndpoint::parse("web1", Environment::new()).unwrap();
        assert!(matches!(
            ep.run("uptime", None, false),
            Err(EndpointError::NotConnected(_))
        ));
    }
}
