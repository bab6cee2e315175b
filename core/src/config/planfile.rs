use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::endpoint::{Environment, SharedEndpoint, SshEndpoint};
use crate::error::ConfigError;
use crate::plan::{Action, Directive, Upload};

/// Project file describing networks of hosts and the commands to plan
/// against them.
///
/// ```toml
/// [env]
/// APP = "shop"
///
/// [networks.prod]
/// hosts = ["deploy@web1", "deploy@web2:2222"]
/// env = { STAGE = "prod" }
///
/// [commands.deploy]
/// upload = [{ src = "dist/", dst = "/srv/shop" }]
/// serial = 1
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Planfile {
    #[serde(default)]
    pub env: Environment,

    #[serde(default)]
    pub networks: BTreeMap<String, Network>,

    #[serde(default)]
    pub commands: BTreeMap<String, CommandConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Network {
    #[serde(default)]
    pub hosts: Vec<String>,

    #[serde(default)]
    pub env: Environment,
}

/// Command as written in the planfile: any combination of the four actions
/// plus shared modifiers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandConfig {
    #[serde(default)]
    pub desc: Option<String>,

    #[serde(default)]
    pub upload: Vec<Upload>,

    #[serde(default)]
    pub script: Option<PathBuf>,

    #[serde(default)]
    pub local: Option<String>,

    #[serde(default)]
    pub run: Option<String>,

    #[serde(default)]
    pub once: bool,

    #[serde(default)]
    pub serial: usize,

    #[serde(default)]
    pub stdin: bool,
}

impl Planfile {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let s = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&s, path)
    }

    pub fn parse(s: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str::<Planfile>(s).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn network(&self, name: &str) -> Result<&Network, ConfigError> {
        self.networks
            .get(name)
            .ok_or_else(|| ConfigError::UnknownNetwork(name.to_string()))
    }

    pub fn command(&self, name: &str) -> Result<&CommandConfig, ConfigError> {
        self.commands
            .get(name)
            .ok_or_else(|| ConfigError::UnknownCommand(name.to_string()))
    }

    /// Shared environment for a run against `network`: the planfile env with
    /// `SUP_NETWORK` bound last.
    pub fn shared_env(&self, network: &str) -> Environment {
        self.env.clone().with("SUP_NETWORK", network)
    }
}

impl Network {
    /// One SSH endpoint per host, each carrying the network env.
    pub fn endpoints(&self, name: &str) -> Result<Vec<SharedEndpoint>, ConfigError> {
        self.hosts
            .iter()
            .map(|host| {
                SshEndpoint::parse(host, self.env.clone())
                    .map(|ep| Arc::new(ep) as SharedEndpoint)
                    .map_err(|source| ConfigError::Endpoint {
                        network: name.to_string(),
                        source,
                    })
            })
            .collect()
    }
}

impl CommandConfig {
    /// Directives in execution order: upload, script, local, run.
    pub fn directives(&self) -> Vec<Directive> {
        let mut actions = Vec::new();
        if !self.upload.is_empty() {
            actions.push(Action::Upload(self.upload.clone()));
        }
        if let Some(script) = self.script.as_ref().filter(|s| !s.as_os_str().is_empty()) {
            actions.push(Action::Script(script.clone()));
        }
        if let Some(local) = self.local.as_ref().filter(|s| !s.is_empty()) {
            actions.push(Action::Local(local.clone()));
        }
        if let Some(run) = self.run.as_ref().filter(|s| !s.is_empty()) {
            actions.push(Action::Run(run.clone()));
        }

        actions
            .into_iter()
            .map(|action| Directive {
                action,
                once: self.once,
                serial: self.serial,
                stdin: self.stdin,
            })
            .collect()
    }
}
