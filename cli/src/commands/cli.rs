use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Jsonl,
}

#[derive(Parser, Debug)]
#[command(name = "fanout", version, about = "Plan commands across networks of hosts")]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Planfile describing networks and commands.
    #[arg(short, long, default_value = "fanout.toml", global = true)]
    pub file: PathBuf,

    /// Prefix planned commands with `set -x;`.
    #[arg(long, global = true)]
    pub debug: bool,

    /// Extra environment binding (KEY=VALUE), applied after the planfile env.
    /// Can be specified multiple times.
    #[arg(short = 'e', long = "env", action = clap::ArgAction::Append, global = true)]
    pub env: Vec<String>,

    /// Dotenv-style file loaded before any `--env` bindings.
    #[arg(long, global = true)]
    pub env_file: Option<String>,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct PlanArgs {
    /// Network to plan against.
    pub network: String,

    /// Commands to plan, in order.
    #[arg(required = true)]
    pub commands: Vec<String>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the task plan for one or more commands.
    Plan(PlanArgs),
    /// List networks and commands from the planfile.
    List,
}

impl Commands {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Plan(_) => "plan",
            Self::List => "list",
        }
    }
}
