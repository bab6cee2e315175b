use clap::Parser;
mod commands;
mod error;
mod utils;
use commands::cli;
use error::{exit_code_for_error, CliError};
use fanout_core::config::{LogOutput, LoggingConfig, Planfile};
use fanout_core::endpoint::Environment;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

static LOG_GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
    std::sync::OnceLock::new();

fn main() {
    let exit = match real_main() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{e}");
            exit_code_for_error(&e)
        }
    };

    std::process::exit(exit);
}

fn real_main() -> Result<i32, CliError> {
    let args = cli::Args::parse();
    let cfg = fanout_core::config::load_default()?;
    let debug = args.debug || cfg.debug;
    init_tracing(&cfg.logging, debug, args.command.name()).map_err(CliError::Logging)?;

    let extra_env = collect_env(args.env_file.as_deref(), &args.env)?;
    let planfile = Planfile::load(&args.file)?;
    let debug_enabled = debug;
    tracing::debug!(file = %args.file.display(), debug = debug_enabled, "planfile loaded");

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match &args.command {
        cli::Commands::Plan(plan_args) => {
            commands::plan::run(&planfile, plan_args, &extra_env, debug, &mut out)
        }
        cli::Commands::List => commands::list::run(&planfile, &mut out),
    }
}

/// `--env-file` bindings first, then each `--env` in order.
fn collect_env(env_file: Option<&str>, bindings: &[String]) -> Result<Environment, CliError> {
    let mut env = match env_file {
        Some(path) => utils::parse_env_file(path)?,
        None => Environment::new(),
    };
    for raw in bindings {
        let (key, value) = utils::parse_env_binding(raw)?;
        env.set(key, value);
    }
    Ok(env)
}

/// Install the subscriber. `RUST_LOG` overrides the configured filter; the
/// log file is named after the subcommand so `plan` and `list` runs are easy
/// to tell apart.
fn init_tracing(logging: &LoggingConfig, debug: bool, command: &str) -> Result<(), String> {
    if logging.output == LogOutput::Off {
        return Ok(());
    }

    let filter = match std::env::var("RUST_LOG") {
        Ok(v) if !v.trim().is_empty() => EnvFilter::from_default_env(),
        _ => EnvFilter::try_new(logging.filter_directive(debug)).map_err(|e| e.to_string())?,
    };

    let file_layer = if logging.output.to_file() {
        let dir = logging.log_dir();
        std::fs::create_dir_all(&dir)
            .map_err(|e| format!("create log dir {} failed: {e}", dir.display()))?;
        let appender = tracing_appender::rolling::never(&dir, log_file_name(command));
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let _ = LOG_GUARD.set(guard);
        Some(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false),
        )
    } else {
        None
    };

    let stderr_layer = logging.output.to_stderr().then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(debug)
            .with_ansi(atty::is(atty::Stream::Stderr))
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    Ok(())
}

fn log_file_name(command: &str) -> String {
    format!("fanout-{}-{}.log", command, std::process::id())
}
