use std::io::Write;

use anyhow::Context;
use fanout_core::config::Planfile;
use fanout_core::endpoint::Environment;
use fanout_core::plan::{BuilderConfig, Task, TaskBuilder, TaskSummary};
use serde::Serialize;

use crate::error::CliError;

use super::cli::{OutputFormat, PlanArgs};

#[derive(Debug, Serialize)]
struct PlanLine<'a> {
    index: usize,
    #[serde(flatten)]
    task: &'a TaskSummary,
}

/// Build every requested command against the network and print the plan.
pub fn run(
    planfile: &Planfile,
    args: &PlanArgs,
    extra_env: &Environment,
    debug: bool,
    out: &mut dyn Write,
) -> Result<i32, CliError> {
    let network = planfile.network(&args.network)?;
    let endpoints = network.endpoints(&args.network)?;
    let env = planfile.shared_env(&args.network).layered(extra_env);

    let mut directives = Vec::new();
    for name in &args.commands {
        directives.extend(planfile.command(name)?.directives());
    }

    let builder = TaskBuilder::new(BuilderConfig { debug });
    let tasks = builder.build_all(&directives, &endpoints, &env)?;
    tracing::info!(
        network = %args.network,
        commands = args.commands.len(),
        tasks = tasks.len(),
        "plan ready"
    );

    render(&tasks, args.format, out)?;
    Ok(0)
}

fn render(tasks: &[Task], format: OutputFormat, out: &mut dyn Write) -> Result<(), CliError> {
    for (index, task) in tasks.iter().enumerate() {
        let summary = task.summary();
        match format {
            OutputFormat::Jsonl => {
                let line = serde_json::to_string(&PlanLine {
                    index,
                    task: &summary,
                })
                .with_context(|| format!("encoding task {}", index))?;
                writeln!(out, "{}", line)?;
            }
            OutputFormat::Text => write_text(out, index, &summary)?,
        }
    }
    Ok(())
}

fn write_text(out: &mut dyn Write, index: usize, summary: &TaskSummary) -> std::io::Result<()> {
    let mut lines = summary.command.lines();
    let first = lines.next().unwrap_or_default();
    let rest = lines.count();

    write!(out, "[{}] {}", index, first)?;
    if rest > 0 {
        write!(out, " (+{} lines)", rest)?;
    }
    writeln!(
        out,
        "  input={} tty={}",
        summary.input,
        if summary.tty { "yes" } else { "no" }
    )?;
    writeln!(out, "    {}", summary.endpoints.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    const PLANFILE: &str = r#"
[networks.prod]
hosts = ["deploy@web1", "deploy@web2", "deploy@web3"]

[commands.restart]
run = "systemctl restart shop"
serial = 2

[commands.notify]
local = "echo done"
"#;

    fn plan(commands: &[&str], format: OutputFormat, debug: bool) -> String {
        let planfile = Planfile::parse(PLANFILE, Path::new("fanout.toml")).unwrap();
        let args = PlanArgs {
            network: "prod".to_string(),
            commands: commands.iter().map(|c| c.to_string()).collect(),
            format,
        };
        let mut out = Vec::new();
        run(&planfile, &args, &Environment::new(), debug, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn text_plan_lists_batches_in_order() {
        let text = plan(&["restart", "notify"], OutputFormat::Text, false);
        assert_eq!(
            text,
            "[0] systemctl restart shop  input=none tty=yes\n    deploy@web1, deploy@web2\n\
             [1] systemctl restart shop  input=none tty=yes\n    deploy@web3\n\
             [2] echo done  input=none tty=yes\n    localhost\n"
        );
    }

    #[test]
    fn jsonl_plan_has_one_object_per_task() {
        let text = plan(&["restart"], OutputFormat::Jsonl, true);
        let lines: Vec<serde_json::Value> = text
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["index"], 0);
        assert_eq!(lines[0]["command"], "set -x;systemctl restart shop");
        assert_eq!(lines[1]["endpoints"], serde_json::json!(["deploy@web3"]));
        assert_eq!(lines[1]["input"], "none");
    }

    #[test]
    fn unknown_command_is_a_config_error() {
        let planfile = Planfile::parse(PLANFILE, Path::new("fanout.toml")).unwrap();
        let args = PlanArgs {
            network: "prod".to_string(),
            commands: vec!["rollback".to_string()],
            format: OutputFormat::Text,
        };
        let err = run(&planfile, &args, &Environment::new(), false, &mut Vec::new()).unwrap_err();
        assert!(matches!(err, CliError::Config(_)));
    }
}
