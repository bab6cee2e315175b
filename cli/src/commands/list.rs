use std::io::Write;

use fanout_core::config::Planfile;

use crate::error::CliError;

pub fn run(planfile: &Planfile, out: &mut dyn Write) -> Result<i32, CliError> {
    writeln!(out, "Networks:")?;
    for (name, network) in &planfile.networks {
        writeln!(out, "  {:<16} {} hosts", name, network.hosts.len())?;
    }

    writeln!(out)?;
    writeln!(out, "Commands:")?;
    for (name, cmd) in &planfile.commands {
        match cmd.desc.as_deref() {
            Some(desc) => writeln!(out, "  {:<16} {}", name, desc)?,
            None => writeln!(out, "  {}", name)?,
        }
    }
    Ok(0)
}
