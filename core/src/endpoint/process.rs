use std::io;
use std::process::{Command, Stdio};
use std::thread;

use crate::error::EndpointError;

use super::InputReader;

/// Spawn `cmd`, pump `input` into its stdin on a helper thread, and wait.
///
/// stdout/stderr are inherited. A signal-terminated child reports `-1`.
/// Returns as soon as the child exits, even if `input` has not hit EOF.
pub(crate) fn run_with_input(
    mut cmd: Command,
    input: Option<InputReader>,
) -> Result<i32, EndpointError> {
    cmd.stdin(if input.is_some() {
        Stdio::piped()
    } else {
        Stdio::inherit()
    });

    let mut child = cmd.spawn().map_err(EndpointError::Spawn)?;

    let writer = match (input, child.stdin.take()) {
        (Some(mut rd), Some(mut stdin)) => Some(thread::spawn(move || -> io::Result<u64> {
            let copied = io::copy(&mut rd, &mut stdin);
            // Closing stdin lets the child see EOF.
            drop(stdin);
            match copied {
                Err(e) if e.kind() == io::ErrorKind::BrokenPipe => Ok(0),
                other => other,
            }
        })),
        _ => None,
    };

    let status = child.wait()?;

    if let Some(handle) = writer {
        if !handle.is_finished() {
            // The child is gone; the pump may be parked on an input (e.g. a
            // terminal) that never reaches EOF. Leave it detached.
            tracing::trace!("stdin pump still blocked after exit, detaching");
            return Ok(status.code().unwrap_or(-1));
        }
        match handle.join() {
            Ok(res) => {
                let copied = res?;
                tracing::trace!(bytes = copied, "stdin pump finished");
            }
            Err(_) => {
                return Err(EndpointError::Io(io::Error::new(
                    io::ErrorKind::Other,
                    "stdin pump panicked",
                )))
            }
        }
    }

    Ok(status.code().unwrap_or(-1))
}
