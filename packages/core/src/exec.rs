//! Plan execution
//!
//! Runs a distribution plan's invocations as external processes, strictly in
//! sequence. The first failure aborts the whole run; nothing is retried and
//! nothing rolls back.

use std::io::ErrorKind;
use std::process::Stdio;

use thiserror::Error;

use crate::plan::{CommandPair, Invocation};

/// Errors that can occur while executing a plan
#[derive(Error, Debug)]
pub enum ExecError {
    /// The external tool could not be started at all
    #[error("Failed to spawn {program}: {message}")]
    Spawn { program: String, message: String },

    /// An external command exited with a non-zero status
    #[error("Command failed ({status}): {command}\n{output}")]
    CommandFailed {
        command: String,
        status: String,
        output: String,
    },
}

/// Execute a plan in order, aborting on the first failure
///
/// For each pair: the keygen step (if any) runs before the copy-id step.
/// Returns the number of invocations executed; an empty plan executes
/// nothing and succeeds.
pub fn run_plan(plan: &[CommandPair]) -> Result<usize, ExecError> {
    let mut executed = 0;

    for pair in plan {
        if let Some(keygen) = &pair.keygen {
            run_invocation(keygen)?;
            executed += 1;
        }
        run_invocation(&pair.copy_id)?;
        executed += 1;
    }

    Ok(executed)
}

/// Run one invocation to completion, capturing its combined output
fn run_invocation(invocation: &Invocation) -> Result<(), ExecError> {
    tracing::info!("Running: {}", invocation.redacted());

    let output = invocation
        .command()
        .stdin(Stdio::null())
        .output()
        .map_err(|e| {
            let message = if e.kind() == ErrorKind::NotFound {
                format!("{} not found on PATH", invocation.program)
            } else {
                e.to_string()
            };
            ExecError::Spawn {
                program: invocation.program.clone(),
                message,
            }
        })?;

    if output.status.success() {
        return Ok(());
    }

    let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
    combined.push_str(&String::from_utf8_lossy(&output.stderr));

    Err(ExecError::CommandFailed {
        command: invocation.redacted().to_string(),
        status: output.status.to_string(),
        output: combined,
    })
}
