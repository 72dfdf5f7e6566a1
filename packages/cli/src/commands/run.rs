//! keyseed run - Execute the key distribution plan

use anyhow::{Result, bail};
use clap::Args;
use console::style;
use keyseed_core::{ExecError, Inventory, build_plan, local_ipv4, run_plan};

/// Arguments for the run command
#[derive(Args)]
pub struct RunArgs {}

pub fn cmd_run(_args: &RunArgs, inventory: &Inventory, quiet: bool) -> Result<()> {
    let plan = build_plan(inventory, local_ipv4());

    if plan.is_empty() {
        if !quiet {
            println!("Nothing to do: the inventory lists no machines.");
        }
        return Ok(());
    }

    // Echo what is about to run, passwords masked.
    if !quiet {
        for pair in &plan {
            if let Some(keygen) = &pair.keygen {
                println!("{}", style(keygen).dim());
            }
            println!("{}", style(pair.copy_id.redacted()).dim());
        }
        println!();
    }

    match run_plan(&plan) {
        Ok(executed) => {
            if !quiet {
                println!(
                    "{} Key distributed to {} machines ({} commands)",
                    style("✓").green().bold(),
                    plan.len(),
                    executed
                );
            }
            Ok(())
        }
        Err(ExecError::CommandFailed {
            command,
            status,
            output,
        }) => {
            eprintln!("{} {}", style("✗").red().bold(), style(&command).yellow());
            eprintln!();
            eprintln!("{}", output.trim_end());
            eprintln!();
            bail!("Command failed with {status}");
        }
        Err(e) => Err(e.into()),
    }
}
