//! keyseed plan - Show the command plan without executing it

use anyhow::Result;
use clap::Args;
use comfy_table::{Cell, Color, Table};
use console::style;
use keyseed_core::{CommandPair, Inventory, build_plan, local_ipv4};

/// Arguments for the plan command
#[derive(Args)]
pub struct PlanArgs {
    /// Emit the plan as JSON (for scripting)
    #[arg(long)]
    pub json: bool,
}

pub fn cmd_plan(args: &PlanArgs, inventory: &Inventory, quiet: bool) -> Result<()> {
    let local_ip = local_ipv4();
    let plan = build_plan(inventory, local_ip);

    // Passwords never leave the process; everything shown here is masked.
    let redacted: Vec<CommandPair> = plan
        .iter()
        .map(|pair| CommandPair {
            keygen: pair.keygen.clone(),
            copy_id: pair.copy_id.redacted(),
        })
        .collect();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&redacted)?);
        return Ok(());
    }

    if redacted.is_empty() {
        if !quiet {
            println!("Nothing to do: the inventory lists no machines.");
        }
        return Ok(());
    }

    // Build table
    let mut table = Table::new();
    table.set_header(vec!["#", "Target", "Keygen", "Command"]);

    for (i, pair) in redacted.iter().enumerate() {
        let target = pair.copy_id.args.last().cloned().unwrap_or_default();
        let keygen_cell = if pair.keygen.is_some() {
            Cell::new("yes").fg(Color::Cyan)
        } else {
            Cell::new("-")
        };
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(target),
            keygen_cell,
            Cell::new(pair.copy_id.to_string()),
        ]);
    }

    println!("{table}");

    if quiet {
        return Ok(());
    }

    if let Some(keygen) = redacted.first().and_then(|pair| pair.keygen.as_ref()) {
        println!();
        println!(
            "  {} {}",
            style("Runs first:").dim(),
            style(keygen).cyan()
        );
    }

    println!();
    match local_ip {
        Some(ip) => println!("  {} {}", style("Local address:").dim(), style(ip).cyan()),
        None => println!(
            "  {} none detected; no key generation will be scheduled",
            style("Local address:").dim()
        ),
    }

    Ok(())
}
