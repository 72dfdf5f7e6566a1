//! keyseed CLI - Distribute SSH keys across a cluster
//!
//! Loads the inventory once, then dispatches to the subcommand.

mod commands;

use std::path::PathBuf;
use std::process;

use anyhow::Result;
use clap::{Parser, Subcommand};
use console::style;
use keyseed_core::load_inventory;

/// Distribute SSH keys across the machines of a cluster inventory
#[derive(Parser)]
#[command(name = "keyseed")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Distribute SSH keys across a cluster", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Inventory file
    #[arg(short, long, global = true, default_value = "hosts.yaml")]
    config: PathBuf,

    /// Increase verbosity level
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the command plan without executing it
    Plan(commands::PlanArgs),
    /// Generate the local keypair if needed and copy it to every machine
    Run(commands::RunArgs),
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    // Configure color output
    if cli.no_color {
        console::set_colors_enabled(false);
    }

    let Some(command) = cli.command else {
        // No command - show a welcome message and hint to use --help
        if !cli.quiet {
            println!(
                "{} {}",
                style("keyseed").cyan().bold(),
                style(env!("CARGO_PKG_VERSION")).dim()
            );
            println!();
            println!("Run {} for available commands.", style("--help").green());
        }
        return Ok(());
    };

    // Both subcommands need the inventory; a run must never start from a
    // partial or defaulted one.
    let inventory = match load_inventory(&cli.config) {
        Ok(inventory) => {
            if cli.verbose > 0 {
                eprintln!(
                    "{} Inventory loaded from: {}",
                    style("[info]").cyan(),
                    cli.config.display()
                );
            }
            inventory
        }
        Err(e) => {
            eprintln!("{} Inventory error", style("Error:").red().bold());
            eprintln!();
            eprintln!("  {e}");
            eprintln!();
            eprintln!(
                "  {} Expected a mapping with a {} list of host/user/pass records.",
                style("Tip:").cyan(),
                style("machine").yellow()
            );
            process::exit(1);
        }
    };

    match command {
        Commands::Plan(args) => commands::cmd_plan(&args, &inventory, cli.quiet),
        Commands::Run(args) => commands::cmd_run(&args, &inventory, cli.quiet),
    }
}
