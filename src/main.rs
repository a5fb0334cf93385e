//! Solidarity CLI - Audio DSP Toolkit
//!
//! Command-line interface for the Solidarity DSP toolkit.

use anyhow::Context;
use clap::Parser;
use tracing::info;

use solidarity::cli::{commands, Cli, Commands, ConfigCommand};
use solidarity::logging;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    info!("Solidarity v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Some(cmd) => handle_command(cmd),
        None => {
            println!("Solidarity v{}", env!("CARGO_PKG_VERSION"));
            println!("Use --help for available commands");
            Ok(())
        }
    }
}

fn handle_command(cmd: Commands) -> anyhow::Result<()> {
    match cmd {
        Commands::Demo {
            frequency,
            duration,
        } => commands::demo(frequency, duration).context("demo failed"),
        Commands::Bridging {
            node_id,
            no_quantum,
            config,
            duration,
        } => commands::bridging(node_id, !no_quantum, config.as_deref(), duration)
            .context("bridging pipeline failed"),
        Commands::Process {
            chain,
            config,
            frequency,
            duration,
        } => commands::process(&chain, config.as_deref(), frequency, duration)
            .with_context(|| format!("failed to process chain {}", chain.display())),
        Commands::Config(ConfigCommand::Init { path, force }) => commands::config_init(&path, force)
            .with_context(|| format!("failed to write {}", path.display())),
        Commands::Config(ConfigCommand::Show { path }) => commands::config_show(&path)
            .with_context(|| format!("failed to read {}", path.display())),
    }
}
