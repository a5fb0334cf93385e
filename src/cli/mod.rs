//! CLI Module
//!
//! Command-line interface for the Solidarity DSP toolkit.

pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Solidarity - whole-buffer audio DSP toolkit
#[derive(Parser, Debug)]
#[command(name = "solidarity")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyze a test tone, try three ZIP phrases and run the reference chain
    #[command(name = "demo")]
    Demo {
        /// Test tone frequency in Hz
        #[arg(short, long, default_value_t = 440.0)]
        frequency: f64,

        /// Test tone duration in seconds
        #[arg(short, long, default_value_t = 1.0)]
        duration: f64,
    },

    /// Run the bridging/anchor pipeline over a three-partial test tone
    #[command(name = "bridging")]
    Bridging {
        /// Starting node of the Henry sequence
        #[arg(short, long, default_value_t = 7)]
        node_id: u32,

        /// Skip the quantum tunneling stage
        #[arg(long)]
        no_quantum: bool,

        /// Bridging configuration file (optional)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Test tone duration in seconds
        #[arg(short, long, default_value_t = 1.0)]
        duration: f64,
    },

    /// Run a JSON processing chain over a generated tone
    #[command(name = "process")]
    Process {
        /// Path to the chain file
        #[arg(long)]
        chain: PathBuf,

        /// Audio configuration file (optional)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Test tone frequency in Hz
        #[arg(short, long, default_value_t = 440.0)]
        frequency: f64,

        /// Test tone duration in seconds
        #[arg(short, long, default_value_t = 1.0)]
        duration: f64,
    },

    /// Manage configuration files
    #[command(name = "config", subcommand)]
    Config(ConfigCommand),
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Write the default configuration
    #[command(name = "init")]
    Init {
        /// Destination path
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Load, validate and print a configuration
    #[command(name = "show")]
    Show {
        /// Path to the configuration
        path: PathBuf,
    },
}
