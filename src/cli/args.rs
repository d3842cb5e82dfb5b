//! CLI argument definitions using clap
//!
//! Commands:
//! - quillbase init --config <path>
//! - quillbase serve --config <path> [--seed]

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// QuillBase - A self-hostable blogging backend with real-time updates
#[derive(Parser, Debug)]
#[command(name = "quillbase")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Write a default configuration file
    Init {
        /// Path to configuration file
        #[arg(long, default_value = "./quillbase.json")]
        config: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Start the QuillBase server
    Serve {
        /// Path to configuration file
        #[arg(long, default_value = "./quillbase.json")]
        config: PathBuf,

        /// Create a demo admin account and starter categories at boot
        #[arg(long)]
        seed: bool,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
