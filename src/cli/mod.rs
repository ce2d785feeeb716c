//! Command-line interface.

use clap::{Parser, Subcommand};

/// Bharani - storefront and contact-lead backend
#[derive(Debug, Parser)]
#[command(name = "bharani")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start the HTTP API server (default)
    Serve,

    /// Create the administrator account, replacing any with the same username
    SetupAdmin {
        #[arg(long)]
        username: String,

        #[arg(long)]
        password: String,

        #[arg(long)]
        email: String,
    },

    /// Create default config file
    Init,
}

impl Cli {
    #[must_use]
    pub fn into_command(self) -> Commands {
        self.command.unwrap_or(Commands::Serve)
    }
}
