//! CLI command definitions and handlers.

use anyhow::Result;
use clap::{Parser, Subcommand};

pub mod generate;
pub mod list;
pub mod serve;

/// Bookcast - live booking feed
#[derive(Parser)]
#[command(name = "bookcast")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the web server and booking generator
    Serve(serve::ServeArgs),

    /// Print the persisted bookings
    List(list::ListArgs),

    /// Append synthetic bookings to the data file
    Generate(generate::GenerateArgs),
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Serve(args) => serve::execute(args).await,
            Commands::List(args) => list::execute(args).await,
            Commands::Generate(args) => generate::execute(args).await,
        }
    }
}
