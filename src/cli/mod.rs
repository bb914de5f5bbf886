pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "jobly")]
#[command(about = "Jobly CLI - Database, token and health utilities for the Jobly API")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Database schema management")]
    Schema {
        #[command(subcommand)]
        cmd: commands::schema::SchemaCommands,
    },

    #[command(about = "Mint a JWT for a user with the configured secret")]
    Token {
        #[arg(help = "Username to put in the token")]
        username: String,
        #[arg(long, help = "Mark the token as an administrator's")]
        admin: bool,
    },

    #[command(about = "Check a running server's /health endpoint")]
    Health {
        #[arg(long, help = "Server base URL (defaults to http://localhost:<PORT>)")]
        url: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Commands::Schema { cmd } => commands::schema::handle(cmd, output_format).await,
        Commands::Token { username, admin } => commands::token::handle(&username, admin, output_format),
        Commands::Health { url } => commands::health::handle(url, output_format).await,
    }
}
