pub mod commands;

use clap::{Parser, Subcommand};

use crate::config::AppConfig;

#[derive(Parser)]
#[command(name = "sheet-groups-api")]
#[command(about = "Google Sheets grouping backend for administrators")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the HTTP server (default)")]
    Serve {
        #[arg(long, help = "Port to listen on, overrides PORT")]
        port: Option<u16>,

        #[arg(long, help = "Keep sheets and users in memory instead of Postgres")]
        memory: bool,
    },

    #[command(about = "Create an administrator, or promote an existing user")]
    AddAdmin {
        #[arg(long, help = "Google account email")]
        email: String,

        #[arg(long, help = "Display name")]
        name: String,
    },
}

pub async fn run(cli: Cli, config: AppConfig) -> anyhow::Result<()> {
    match cli.command.unwrap_or(Commands::Serve {
        port: None,
        memory: false,
    }) {
        Commands::Serve { port, memory } => commands::serve::handle(config, port, memory).await,
        Commands::AddAdmin { email, name } => commands::admin::add_admin(config, &email, &name).await,
    }
}
