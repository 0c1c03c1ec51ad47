pub mod commands;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::config::AppConfig;
use crate::database::Database;

#[derive(Parser)]
#[command(name = "catalog")]
#[command(about = "Catalog CLI - schema setup and daily change report operations")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Create the database schema")]
    Migrate,

    #[command(about = "Daily product change report")]
    Report {
        #[command(subcommand)]
        cmd: commands::report::ReportCommands,
    },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
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

    let config = AppConfig::from_env();
    config.validate()?;

    let db = Database::connect(&config.database).await?;
    let result = match cli.command {
        Commands::Migrate => commands::migrate::handle(&db, output_format).await,
        Commands::Report { cmd } => commands::report::handle(cmd, &config, &db, output_format).await,
    };
    db.close().await;

    result
}
