use chrono::{NaiveDate, Utc};
use clap::Subcommand;
use serde_json::json;
use std::sync::Arc;

use crate::cli::OutputFormat;
use crate::config::AppConfig;
use crate::database::Database;
use crate::mail;
use crate::reports::{DispatchOutcome, ReportDispatcher};

#[derive(Subcommand)]
pub enum ReportCommands {
    #[command(about = "Print the composed report without sending it")]
    Preview {
        #[arg(long, help = "UTC day as YYYY-MM-DD (default: today)")]
        date: Option<NaiveDate>,
    },

    #[command(about = "Run one dispatch cycle and print its outcome")]
    Send {
        #[arg(long, help = "UTC day as YYYY-MM-DD (default: today)")]
        date: Option<NaiveDate>,
    },
}

pub async fn handle(
    cmd: ReportCommands,
    config: &AppConfig,
    db: &Database,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    let transport = mail::transport_from_config(&config.mail)?;
    let dispatcher = ReportDispatcher::new(Arc::new(db.clone()), transport, config.report.clone());

    match cmd {
        ReportCommands::Preview { date } => {
            let preview = dispatcher.preview(day_or_today(date)).await?;

            match output_format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&preview)?),
                OutputFormat::Text => match &preview.body {
                    Some(body) => println!("{body}"),
                    None => println!("No changes were found for {}", preview.date),
                },
            }
            Ok(())
        }
        ReportCommands::Send { date } => {
            let outcome = dispatcher.dispatch_for(day_or_today(date)).await;

            // A failed cycle is reported once, by the caller of `run`
            if outcome.is_failed() {
                anyhow::bail!(outcome.detail());
            }

            print_outcome(&outcome, output_format)
        }
    }
}

fn print_outcome(outcome: &DispatchOutcome, output_format: OutputFormat) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut body = serde_json::to_value(outcome)?;
            body["success"] = json!(true);
            body["detail"] = json!(outcome.detail());
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
        OutputFormat::Text => match outcome {
            DispatchOutcome::Sent { day, recipients, .. } => {
                println!("✓ {} ({day}, {recipients} recipients)", outcome.detail());
            }
            _ => println!("✓ {}", outcome.detail()),
        },
    }
    Ok(())
}

fn day_or_today(date: Option<NaiveDate>) -> NaiveDate {
    date.unwrap_or_else(|| Utc::now().date_naive())
}
