use serde_json::json;

use crate::cli::OutputFormat;
use crate::database::Database;

pub async fn handle(db: &Database, output_format: OutputFormat) -> anyhow::Result<()> {
    db.migrate().await?;

    match output_format {
        OutputFormat::Json => println!("{}", json!({ "success": true, "message": "Schema is up to date" })),
        OutputFormat::Text => println!("✓ Schema is up to date"),
    }
    Ok(())
}
