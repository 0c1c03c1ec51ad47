use catalog_api::cli::Cli;
use clap::Parser;
use serde_json::json;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("catalog_api=warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let json_output = cli.json;

    if let Err(e) = catalog_api::cli::run(cli).await {
        let verbose = matches!(std::env::var("CLI_VERBOSE").as_deref(), Ok("true") | Ok("1"));
        let message = if verbose { format!("{e:?}") } else { e.to_string() };

        if json_output {
            println!("{}", json!({ "success": false, "error": message }));
        } else {
            eprintln!("Error: {message}");
        }
        std::process::exit(1);
    }

    Ok(())
}
