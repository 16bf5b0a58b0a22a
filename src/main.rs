use clap::Parser;

use isls_portal_rust::cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so the CLI picks up SUPABASE_URL, DEMO_EMAIL, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    let config = isls_portal_rust::config::config();
    tracing::debug!(environment = ?config.environment, "starting ISLS portal CLI");

    let cli = cli::Cli::parse();
    cli::run(cli).await
}
