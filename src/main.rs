use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use crossterm::tty::IsTty;

use kubectl_trail::{query_and_render, Args, Config, ConsoleSink, Settings};
use trail_loki::QueryRangeOptions;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Diagnostics go to stderr so stdout only carries log records
    let default_level = match args.verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        _ => tracing::Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let result = run(args).await;

    if let Err(e) = &result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

async fn run(args: Args) -> Result<()> {
    let no_color = args.no_color;
    let settings = Settings::resolve(args, Config::load()?)?;

    // Build the query before touching the network so bad input fails fast
    let query = settings.query.build()?;

    let client = trail_k8s::resolve_client(&settings.url, &settings.kube)
        .await
        .context("Failed to resolve Loki endpoint")?;

    let options = QueryRangeOptions::new()
        .with_limit(settings.limit)
        .with_since(settings.since, Utc::now());

    let stdout = std::io::stdout();
    let color = !no_color && stdout.is_tty();
    let mut sink = ConsoleSink::new(stdout.lock(), color);

    query_and_render(&client, &query, &options, &mut sink).await?;
    Ok(())
}
