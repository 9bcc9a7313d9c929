use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::sync::watch;
use tracing::info;

use zenwatch::config::AppConfig;
use zenwatch::notify::DiscordNotifier;
use zenwatch::scheduler::{PollScheduler, PollSettings};
use zenwatch::sources::{self, MercariAdapter, SourceAdapter, YahooAdapter};
use zenwatch::store::Database;
use zenwatch::translate::{GoogleTranslator, Translator};

#[derive(Parser)]
#[command(name = "zenwatch", about = "Watches ZenMarket listings and announces new items")]
struct Cli {
    /// SQLite database file location
    #[arg(long)]
    db_file: Option<String>,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let level = if cli.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(format!("zenwatch={level}").parse()?),
        )
        .init();

    info!("Starting zenwatch...");

    let mut config = AppConfig::from_env().context("failed to load configuration")?;
    if let Some(db_file) = cli.db_file {
        config.database.url = format!("sqlite:{db_file}");
    }

    let token = config
        .discord
        .bot_token
        .clone()
        .context("discord bot token is not configured (set BOT_TOKEN)")?;

    let db = Database::connect(&config.database)
        .await
        .context("failed to open database")?;

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.scheduler.fetch_timeout_secs))
        .user_agent(concat!("zenwatch/", env!("CARGO_PKG_VERSION")))
        .build()?;

    let mut adapters: Vec<Arc<dyn SourceAdapter>> = Vec::new();
    for source in &config.sources.enabled {
        match source.as_str() {
            sources::mercari::SOURCE_ID => {
                adapters.push(Arc::new(MercariAdapter::new(client.clone())))
            }
            sources::yahoo::SOURCE_ID => {
                adapters.push(Arc::new(YahooAdapter::new(client.clone())))
            }
            other => anyhow::bail!("unknown source in configuration: {other}"),
        }
    }

    let translator: Option<Arc<dyn Translator>> = if config.translation.enabled {
        let translate_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.translation.timeout_secs))
            .build()?;
        Some(Arc::new(GoogleTranslator::new(
            translate_client,
            config.translation.source_lang.clone(),
            config.translation.target_lang.clone(),
        )))
    } else {
        None
    };

    let scheduler = Arc::new(PollScheduler::new(
        db.registry(),
        db.dedup(),
        adapters,
        Arc::new(DiscordNotifier::new(client, token)),
        translator,
        PollSettings {
            check_interval: Duration::from_secs(config.scheduler.check_interval_secs),
            fetch_timeout: Duration::from_secs(config.scheduler.fetch_timeout_secs),
            max_concurrent_fetches: config.scheduler.max_concurrent_fetches,
        },
    ));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let poller = tokio::spawn({
        let scheduler = Arc::clone(&scheduler);
        async move { scheduler.run(shutdown_rx).await }
    });

    tokio::signal::ctrl_c().await?;
    info!("Interrupt received, shutting down...");
    shutdown_tx.send(true).ok();
    poller.await?;

    Ok(())
}
