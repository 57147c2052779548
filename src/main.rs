use anyhow::Result;
use clap::Parser;
use teloxide::prelude::*;
use tracing::info;

use tesla_watchbot::config::Config;
use tesla_watchbot::extractor::TeslaExtractor;
use tesla_watchbot::notifier::{TelegramCommands, TelegramNotifier};
use tesla_watchbot::store::InventoryStore;
use tesla_watchbot::watcher::Watcher;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Override the state directory from DATA_DIR
    #[arg(long)]
    data_dir: Option<String>,

    /// Run a single inventory cycle and exit
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();

    let args = Args::parse();
    let mut cfg = Config::from_env()?;
    if let Some(dir) = args.data_dir {
        cfg.data_dir = dir;
    }
    cfg.ensure_data_dir()?;

    let bot = Bot::new(cfg.bot_token.clone());
    let store = InventoryStore::new(&cfg.data_dir);
    let extractor = TeslaExtractor::new(cfg.inventory_url.clone(), cfg.models.clone())?;
    let notifier = TelegramNotifier::new(bot.clone(), cfg.chat_id);
    let commands = TelegramCommands::new(bot, cfg.chat_id);

    let mut watcher = Watcher::new(
        cfg,
        store,
        Box::new(extractor),
        Box::new(notifier),
        Box::new(commands),
    )
    .await;

    if args.once {
        let report = watcher.run_inventory_cycle().await?;
        info!(
            fetched = report.fetched,
            attempted = report.attempted,
            "single cycle complete"
        );
        return Ok(());
    }

    info!("starting inventory watcher");
    watcher.run().await
}
