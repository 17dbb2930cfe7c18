use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use teloxide::prelude::*;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use postbot::config::{Config, POLLING_SMTP_HOST};
use postbot::fetch::DiskFetcher;
use postbot::mailer::Mailer;
use postbot::router::App;

/// Scratch directory for staged downloads; files live here only for the
/// duration of one transfer.
const SCRATCH_DIR: &str = "tmp";

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,postbot=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env(POLLING_SMTP_HOST)
        .context("environment is not configured, check your .env file")?;

    info!("Configuration loaded");
    info!("  SMTP relay: {}:{}", config.smtp_server, config.smtp_port);
    info!("  Forwarding to: {}", config.email_to);

    let bot = Bot::new(&config.bot_token);
    let mailer = Mailer::new(&config)?;
    let fetcher = Arc::new(DiskFetcher::new(bot.clone(), PathBuf::from(SCRATCH_DIR)));
    // The polling deployment sends no reply keyboard.
    let app = Arc::new(App::new(
        bot.clone(),
        fetcher,
        mailer,
        config.email_to.clone(),
        None,
    ));

    info!("Bot is starting...");
    run(bot, app).await
}

/// Start the long-polling dispatcher
async fn run(bot: Bot, app: Arc<App>) -> Result<()> {
    let handler = Update::filter_message().endpoint(handle_message);

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![app])
        .default_handler(|upd| async move {
            warn!("Unhandled update: {:?}", upd.id);
        })
        .error_handler(LoggingErrorHandler::with_custom_text("bot"))
        .build()
        .dispatch()
        .await;

    Ok(())
}

async fn handle_message(msg: Message, app: Arc<App>) -> ResponseResult<()> {
    app.handle(&msg).await;
    Ok(())
}
