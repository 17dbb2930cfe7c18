//! Webhook deployment.
//!
//! An HTTP server for Telegram webhook delivery: every POST body is one
//! `Update`. The response is `200 OK` no matter what happened inside:
//! any other status would make Telegram re-deliver the update, and this
//! workflow must never run twice for one upload. Non-POST requests and
//! unknown paths get the same `200 OK` with no side effects. File bytes
//! stay in memory; nothing touches disk.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::State;
use axum::http::Method;
use axum::routing::any;
use axum::Router;
use teloxide::prelude::*;
use teloxide::types::UpdateKind;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use postbot::config::{Config, WEBHOOK_SMTP_HOST};
use postbot::fetch::MemoryFetcher;
use postbot::mailer::Mailer;
use postbot::router::{file_keyboard, App};

const DEFAULT_PORT: u16 = 8080;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,postbot=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env(WEBHOOK_SMTP_HOST)
        .context("environment is not configured, check your .env file")?;

    let bot = Bot::new(&config.bot_token);
    let mailer = Mailer::new(&config)?;
    let fetcher = Arc::new(MemoryFetcher::new(bot.clone()));
    let app = Arc::new(App::new(
        bot,
        fetcher,
        mailer,
        config.email_to.clone(),
        Some(file_keyboard()),
    ));

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_PORT);

    let router = Router::new()
        .route("/webhook", any(receive_update))
        .fallback(respond_ok)
        .with_state(app);

    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;

    info!("Webhook server listening on {addr}");
    axum::serve(listener, router).await.context("Server error")?;

    Ok(())
}

async fn receive_update(
    State(app): State<Arc<App>>,
    method: Method,
    body: String,
) -> &'static str {
    if method != Method::POST {
        return "OK";
    }

    // A body Telegram should not have sent is dropped, not bounced: a
    // non-200 here would only make it re-deliver the same payload.
    let update: Update = match serde_json::from_str(&body) {
        Ok(update) => update,
        Err(e) => {
            warn!(error = %e, "ignoring malformed update body");
            return "OK";
        }
    };

    if let UpdateKind::Message(msg) = update.kind {
        app.handle(&msg).await;
    }

    "OK"
}

async fn respond_ok() -> &'static str {
    "OK"
}
