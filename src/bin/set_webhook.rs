//! One-shot webhook registration.
//!
//! Points the bot at the deployed webhook endpoint via `setWebhook`, then
//! prints the `getWebhookInfo` payload so the operator can see what
//! Telegram actually stored. Exits with a diagnostic on missing
//! configuration or API rejection.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use serde_json::json;

/// Bot API response envelope.
#[derive(Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    result: serde_json::Value,
    #[serde(default)]
    description: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let token = std::env::var("TELEGRAM_BOT_TOKEN")
        .context("TELEGRAM_BOT_TOKEN is not set, check your .env file")?;
    let webhook_url = std::env::var("WEBHOOK_URL").context(
        "WEBHOOK_URL is not set, add e.g. WEBHOOK_URL=https://your-host.example/webhook to .env",
    )?;

    let client = reqwest::Client::new();
    let api_base = format!("https://api.telegram.org/bot{token}");

    let response: ApiResponse = client
        .post(format!("{api_base}/setWebhook"))
        .json(&json!({ "url": webhook_url }))
        .send()
        .await
        .context("setWebhook request failed")?
        .json()
        .await
        .context("setWebhook returned a non-JSON response")?;

    if !response.ok {
        bail!(
            "Telegram rejected the webhook: {}",
            response.description.unwrap_or_else(|| "no description".into())
        );
    }

    println!("✓ Webhook registered: {webhook_url}");

    let info: ApiResponse = client
        .get(format!("{api_base}/getWebhookInfo"))
        .send()
        .await
        .context("getWebhookInfo request failed")?
        .json()
        .await
        .context("getWebhookInfo returned a non-JSON response")?;

    println!("\nWebhook status:");
    println!("{}", serde_json::to_string_pretty(&info.result)?);

    Ok(())
}
