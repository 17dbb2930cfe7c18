//! Outbound chat messages.
//!
//! Status sends and edits never abort a transfer: failures are logged and
//! swallowed, the user at worst sees a stale progress message. The one
//! exception is [`Notifier::begin_status`]: without that message there is
//! nothing to edit, so its error is surfaced to the caller.

use teloxide::prelude::*;
use teloxide::types::{KeyboardMarkup, MessageId};
use tracing::warn;

/// The single progress message of one transfer, edited in place.
pub struct StatusMessage {
    chat: ChatId,
    message: MessageId,
}

pub struct Notifier {
    bot: Bot,
}

impl Notifier {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }

    /// Fire-and-forget send.
    pub async fn send(&self, chat: ChatId, text: &str) {
        if let Err(e) = self.bot.send_message(chat, text).await {
            warn!(%chat, error = %e, "failed to send message");
        }
    }

    /// Fire-and-forget send with a reply keyboard attached.
    pub async fn send_with_keyboard(&self, chat: ChatId, text: &str, keyboard: KeyboardMarkup) {
        if let Err(e) = self
            .bot
            .send_message(chat, text)
            .reply_markup(keyboard)
            .await
        {
            warn!(%chat, error = %e, "failed to send message with keyboard");
        }
    }

    /// Create the progress message for a transfer.
    pub async fn begin_status(
        &self,
        chat: ChatId,
        text: &str,
    ) -> Result<StatusMessage, teloxide::RequestError> {
        let sent = self.bot.send_message(chat, text).await?;
        Ok(StatusMessage {
            chat,
            message: sent.id,
        })
    }

    /// Edit the progress message in place.
    pub async fn update(&self, status: &StatusMessage, text: impl Into<String>) {
        if let Err(e) = self
            .bot
            .edit_message_text(status.chat, status.message, text.into())
            .await
        {
            warn!(chat = %status.chat, error = %e, "failed to edit status message");
        }
    }
}
