//! Event dispatch and the transfer workflow.
//!
//! The handlers exist once and work against the [`FileFetcher`] capability;
//! which implementation they get (disk or memory) is decided by the binary
//! that composes the [`App`].

use std::path::Path;
use std::sync::Arc;

use teloxide::prelude::*;
use teloxide::types::{KeyboardButton, KeyboardMarkup};
use tracing::{error, info, warn};

use crate::event::{classify, sender_info, Event, FileRef, BTN_HELP, BTN_SEND_FILE};
use crate::fetch::{FetchError, FileFetcher};
use crate::mailer::Mailer;
use crate::notify::{Notifier, StatusMessage};

const ALLOWED_EXTENSIONS: [&str; 4] = ["pdf", "png", "jpg", "jpeg"];

const MSG_WELCOME: &str = "👋 Привет! Я бот для пересылки файлов на email.\n\n\
                           📎 Просто отправь мне файл (PDF, PNG, JPEG), и я перешлю его на почту.\n\n\
                           Поддерживаемые форматы:\n\
                           • PDF документы\n\
                           • Изображения (PNG, JPEG, JPG)";

const MSG_HELP: &str = "ℹ️ Инструкция:\n\n\
                        1. Просто отправь мне файл (PDF, PNG, JPEG)\n\
                        2. Я автоматически перешлю его на email\n\
                        3. Получишь уведомление об успехе\n\n\
                        Всё очень просто - нажми 📎 на скрепку снизу и выбери файл!";

const MSG_ATTACH_PROMPT: &str = "📎 Отлично!\n\n\
                                 Нажми на скрепку 📎 внизу экрана и выбери файл который хочешь отправить.\n\n\
                                 Я приму PDF документы и изображения (PNG, JPEG).";

const MSG_UNSUPPORTED: &str = "❌ Неподдерживаемый формат файла.\nПоддерживаются: PDF, PNG, JPEG";

const MSG_RECEIVING_FILE: &str = "⏳ Получаю файл...";
const MSG_RECEIVING_PHOTO: &str = "⏳ Получаю фото...";
const MSG_SENDING: &str = "📧 Отправляю на email...";
const MSG_EMAIL_FAILED: &str = "❌ Ошибка при отправке на email. Попробуй еще раз.";
const MSG_FILE_ERROR: &str = "❌ Произошла ошибка при обработке файла.";
const MSG_PHOTO_ERROR: &str = "❌ Произошла ошибка при обработке фото.";

/// Quick-action reply keyboard shown by the webhook deployment on /start.
pub fn file_keyboard() -> KeyboardMarkup {
    KeyboardMarkup::new(vec![
        vec![KeyboardButton::new(BTN_SEND_FILE)],
        vec![KeyboardButton::new(BTN_HELP)],
    ])
    .resize_keyboard()
}

fn is_supported(file_name: &str) -> bool {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ALLOWED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// The shared workflow: classify, validate, fetch, email, report status.
pub struct App {
    notifier: Notifier,
    fetcher: Arc<dyn FileFetcher>,
    mailer: Mailer,
    email_to: String,
    start_keyboard: Option<KeyboardMarkup>,
}

impl App {
    pub fn new(
        bot: Bot,
        fetcher: Arc<dyn FileFetcher>,
        mailer: Mailer,
        email_to: String,
        start_keyboard: Option<KeyboardMarkup>,
    ) -> Self {
        Self {
            notifier: Notifier::new(bot),
            fetcher,
            mailer,
            email_to,
            start_keyboard,
        }
    }

    /// Handle one incoming message. Never fails: transfer errors end up as
    /// a failure status in the chat, everything else is logged.
    pub async fn handle(&self, msg: &Message) {
        let chat = msg.chat.id;
        match classify(msg) {
            Event::Start => match &self.start_keyboard {
                Some(keyboard) => {
                    self.notifier
                        .send_with_keyboard(chat, MSG_WELCOME, keyboard.clone())
                        .await
                }
                None => self.notifier.send(chat, MSG_WELCOME).await,
            },
            Event::Help => self.notifier.send(chat, MSG_HELP).await,
            Event::AttachPrompt => self.notifier.send(chat, MSG_ATTACH_PROMPT).await,
            Event::Document(file) => self.handle_document(msg, file).await,
            Event::Photo(file) => self.handle_photo(msg, file).await,
            Event::Other => {}
        }
    }

    async fn handle_document(&self, msg: &Message, file: FileRef) {
        let chat = msg.chat.id;

        if !is_supported(&file.name) {
            info!(chat = %chat, file = %file.name, "rejected unsupported document");
            self.notifier.send(chat, MSG_UNSUPPORTED).await;
            return;
        }

        info!(chat = %chat, file = %file.name, "forwarding document");
        let Some(status) = self.begin(chat, MSG_RECEIVING_FILE).await else {
            return;
        };

        match self.relay(&status, &file, &sender_info(msg.from.as_ref())).await {
            Ok(true) => {
                let text = format!(
                    "✅ Файл '{}' успешно отправлен на {}",
                    file.name, self.email_to
                );
                self.notifier.update(&status, text).await;
            }
            Ok(false) => self.notifier.update(&status, MSG_EMAIL_FAILED).await,
            Err(e) => {
                error!(chat = %chat, file = %file.name, error = %e, "document transfer failed");
                self.notifier.update(&status, MSG_FILE_ERROR).await;
            }
        }
    }

    async fn handle_photo(&self, msg: &Message, file: FileRef) {
        let chat = msg.chat.id;

        info!(chat = %chat, file = %file.name, "forwarding photo");
        let Some(status) = self.begin(chat, MSG_RECEIVING_PHOTO).await else {
            return;
        };

        match self.relay(&status, &file, &sender_info(msg.from.as_ref())).await {
            Ok(true) => {
                let text = format!("✅ Фото успешно отправлено на {}", self.email_to);
                self.notifier.update(&status, text).await;
            }
            Ok(false) => self.notifier.update(&status, MSG_EMAIL_FAILED).await,
            Err(e) => {
                error!(chat = %chat, file = %file.name, error = %e, "photo transfer failed");
                self.notifier.update(&status, MSG_PHOTO_ERROR).await;
            }
        }
    }

    async fn begin(&self, chat: ChatId, text: &str) -> Option<StatusMessage> {
        match self.notifier.begin_status(chat, text).await {
            Ok(status) => Some(status),
            Err(e) => {
                // No progress message means nothing to edit; the transfer
                // is abandoned before any side effect.
                warn!(chat = %chat, error = %e, "could not create status message");
                None
            }
        }
    }

    /// Fetch the file and hand it to the mailer. `Ok(true)` means the
    /// email was accepted, `Ok(false)` that SMTP refused it, `Err` that
    /// the file never reached the mailer. The scratch file is removed in
    /// all three cases once the fetch succeeded.
    async fn relay(
        &self,
        status: &StatusMessage,
        file: &FileRef,
        sender: &str,
    ) -> Result<bool, FetchError> {
        let fetched = self.fetcher.fetch(file).await?;

        self.notifier.update(status, MSG_SENDING).await;

        let outcome = match fetched.bytes().await {
            Ok(bytes) => Ok(self.mailer.send(&file.name, bytes, sender).await),
            Err(e) => Err(FetchError::Io(e)),
        };
        fetched.cleanup().await;
        outcome
    }
}
