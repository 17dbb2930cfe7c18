//! Email delivery over SMTP.
//!
//! One email per transfer: fixed from/to addresses from the configuration,
//! subject and body embedding the filename and sender, one attachment.
//! The boolean result is the only outward signal; every failure is logged
//! here and reported to the user as a failed transfer. Sending is not
//! idempotent: calling twice delivers two emails, and nothing here retries.

use anyhow::{Context, Result};
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{error, info};

use crate::config::Config;

pub struct Mailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
}

impl Mailer {
    /// Build the SMTP transport from the configuration. Port 587 with
    /// STARTTLS, matching the relays this bot is deployed against.
    pub fn new(config: &Config) -> Result<Self> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_server)
            .with_context(|| format!("invalid SMTP relay {}", config.smtp_server))?
            .port(config.smtp_port)
            .credentials(Credentials::new(
                config.email_from.clone(),
                config.email_password.clone(),
            ))
            .build();

        Ok(Self {
            transport,
            from: config
                .email_from
                .parse()
                .context("EMAIL_FROM is not a valid address")?,
            to: config
                .email_to
                .parse()
                .context("EMAIL_TO is not a valid address")?,
        })
    }

    /// Send one file as an email attachment. Returns `true` only on
    /// confirmed SMTP acceptance.
    pub async fn send(&self, file_name: &str, content: Vec<u8>, sender_info: &str) -> bool {
        let email = match self.compose(file_name, content, sender_info) {
            Ok(email) => email,
            Err(e) => {
                error!(file = file_name, error = %e, "failed to compose email");
                return false;
            }
        };

        match self.transport.send(email).await {
            Ok(_) => {
                info!(file = file_name, to = %self.to, "email sent");
                true
            }
            Err(e) => {
                error!(file = file_name, error = %e, "smtp send failed");
                false
            }
        }
    }

    fn compose(&self, file_name: &str, content: Vec<u8>, sender_info: &str) -> Result<Message> {
        let mime = mime_guess::from_path(file_name).first_or_octet_stream();
        let content_type = ContentType::parse(mime.essence_str())
            .with_context(|| format!("unrepresentable content type {mime}"))?;

        Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(subject_for(file_name))
            .multipart(
                MultiPart::mixed()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(body_for(file_name, sender_info)),
                    )
                    .singlepart(Attachment::new(file_name.to_string()).body(content, content_type)),
            )
            .context("failed to build email")
    }
}

fn subject_for(file_name: &str) -> String {
    format!("📎 Файл из Telegram: {file_name}")
}

fn body_for(file_name: &str, sender_info: &str) -> String {
    format!(
        "Новый файл получен от Telegram бота.\n\n\
         Файл: {file_name}\n\
         От пользователя: {sender_info}\n\n\
         ---\n\
         Отправлено автоматически Telegram ботом"
    )
}
