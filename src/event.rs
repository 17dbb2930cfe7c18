//! Message classification.
//!
//! The Telegram update is inspected exactly once, here. Everything
//! downstream works on [`Event`] variants and never re-checks optional
//! fields on the raw message.

use teloxide::types::{FileMeta, Message, User};

/// Reply-keyboard button labels. The classifier treats them like commands
/// so a tap behaves the same as typing the text.
pub const BTN_SEND_FILE: &str = "📎 Отправить файл";
pub const BTN_HELP: &str = "ℹ️ Помощь";
pub const BTN_START: &str = "Старт";

/// Placeholder shown instead of a missing Telegram username.
pub const NO_USERNAME: &str = "без username";

/// A file attachment picked out of a message, with its resolved name.
#[derive(Debug, Clone)]
pub struct FileRef {
    /// Bot API file metadata (id to fetch by, unique id).
    pub file: FileMeta,
    /// Document: the sender-supplied filename. Photo: synthesized
    /// `photo_<file_unique_id>.jpg` (Telegram supplies no name).
    pub name: String,
}

/// What an incoming message asks of the bot.
#[derive(Debug, Clone)]
pub enum Event {
    Start,
    Help,
    /// The "send a file" quick-action button.
    AttachPrompt,
    Document(FileRef),
    Photo(FileRef),
    /// Anything else is deliberately ignored, not an error.
    Other,
}

/// Classify a message. Priority order matches the source of truth for
/// these updates: a document wins over a photo wins over text.
pub fn classify(msg: &Message) -> Event {
    if let Some(doc) = msg.document() {
        return Event::Document(FileRef {
            file: doc.file.clone(),
            name: doc.file_name.clone().unwrap_or_default(),
        });
    }

    if let Some(sizes) = msg.photo() {
        // Telegram orders resolution variants ascending; the last one is
        // the best quality.
        if let Some(best) = sizes.last() {
            return Event::Photo(FileRef {
                file: best.file.clone(),
                name: format!("photo_{}.jpg", best.file.unique_id),
            });
        }
    }

    match msg.text().map(str::trim) {
        Some(t) if t.starts_with("/start") || t == BTN_START => Event::Start,
        Some(t) if t.starts_with("/help") || t == BTN_HELP => Event::Help,
        Some(t) if t == BTN_SEND_FILE => Event::AttachPrompt,
        _ => Event::Other,
    }
}

/// Render `Имя Фамилия (@username)` for the email body. Missing name
/// parts collapse, a missing username becomes [`NO_USERNAME`], never a
/// literal `None`.
pub fn sender_info(user: Option<&User>) -> String {
    let (first, last, username) = match user {
        Some(u) => (
            u.first_name.as_str(),
            u.last_name.as_deref().unwrap_or(""),
            u.username.as_deref(),
        ),
        None => ("", "", None),
    };

    let name = format!("{} {}", first.trim(), last.trim());
    format!("{} (@{})", name.trim(), username.unwrap_or(NO_USERNAME))
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use teloxide::types::{Update, UpdateKind};

    use super::*;

    fn msg(payload: serde_json::Value) -> Message {
        serde_json::from_value(payload).expect("construct Message from JSON")
    }

    fn base() -> serde_json::Value {
        json!({
            "message_id": 1,
            "date": 1_700_000_000i64,
            "chat": {"id": 42, "type": "private", "first_name": "John"},
            "from": {"id": 7, "is_bot": false, "first_name": "John"}
        })
    }

    fn text_msg(text: &str) -> Message {
        let mut payload = base();
        payload["text"] = json!(text);
        msg(payload)
    }

    #[test]
    fn test_start_triggers() {
        assert!(matches!(classify(&text_msg("/start")), Event::Start));
        assert!(matches!(classify(&text_msg("/start@postbot")), Event::Start));
        assert!(matches!(classify(&text_msg("Старт")), Event::Start));
    }

    #[test]
    fn test_help_triggers() {
        assert!(matches!(classify(&text_msg("/help")), Event::Help));
        assert!(matches!(classify(&text_msg(BTN_HELP)), Event::Help));
    }

    #[test]
    fn test_attach_prompt_button() {
        assert!(matches!(classify(&text_msg(BTN_SEND_FILE)), Event::AttachPrompt));
    }

    #[test]
    fn test_unknown_text_is_ignored() {
        assert!(matches!(classify(&text_msg("hello there")), Event::Other));
        assert!(matches!(classify(&text_msg("старт")), Event::Other));
    }

    #[test]
    fn test_non_file_media_is_ignored() {
        let mut payload = base();
        payload["voice"] = json!({
            "file_id": "v1", "file_unique_id": "uv1", "duration": 3
        });
        assert!(matches!(classify(&msg(payload)), Event::Other));
    }

    #[test]
    fn test_document_event_carries_name_and_id() {
        let mut payload = base();
        payload["document"] = json!({
            "file_id": "doc1", "file_unique_id": "udoc1",
            "file_name": "invoice.pdf", "file_size": 1024
        });
        match classify(&msg(payload)) {
            Event::Document(file) => {
                assert_eq!(file.name, "invoice.pdf");
                assert_eq!(file.file.id.to_string(), "doc1");
            }
            other => panic!("expected Document, got {other:?}"),
        }
    }

    #[test]
    fn test_document_without_name_gets_empty_name() {
        let mut payload = base();
        payload["document"] = json!({"file_id": "doc1", "file_unique_id": "udoc1"});
        match classify(&msg(payload)) {
            Event::Document(file) => assert_eq!(file.name, ""),
            other => panic!("expected Document, got {other:?}"),
        }
    }

    #[test]
    fn test_photo_takes_last_variant_and_synthesizes_name() {
        let mut payload = base();
        payload["photo"] = json!([
            {"file_id": "ph1", "file_unique_id": "uph1", "width": 90, "height": 90, "file_size": 500},
            {"file_id": "ph2", "file_unique_id": "uph2", "width": 1280, "height": 960, "file_size": 9000}
        ]);
        match classify(&msg(payload)) {
            Event::Photo(file) => {
                assert_eq!(file.file.id.to_string(), "ph2");
                assert_eq!(file.name, "photo_uph2.jpg");
            }
            other => panic!("expected Photo, got {other:?}"),
        }
    }

    #[test]
    fn test_document_wins_over_caption_text() {
        let mut payload = base();
        payload["document"] = json!({
            "file_id": "doc1", "file_unique_id": "udoc1", "file_name": "scan.png"
        });
        payload["caption"] = json!("/start");
        assert!(matches!(classify(&msg(payload)), Event::Document(_)));
    }

    #[test]
    fn test_webhook_update_body_classifies_the_same() {
        // The webhook binary deserializes the raw POST body into an Update
        // and feeds the inner message through this same classifier.
        // Deserialize from a string, exactly as the webhook binary does
        // with the raw POST body: teloxide's flattened `UpdateKind` cannot
        // round-trip through `serde_json::from_value`, only `from_str`.
        let body = json!({
            "update_id": 100,
            "message": {
                "message_id": 5,
                "date": 1_700_000_000i64,
                "chat": {"id": 42, "type": "private", "first_name": "John"},
                "from": {"id": 7, "is_bot": false, "first_name": "John"},
                "document": {
                    "file_id": "doc9", "file_unique_id": "udoc9",
                    "file_name": "report.pdf"
                }
            }
        })
        .to_string();
        let update: Update = serde_json::from_str(&body).expect("construct Update from JSON");

        match update.kind {
            UpdateKind::Message(message) => match classify(&message) {
                Event::Document(file) => assert_eq!(file.name, "report.pdf"),
                other => panic!("expected Document, got {other:?}"),
            },
            other => panic!("expected message update, got {other:?}"),
        }
    }

    #[test]
    fn test_sender_info_full() {
        let user: User = serde_json::from_value(json!({
            "id": 7, "is_bot": false, "first_name": "John",
            "last_name": "Doe", "username": "johnd"
        }))
        .unwrap();
        assert_eq!(sender_info(Some(&user)), "John Doe (@johnd)");
    }

    #[test]
    fn test_sender_info_missing_parts_never_render_as_none() {
        let user: User = serde_json::from_value(json!({
            "id": 7, "is_bot": false, "first_name": "John"
        }))
        .unwrap();
        let info = sender_info(Some(&user));
        assert_eq!(info, "John (@без username)");
        assert!(!info.contains("None"));
    }

    #[test]
    fn test_sender_info_absent_user() {
        assert_eq!(sender_info(None), "(@без username)");
    }
}
