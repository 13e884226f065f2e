//! Inbound message model, decoupled from teloxide types.

/// What an inbound message carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    /// Text body, possibly empty.
    Text(String),
    /// Voice note, referenced by Telegram file id.
    Voice { file_id: String },
    /// Anything else (stickers, photos, service messages).
    Other,
}

/// A message as seen by the relay for one handling cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inbound {
    pub chat_id: i64,
    pub message_id: i64,
    pub content: Content,
}

impl Inbound {
    pub fn text(chat_id: i64, message_id: i64, text: &str) -> Self {
        Self { chat_id, message_id, content: Content::Text(text.to_string()) }
    }

    pub fn voice(chat_id: i64, message_id: i64, file_id: &str) -> Self {
        Self { chat_id, message_id, content: Content::Voice { file_id: file_id.to_string() } }
    }

    /// Short label for logs.
    pub fn kind(&self) -> &'static str {
        match self.content {
            Content::Text(_) => "text",
            Content::Voice { .. } => "voice",
            Content::Other => "other",
        }
    }
}

/// Truncate `s` to at most `max` chars for log previews.
pub fn preview(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max).collect();
        format!("{truncated}...")
    }
}
