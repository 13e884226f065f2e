//! Telegram client using teloxide.

use async_trait::async_trait;
use teloxide::DownloadError;
use teloxide::net::Download;
use teloxide::prelude::*;
use teloxide::types::{ChatAction, FileId, MessageId, ReplyParameters};
use tracing::{debug, warn};

use super::message::{Content, Inbound};

/// Chat operations the relay needs.
#[async_trait]
pub trait ChatApi: Send + Sync {
    /// Send plain text, optionally as a reply. Returns the new message id.
    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        reply_to_message_id: Option<i64>,
    ) -> Result<i64, String>;

    /// Show the "typing..." indicator.
    async fn send_typing(&self, chat_id: i64) -> Result<(), String>;

    /// Resolve the server-side path a file is downloadable from.
    async fn file_path(&self, file_id: &str) -> Result<String, String>;

    /// Stream the file at `path` into `dst`.
    async fn download(&self, path: &str, dst: &mut tokio::fs::File) -> Result<(), String>;
}

/// Telegram API client.
pub struct TelegramClient {
    bot: Bot,
}

impl TelegramClient {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl ChatApi for TelegramClient {
    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        reply_to_message_id: Option<i64>,
    ) -> Result<i64, String> {
        let mut request = self.bot.send_message(ChatId(chat_id), text);

        if let Some(msg_id) = reply_to_message_id {
            let reply_params = ReplyParameters::new(MessageId(msg_id as i32));
            request = request.reply_parameters(reply_params);
        }

        request.await.map(|msg| msg.id.0 as i64).map_err(|e| {
            let msg = format!("Failed to send: {e}");
            warn!("{}", msg);
            msg
        })
    }

    async fn send_typing(&self, chat_id: i64) -> Result<(), String> {
        self.bot
            .send_chat_action(ChatId(chat_id), ChatAction::Typing)
            .await
            .map_err(|e| format!("Failed to send typing: {e}"))?;
        Ok(())
    }

    async fn file_path(&self, file_id: &str) -> Result<String, String> {
        let file = self
            .bot
            .get_file(FileId(file_id.to_string()))
            .await
            .map_err(|e| format!("Failed to get file info: {e}"))?;

        debug!("Voice file {}", file.path);
        Ok(file.path)
    }

    async fn download(&self, path: &str, dst: &mut tokio::fs::File) -> Result<(), String> {
        self.bot.download_file(path, dst).await.map_err(|e| match e {
            // The request URL embeds the bot token
            DownloadError::Network(e) => match std::sync::Arc::try_unwrap(e) {
                Ok(e) => format!("Failed to download file: {}", e.without_url()),
                Err(e) => format!("Failed to download file: {e}"),
            },
            other => format!("Failed to download file: {other}"),
        })
    }
}

impl From<&Message> for Inbound {
    fn from(msg: &Message) -> Self {
        let content = if let Some(text) = msg.text() {
            Content::Text(text.to_string())
        } else if let Some(voice) = msg.voice() {
            Content::Voice { file_id: voice.file.id.0.clone() }
        } else {
            Content::Other
        };

        Inbound {
            chat_id: msg.chat.id.0,
            message_id: msg.id.0 as i64,
            content,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn message(extra: serde_json::Value) -> Message {
        let mut value = json!({
            "message_id": 17,
            "date": 1700000000,
            "chat": {"id": 923847, "type": "private", "first_name": "Ana"},
            "from": {"id": 923847, "is_bot": false, "first_name": "Ana"}
        });
        for (k, v) in extra.as_object().unwrap() {
            value[k] = v.clone();
        }
        serde_json::from_value(value).expect("valid message fixture")
    }

    #[test]
    fn test_text_message() {
        let msg = message(json!({"text": "Привет"}));
        let inbound = Inbound::from(&msg);
        assert_eq!(inbound, Inbound::text(923847, 17, "Привет"));
    }

    #[test]
    fn test_start_command_stays_text() {
        let msg = message(json!({
            "text": "/start",
            "entities": [{"type": "bot_command", "offset": 0, "length": 6}]
        }));
        assert_eq!(Inbound::from(&msg).content, Content::Text("/start".to_string()));
    }

    #[test]
    fn test_voice_message() {
        let msg = message(json!({
            "voice": {
                "file_id": "AwADBAAD",
                "file_unique_id": "AgADBAAD",
                "duration": 3,
                "mime_type": "audio/ogg",
                "file_size": 4096
            }
        }));
        let inbound = Inbound::from(&msg);
        assert_eq!(inbound.content, Content::Voice { file_id: "AwADBAAD".to_string() });
        assert_eq!(inbound.chat_id, 923847);
        assert_eq!(inbound.message_id, 17);
    }

    #[test]
    fn test_captioned_photo_is_other() {
        // Caption is not message text
        let msg = message(json!({
            "photo": [{
                "file_id": "AgACAgIAAx",
                "file_unique_id": "AQADx",
                "width": 90,
                "height": 90,
                "file_size": 1200
            }],
            "caption": "look at this"
        }));
        assert_eq!(Inbound::from(&msg).content, Content::Other);
    }

    #[test]
    fn test_sticker_is_other() {
        let msg = message(json!({
            "sticker": {
                "file_id": "CAACAgIAAx",
                "file_unique_id": "AgADx",
                "type": "regular",
                "width": 512,
                "height": 512,
                "is_animated": false,
                "is_video": false,
                "file_size": 20000
            }
        }));
        assert_eq!(Inbound::from(&msg).content, Content::Other);
    }
}
