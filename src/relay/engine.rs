//! Relay engine - dispatches inbound messages and runs the translation flows.

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};
use tracing::{info, warn};

use crate::config::Config;
use crate::openai::{Completion, Error, Message};

use super::message::{preview, Content, Inbound};
use super::telegram::ChatApi;

pub const START_COMMAND: &str = "/start";
pub const GREETING: &str = "Ну привет";
pub const FILLER: &str = "чо";
/// Prefix of every error report sent to a chat.
pub const WARNING_MARKER: &str = "‼️";

const VOICE_FILE_NAME: &str = "voice.oga";

/// Routes inbound messages to the translation and voice flows.
pub struct Relay {
    config: Arc<Config>,
    chat: Arc<dyn ChatApi>,
    completion: Arc<dyn Completion>,
    /// Where voice downloads land. System temp dir when unset.
    temp_dir: Option<PathBuf>,
}

impl Relay {
    pub fn new(config: Arc<Config>, chat: Arc<dyn ChatApi>, completion: Arc<dyn Completion>) -> Self {
        Self { config, chat, completion, temp_dir: None }
    }

    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = Some(dir.into());
        self
    }

    /// Handle one inbound message. Never fails: errors end up in the chat.
    pub async fn dispatch(&self, msg: Inbound) {
        let chat_id = msg.chat_id;
        info!("📨 {} message in chat {}", msg.kind(), chat_id);

        if let Err(e) = self.chat.send_typing(chat_id).await {
            warn!("{e}");
        }

        match msg.content {
            Content::Text(text) if text == START_COMMAND => {
                self.send_or_log(chat_id, GREETING, None).await;
            }
            Content::Text(text) if !text.is_empty() => {
                self.translate(chat_id, &text).await;
            }
            Content::Voice { file_id } => {
                self.voice(chat_id, &file_id).await;
            }
            _ => {
                self.send_or_log(chat_id, FILLER, Some(msg.message_id)).await;
            }
        }
    }

    /// Translate `text` and send the result to `chat_id`.
    pub async fn translate(&self, chat_id: i64, text: &str) {
        self.report(chat_id, async {
            let messages = [Message::system(self.config.prompt.as_str()), Message::user(text)];
            let translation = self.completion.complete(&messages).await?;
            info!("Translated: \"{}\"", preview(&translation, 100));
            self.chat
                .send_message(chat_id, &translation, None)
                .await
                .map_err(Error::Chat)?;
            Ok(())
        })
        .await;
    }

    /// Transcribe a voice note, announce the transcript, then translate it.
    pub async fn voice(&self, chat_id: i64, file_id: &str) {
        let Some(transcript) = self.report(chat_id, self.transcribe(file_id)).await else {
            return;
        };

        let announcement = format!("Расшифровка: {transcript}\n\nПеревод:");
        self.report(chat_id, async {
            self.chat
                .send_message(chat_id, &announcement, None)
                .await
                .map_err(Error::Chat)
        })
        .await;

        self.translate(chat_id, &transcript).await;
    }

    async fn transcribe(&self, file_id: &str) -> Result<String, Error> {
        let path = self.chat.file_path(file_id).await.map_err(Error::Chat)?;

        // Removed on drop, whichever way this function exits
        let mut builder = tempfile::Builder::new();
        builder.prefix("voice-").suffix(".oga");
        let temp = match self.temp_dir {
            Some(ref dir) => builder.tempfile_in(dir)?,
            None => builder.tempfile()?,
        };
        let mut file = tokio::fs::File::from_std(temp.reopen()?);

        self.chat.download(&path, &mut file).await.map_err(Error::Chat)?;
        file.flush().await?;
        file.rewind().await?;
        let mut audio = Vec::new();
        file.read_to_end(&mut audio).await?;

        let language = self.config.language.code();
        let transcript = self
            .completion
            .transcribe(audio, VOICE_FILE_NAME, language)
            .await?;
        info!("Transcribed ({}): \"{}\"", language, preview(&transcript, 100));
        Ok(transcript)
    }

    /// Run `op`; on failure send the error to `chat_id` and return `None`.
    pub async fn report<T, F>(&self, chat_id: i64, op: F) -> Option<T>
    where
        F: Future<Output = Result<T, Error>>,
    {
        match op.await {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Failed in chat {}: {}", chat_id, e);
                let text = format!("{WARNING_MARKER}{e}");
                self.send_or_log(chat_id, &text, None).await;
                None
            }
        }
    }

    async fn send_or_log(&self, chat_id: i64, text: &str, reply_to_message_id: Option<i64>) {
        if let Err(e) = self.chat.send_message(chat_id, text, reply_to_message_id).await {
            warn!("Dropped message for chat {}: {}", chat_id, e);
        }
    }
}
