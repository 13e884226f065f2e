//! Relay module - routes Telegram messages through translation.

pub mod engine;
pub mod message;
pub mod telegram;


pub use engine::{Relay, FILLER, GREETING, START_COMMAND, WARNING_MARKER};
pub use message::{Content, Inbound};
pub use telegram::{ChatApi, TelegramClient};
