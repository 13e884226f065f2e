//! Telegram bot that translates text and voice messages between Russian and
//! Serbian through OpenAI.

pub mod config;
pub mod openai;
pub mod relay;
