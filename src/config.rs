use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Environment variable selecting the active language profile.
pub const SOURCE_LANGUAGE_VAR: &str = "SOURCE_LANGUAGE";
/// Environment variable holding the OpenAI API key.
pub const OPENAI_TOKEN_VAR: &str = "OPENAI_TOKEN";

const DEFAULT_CHAT_MODEL: &str = "gpt-3.5-turbo";
const DEFAULT_TRANSCRIPTION_MODEL: &str = "whisper-1";
const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

const PROMPT_SUFFIX: &str = "
Твой ответ должен содержать только переведённый текст, без комментариев.
";

/// Errors that can occur when resolving configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// `SOURCE_LANGUAGE` is missing or not one of the known codes.
    InvalidLanguage { value: Option<String> },
    /// A required variable is unset or empty.
    MissingVar(&'static str),
    /// The chat token in the named variable is malformed.
    InvalidToken(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidLanguage { value } => {
                let codes: Vec<&str> = Language::ALL.iter().map(|l| l.code()).collect();
                write!(
                    f,
                    "invalid {SOURCE_LANGUAGE_VAR} '{}' (must be one of: {})",
                    value.as_deref().unwrap_or(""),
                    codes.join(", ")
                )
            }
            Self::MissingVar(name) => write!(f, "please set {name}"),
            Self::InvalidToken(name) => write!(
                f,
                "{name} appears invalid (expected format: 123456789:ABCdefGHI...)"
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Source language of the incoming messages. Each variant is a fixed profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    Russian,
    Serbian,
}

impl Language {
    pub const ALL: [Language; 2] = [Language::Russian, Language::Serbian];

    /// Short code, also passed to transcription as the audio language.
    pub fn code(self) -> &'static str {
        match self {
            Language::Russian => "ru",
            Language::Serbian => "sr",
        }
    }

    /// Variable holding this profile's Telegram bot token.
    pub fn token_var(self) -> &'static str {
        match self {
            Language::Russian => "BOT_TOKEN_RU",
            Language::Serbian => "BOT_TOKEN_SR",
        }
    }

    fn base_prompt(self) -> &'static str {
        match self {
            Language::Russian => "Переведи сообщение с русского языка на сербский.",
            Language::Serbian => "Переведи сообщение с сербского языка на русский.",
        }
    }

    /// Full system prompt sent with every completion request.
    pub fn prompt(self) -> String {
        format!("{}{}", self.base_prompt(), PROMPT_SUFFIX)
    }
}

impl FromStr for Language {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Language::ALL
            .into_iter()
            .find(|l| l.code() == s)
            .ok_or_else(|| ConfigError::InvalidLanguage { value: Some(s.to_string()) })
    }
}

/// Process-wide settings, resolved once at startup and read-only afterwards.
#[derive(Debug, Clone)]
pub struct Config {
    pub language: Language,
    pub prompt: String,
    pub telegram_bot_token: String,
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub chat_model: String,
    pub transcription_model: String,
    /// Directory for the log file. Stdout only when unset.
    pub log_dir: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolve configuration through `lookup`. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.is_empty());

        let language = match get(SOURCE_LANGUAGE_VAR) {
            Some(code) => code.parse::<Language>()?,
            None => return Err(ConfigError::InvalidLanguage { value: None }),
        };

        let token_var = language.token_var();
        let telegram_bot_token = get(token_var).ok_or(ConfigError::MissingVar(token_var))?;
        // Telegram tokens are formatted as {bot_id}:{secret} where bot_id is numeric
        let valid_token = match telegram_bot_token.split_once(':') {
            Some((id, secret)) => id.parse::<u64>().is_ok() && !secret.is_empty() && !secret.contains(':'),
            None => false,
        };
        if !valid_token {
            return Err(ConfigError::InvalidToken(token_var));
        }

        let openai_api_key = get(OPENAI_TOKEN_VAR).ok_or(ConfigError::MissingVar(OPENAI_TOKEN_VAR))?;

        let openai_base_url = get("OPENAI_BASE_URL")
            .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            language,
            prompt: language.prompt(),
            telegram_bot_token,
            openai_api_key,
            openai_base_url,
            chat_model: get("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_CHAT_MODEL.to_string()),
            transcription_model: get("OPENAI_TRANSCRIPTION_MODEL")
                .unwrap_or_else(|| DEFAULT_TRANSCRIPTION_MODEL.to_string()),
            log_dir: get("LOG_DIR").map(PathBuf::from),
        })
    }
}
