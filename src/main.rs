use std::sync::Arc;

use teloxide::prelude::*;
use tracing::info;
use tracing_subscriber::prelude::*;

use tolmach::config::Config;
use tolmach::openai::OpenAiClient;
use tolmach::relay::{Inbound, Relay, TelegramClient};

#[tokio::main]
async fn main() {
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    // Setup logging
    let stdout_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stdout)
        .with_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        );

    let (file_layer, _guard) = match config.log_dir {
        Some(ref log_dir) => {
            if let Err(e) = std::fs::create_dir_all(log_dir) {
                eprintln!("Error: failed to create log dir '{}': {e}", log_dir.display());
                std::process::exit(1);
            }
            let appender = tracing_appender::rolling::never(log_dir, "tolmach.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_filter(
                    tracing_subscriber::EnvFilter::from_default_env()
                        .add_directive(tracing::Level::INFO.into()),
                );
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(stdout_layer)
        .with(file_layer)
        .init();

    info!("🚀 Starting tolmach...");
    info!(
        "Source language: {}, model: {}",
        config.language.code(),
        config.chat_model
    );

    let bot = Bot::new(&config.telegram_bot_token);
    let completion = Arc::new(OpenAiClient::new(&config));
    let telegram = Arc::new(TelegramClient::new(bot.clone()));
    let relay = Arc::new(Relay::new(Arc::new(config), telegram, completion));

    let handler = Update::filter_message().endpoint(handle_message);

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![relay])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;
}

async fn handle_message(msg: Message, relay: Arc<Relay>) -> ResponseResult<()> {
    relay.dispatch(Inbound::from(&msg)).await;
    Ok(())
}
