use std::sync::Arc;

use teloxide::{dispatching::Dispatcher, dptree, prelude::*, types::BotCommand};

use wrb_core::{config::Config, dispatch::CommandDispatcher, messaging::port::MessagingPort};

use crate::handlers;
use crate::TelegramMessenger;

#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<CommandDispatcher>,
    pub messenger: Arc<dyn MessagingPort>,
}

/// Commands advertised in the Telegram client's command menu.
pub fn command_menu() -> Vec<BotCommand> {
    vec![
        BotCommand::new("start", "Show the available commands"),
        BotCommand::new("roast", "Roast a wallet: /roast <address>"),
        BotCommand::new("price", "Current USD price: /price <coin>"),
        BotCommand::new("balance", "ETH balance: /balance <address>"),
    ]
}

pub async fn run_polling(
    cfg: Arc<Config>,
    dispatcher: Arc<CommandDispatcher>,
) -> anyhow::Result<()> {
    let bot = Bot::new(cfg.telegram_bot_token.clone());

    // Basic startup info.
    let me = bot.get_me().await?;
    tracing::info!(bot = %me.username(), model = %cfg.groq_model, "bot started");
    if cfg.groq_api_key.is_none() {
        tracing::warn!("GROQ_API_KEY is not set; /roast will fail");
    }
    if cfg.etherscan_api_key.is_none() {
        tracing::warn!("ETHERSCAN_API_KEY is not set; /roast and /balance will fail");
    }

    if let Err(e) = bot.set_my_commands(command_menu()).await {
        tracing::warn!("failed to register command menu: {e}");
    }

    let messenger: Arc<dyn MessagingPort> = Arc::new(TelegramMessenger::new(bot.clone()));
    let state = Arc::new(AppState {
        dispatcher,
        messenger,
    });

    let handler = dptree::entry().branch(Update::filter_message().endpoint(handlers::handle_message));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .build()
        .dispatch()
        .await;

    Ok(())
}
