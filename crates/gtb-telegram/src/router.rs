use std::sync::Arc;

use teloxide::{dispatching::Dispatcher, dptree, prelude::*};

use gtb_core::messaging::throttled::{ThrottleConfig, ThrottledMessenger};
use gtb_core::{
    config::Config, controller::Controller, domain::UserId, messaging::port::MessagingPort,
    ports::Translator, roster::RosterStore,
};

use crate::handlers;
use crate::TelegramMessenger;

#[derive(Clone)]
pub struct AppState {
    pub controller: Arc<Controller>,
}

pub async fn run_polling(
    cfg: Arc<Config>,
    roster: Arc<RosterStore>,
    translator: Arc<dyn Translator>,
) -> anyhow::Result<()> {
    let bot = Bot::new(cfg.telegram_bot_token.clone());

    // Basic startup info.
    match bot.get_me().await {
        Ok(me) => tracing::info!(username = %me.username(), "bot started"),
        Err(e) => tracing::warn!(error = %e, "getMe failed; continuing"),
    }
    tracing::info!(
        roster = %roster.path().display(),
        backups = %roster.backups().dir().display(),
        admin_id = cfg.admin_id,
        "storage ready"
    );

    // Broadcasts fan out one send per user; the throttling decorator keeps that
    // under Telegram's flood limits. 429 RetryAfter is still retried in the adapter.
    let raw_messenger: Arc<dyn MessagingPort> = Arc::new(TelegramMessenger::new(bot.clone()));
    let messenger: Arc<dyn MessagingPort> = Arc::new(ThrottledMessenger::new(
        raw_messenger,
        ThrottleConfig::default(),
    ));

    let controller = Arc::new(
        Controller::new(UserId(cfg.admin_id), roster, messenger, translator)
            .with_backup_list_limit(cfg.backup_list_limit),
    );

    let state = Arc::new(AppState {
        controller,
    });

    let handler = dptree::entry()
        .branch(Update::filter_callback_query().endpoint(handlers::handle_callback))
        .branch(Update::filter_message().endpoint(handlers::handle_message));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .build()
        .dispatch()
        .await;

    tracing::info!("dispatcher stopped");
    Ok(())
}
