//! Telegram update handlers.
//!
//! Each handler is a thin adapter that converts a teloxide update into the
//! core `IncomingUpdate` model and hands it to the controller. Errors are
//! logged here; nothing is propagated back to the dispatcher.

use std::sync::Arc;

use teloxide::{
    prelude::*,
    types::{CallbackQuery, Message},
};

use gtb_core::messaging::types::IncomingUpdate;

use crate::router::AppState;
mod callback;
mod commands;
mod text;

pub async fn handle_callback(
    bot: Bot,
    q: CallbackQuery,
    state: Arc<AppState>,
) -> ResponseResult<()> {
    callback::handle_callback(bot, q, state).await
}

pub async fn handle_message(bot: Bot, msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    // Group chats are out of scope: the bot is used one-to-one.
    if !msg.chat.is_private() {
        return Ok(());
    }

    if let Some(text) = msg.text() {
        if text.starts_with('/') {
            return commands::handle_command(bot, msg, state).await;
        }
        return text::handle_text(bot, msg, state).await;
    }

    tracing::debug!(chat_id = msg.chat.id.0, "ignoring non-text message");
    Ok(())
}

/// Run one update through the controller, logging (not propagating) failures.
pub(crate) async fn dispatch(state: &AppState, update: IncomingUpdate) {
    if let Err(e) = state.controller.handle(update).await {
        tracing::error!(error = %e, "update handling failed");
    }
}
