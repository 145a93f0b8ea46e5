use std::sync::Arc;

use teloxide::prelude::*;

use gtb_core::{
    domain::{ChatId, MessageId, MessageRef, UserId},
    messaging::types::{CallbackQuery as CoreCallback, IncomingUpdate},
};

use crate::handlers::dispatch;
use crate::router::AppState;

/// Acknowledge a callback the controller never sees, so the client stops spinning.
async fn dismiss(bot: &Bot, callback_id: &str) {
    if let Err(e) = bot.answer_callback_query(callback_id.to_string()).await {
        tracing::debug!(error = %e, "answer_callback_query failed");
    }
}

/// Core form of a button press, or `None` when the controller has nothing to act on.
fn to_update(q: &CallbackQuery) -> Option<IncomingUpdate> {
    // Inline-mode buttons have no chat message; nothing in the menus uses them.
    let message = q.message.as_ref()?;
    let data = q.data.clone().filter(|d| !d.is_empty())?;

    let chat_id = ChatId(message.chat.id.0);
    Some(IncomingUpdate::Callback(CoreCallback {
        chat_id,
        user_id: UserId(q.from.id.0 as i64),
        callback_id: q.id.clone(),
        data,
        message: Some(MessageRef {
            chat_id,
            message_id: MessageId(message.id.0),
        }),
    }))
}

pub async fn handle_callback(
    bot: Bot,
    q: CallbackQuery,
    state: Arc<AppState>,
) -> ResponseResult<()> {
    match to_update(&q) {
        Some(update) => dispatch(&state, update).await,
        None => dismiss(&bot, &q.id).await,
    }
    Ok(())
}
