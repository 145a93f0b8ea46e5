use async_trait::async_trait;

use crate::{
    domain::{ChatId, MessageRef, UserId},
    messaging::types::{InlineKeyboard, MemberStatus, MessagingCapabilities},
    Result,
};

/// Cross-messenger port.
///
/// Everything the bot needs from the chat platform: plain-text replies,
/// button menus, callback acknowledgement and channel membership lookups.
#[async_trait]
pub trait MessagingPort: Send + Sync {
    fn capabilities(&self) -> MessagingCapabilities;

    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<MessageRef>;
    async fn edit_text(&self, msg: MessageRef, text: &str) -> Result<()>;

    async fn send_menu(
        &self,
        chat_id: ChatId,
        text: &str,
        keyboard: InlineKeyboard,
    ) -> Result<MessageRef>;
    async fn edit_menu(&self, msg: MessageRef, text: &str, keyboard: InlineKeyboard)
        -> Result<()>;

    async fn answer_callback_query(&self, callback_id: &str, text: Option<&str>) -> Result<()>;

    /// Membership of `user_id` in the channel addressed by `channel` (an `@handle`).
    async fn member_status(&self, channel: &str, user_id: UserId) -> Result<MemberStatus>;
}
