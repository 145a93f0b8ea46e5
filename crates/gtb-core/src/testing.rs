//! Port fakes shared by the unit tests.

use std::{
    collections::{HashMap, HashSet},
    sync::Mutex,
};

use async_trait::async_trait;

use crate::{
    domain::{ChatId, MessageId, MessageRef, UserId},
    errors::Error,
    messaging::{
        port::MessagingPort,
        types::{InlineKeyboard, MemberStatus, MessagingCapabilities},
    },
    ports::Translator,
    Result,
};

#[derive(Default)]
pub(crate) struct FakeMessenger {
    next_id: Mutex<i32>,
    pub(crate) texts: Mutex<Vec<(ChatId, String)>>,
    pub(crate) edits: Mutex<Vec<(MessageRef, String)>>,
    pub(crate) menus: Mutex<Vec<(ChatId, String, InlineKeyboard)>>,
    pub(crate) answered: Mutex<Vec<String>>,
    pub(crate) member_queries: Mutex<Vec<(String, UserId)>>,
    failing_chats: Mutex<HashSet<i64>>,
    statuses: Mutex<HashMap<String, MemberStatus>>,
}

impl FakeMessenger {
    pub(crate) fn with_status(self, channel: &str, status: MemberStatus) -> Self {
        self.statuses
            .lock()
            .unwrap()
            .insert(channel.to_string(), status);
        self
    }

    pub(crate) fn failing_chat(self, chat_id: i64) -> Self {
        self.failing_chats.lock().unwrap().insert(chat_id);
        self
    }

    fn alloc(&self, chat_id: ChatId) -> MessageRef {
        let mut guard = self.next_id.lock().unwrap();
        *guard += 1;
        MessageRef {
            chat_id,
            message_id: MessageId(*guard),
        }
    }

    pub(crate) fn texts_to(&self, chat_id: i64) -> Vec<String> {
        self.texts
            .lock()
            .unwrap()
            .iter()
            .filter(|(c, _)| c.0 == chat_id)
            .map(|(_, t)| t.clone())
            .collect()
    }

    pub(crate) fn last_text(&self) -> Option<String> {
        self.texts.lock().unwrap().last().map(|(_, t)| t.clone())
    }

    pub(crate) fn last_edit(&self) -> Option<String> {
        self.edits.lock().unwrap().last().map(|(_, t)| t.clone())
    }

    pub(crate) fn last_menu(&self) -> Option<(String, InlineKeyboard)> {
        self.menus
            .lock()
            .unwrap()
            .last()
            .map(|(_, t, k)| (t.clone(), k.clone()))
    }

    pub(crate) fn query_count(&self) -> usize {
        self.member_queries.lock().unwrap().len()
    }
}

#[async_trait]
impl MessagingPort for FakeMessenger {
    fn capabilities(&self) -> MessagingCapabilities {
        MessagingCapabilities {
            supports_edit: true,
            max_message_len: 4096,
        }
    }

    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<MessageRef> {
        if self.failing_chats.lock().unwrap().contains(&chat_id.0) {
            return Err(Error::External("bot was blocked by the user".to_string()));
        }
        self.texts.lock().unwrap().push((chat_id, text.to_string()));
        Ok(self.alloc(chat_id))
    }

    async fn edit_text(&self, msg: MessageRef, text: &str) -> Result<()> {
        self.edits.lock().unwrap().push((msg, text.to_string()));
        Ok(())
    }

    async fn send_menu(
        &self,
        chat_id: ChatId,
        text: &str,
        keyboard: InlineKeyboard,
    ) -> Result<MessageRef> {
        self.menus
            .lock()
            .unwrap()
            .push((chat_id, text.to_string(), keyboard));
        Ok(self.alloc(chat_id))
    }

    async fn edit_menu(&self, msg: MessageRef, text: &str, keyboard: InlineKeyboard) -> Result<()> {
        self.menus
            .lock()
            .unwrap()
            .push((msg.chat_id, text.to_string(), keyboard));
        Ok(())
    }

    async fn answer_callback_query(&self, callback_id: &str, _text: Option<&str>) -> Result<()> {
        self.answered.lock().unwrap().push(callback_id.to_string());
        Ok(())
    }

    async fn member_status(&self, channel: &str, user_id: UserId) -> Result<MemberStatus> {
        self.member_queries
            .lock()
            .unwrap()
            .push((channel.to_string(), user_id));
        self.statuses
            .lock()
            .unwrap()
            .get(channel)
            .copied()
            .ok_or_else(|| Error::External("Bad Request: chat not found".to_string()))
    }
}

#[derive(Default)]
pub(crate) struct FakeTranslator {
    pub(crate) fail: bool,
    pub(crate) calls: Mutex<Vec<(String, String, String)>>,
}

#[async_trait]
impl Translator for FakeTranslator {
    async fn translate(&self, text: &str, source: &str, target: &str) -> Result<String> {
        self.calls
            .lock()
            .unwrap()
            .push((text.to_string(), source.to_string(), target.to_string()));
        if self.fail {
            return Err(Error::External("translate endpoint unreachable".to_string()));
        }
        Ok(format!("<{target}>{text}"))
    }
}
