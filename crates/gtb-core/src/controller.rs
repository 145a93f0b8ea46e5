//! Menu/command controller: turns incoming updates into roster, backup,
//! broadcast and translation actions, replying through the messaging port.

use std::sync::Arc;

use crate::{
    config::DEFAULT_BACKUP_LIST_LIMIT,
    domain::{ChatId, MessageRef, UserId},
    errors::Error,
    gate::SubscriptionGate,
    menu::{self, MenuAction},
    messaging::{
        port::MessagingPort,
        types::{CallbackQuery, Command, IncomingUpdate, InlineKeyboard, TextMessage},
    },
    ports::{Translator, AUTO_SOURCE},
    roster::RosterStore,
    session::{SessionMode, SessionModes},
    translation::target_for,
    Result,
};

const MAIN_MENU_TEXT: &str = "مرحباً! اختر خياراً:";
const ADMIN_PANEL_TEXT: &str = "🛠 لوحة تحكم الأدمِن:";
const ABOUT_TEXT: &str = "🤖 هذا بوت لترجمة النصوص بين العربية والإنجليزية.";
const GENERIC_FAILURE: &str = "⚠️ حدث خطأ، حاول مرة أخرى لاحقاً.";

pub struct Controller {
    admin_id: UserId,
    roster: Arc<RosterStore>,
    gate: SubscriptionGate,
    modes: SessionModes,
    messenger: Arc<dyn MessagingPort>,
    translator: Arc<dyn Translator>,
    backup_list_limit: usize,
}

impl Controller {
    pub fn new(
        admin_id: UserId,
        roster: Arc<RosterStore>,
        messenger: Arc<dyn MessagingPort>,
        translator: Arc<dyn Translator>,
    ) -> Self {
        Self {
            admin_id,
            gate: SubscriptionGate::new(admin_id, roster.clone(), messenger.clone()),
            roster,
            modes: SessionModes::new(),
            messenger,
            translator,
            backup_list_limit: DEFAULT_BACKUP_LIST_LIMIT,
        }
    }

    pub fn with_backup_list_limit(mut self, n: usize) -> Self {
        self.backup_list_limit = n.max(1);
        self
    }

    pub fn modes(&self) -> &SessionModes {
        &self.modes
    }

    fn is_admin(&self, user_id: UserId) -> bool {
        user_id == self.admin_id
    }

    pub async fn handle(&self, update: IncomingUpdate) -> Result<()> {
        match update {
            IncomingUpdate::Command(cmd) => self.handle_command(cmd).await,
            IncomingUpdate::Text(msg) => self.handle_text(msg).await,
            IncomingUpdate::Callback(q) => self.handle_callback(q).await,
        }
    }

    // ============== Commands ==============

    pub async fn handle_command(&self, cmd: Command) -> Result<()> {
        match cmd.name.as_str() {
            "start" => self.start(cmd.chat_id, cmd.user_id).await,
            other => {
                tracing::debug!(command = other, "ignoring unknown command");
                Ok(())
            }
        }
    }

    async fn start(&self, chat_id: ChatId, user_id: UserId) -> Result<()> {
        if !self.is_admin(user_id) {
            let Some(missing) = self.gate_or_fail(chat_id, user_id).await? else {
                return Ok(());
            };
            if !missing.is_empty() {
                self.messenger
                    .send_text(chat_id, &subscription_notice(&missing))
                    .await?;
                return Ok(());
            }
            if let Err(e) = self.roster.add_user(user_id.0) {
                return self.storage_failure(chat_id, None, e).await;
            }
        }

        self.messenger
            .send_menu(chat_id, MAIN_MENU_TEXT, menu::main_menu(self.is_admin(user_id)))
            .await?;
        Ok(())
    }

    // ============== Text messages ==============

    pub async fn handle_text(&self, msg: TextMessage) -> Result<()> {
        let text = msg.text.trim();
        if text.is_empty() {
            return Ok(());
        }
        let (chat_id, user_id) = (msg.chat_id, msg.user_id);

        if !self.is_admin(user_id) {
            let Some(missing) = self.gate_or_fail(chat_id, user_id).await? else {
                return Ok(());
            };
            if !missing.is_empty() {
                self.messenger
                    .send_text(chat_id, &subscription_notice(&missing))
                    .await?;
                return Ok(());
            }
        }

        let mode = self.modes.get(user_id).await;
        match mode {
            SessionMode::AddChannel if self.is_admin(user_id) => {
                self.add_channel_from_text(chat_id, user_id, text).await
            }
            SessionMode::Broadcast if self.is_admin(user_id) => {
                self.modes.clear(user_id).await;
                let sent = match self.broadcast(text).await {
                    Ok(n) => n,
                    Err(e) => return self.storage_failure(chat_id, None, e).await,
                };
                self.messenger
                    .send_text(chat_id, &format!("✅ تم إرسال الرسالة إلى {sent} مستخدم/مشترك."))
                    .await?;
                Ok(())
            }
            _ => {
                if mode != SessionMode::None {
                    self.modes.clear(user_id).await;
                }
                self.translate_and_reply(chat_id, text).await
            }
        }
    }

    /// A rejected handle leaves the mode active so the admin can simply retry.
    async fn add_channel_from_text(&self, chat_id: ChatId, user_id: UserId, text: &str) -> Result<()> {
        if !menu::is_channel_handle(text) {
            self.messenger
                .send_text(
                    chat_id,
                    "⚠️ يجب أن يبدأ اسم القناة بـ @ (مثال: @my_channel). أرسله مرة أخرى:",
                )
                .await?;
            return Ok(());
        }

        let added = match self.roster.add_channel(text) {
            Ok(added) => added,
            Err(e) => return self.storage_failure(chat_id, None, e).await,
        };
        self.modes.clear(user_id).await;

        let reply = if added {
            format!("✅ تم إضافة القناة {text} كشرط اشتراك.")
        } else {
            format!("ℹ️ القناة {text} مضافة مسبقاً كشرط اشتراك.")
        };
        self.messenger.send_text(chat_id, &reply).await?;
        Ok(())
    }

    /// Relay `text` to every known user except the admin, one at a time.
    ///
    /// Delivery failures are skipped; returns the number of successful sends.
    pub async fn broadcast(&self, text: &str) -> Result<usize> {
        let users = self.roster.users()?;
        let mut sent = 0usize;
        let mut failed = 0usize;

        for user in users.into_iter().filter(|&u| u != self.admin_id.0) {
            match self.messenger.send_text(ChatId::from(UserId(user)), text).await {
                Ok(_) => sent += 1,
                Err(e) => {
                    failed += 1;
                    tracing::debug!(user_id = user, error = %e, "broadcast delivery failed");
                }
            }
        }

        tracing::info!(sent, failed, "broadcast finished");
        Ok(sent)
    }

    async fn translate_and_reply(&self, chat_id: ChatId, text: &str) -> Result<()> {
        let target = target_for(text);
        let translated = match self
            .translator
            .translate(text, AUTO_SOURCE, target.code())
            .await
        {
            Ok(t) => t,
            Err(e) => {
                tracing::warn!(error = %e, "translation failed");
                self.messenger
                    .send_text(chat_id, "⚠️ حدث خطأ أثناء الترجمة.")
                    .await?;
                return Ok(());
            }
        };

        let reply = format!("🔄 الترجمة ({}):\n{translated}", target.code());
        let limit = self.messenger.capabilities().max_message_len;
        self.messenger
            .send_text(chat_id, &clip(&reply, limit))
            .await?;
        Ok(())
    }

    // ============== Button selections ==============

    pub async fn handle_callback(&self, q: CallbackQuery) -> Result<()> {
        if let Err(e) = self.messenger.answer_callback_query(&q.callback_id, None).await {
            tracing::debug!(error = %e, "answer_callback_query failed");
        }

        let Some(action) = MenuAction::decode(&q.data) else {
            tracing::debug!(data = %q.data, "ignoring unknown callback payload");
            return Ok(());
        };
        let user_id = q.user_id;

        if !self.is_admin(user_id) {
            let Some(missing) = self.gate_or_fail(q.chat_id, user_id).await? else {
                return Ok(());
            };
            if !missing.is_empty() {
                return self.show(&q, &subscription_notice(&missing), None).await;
            }
            if action.requires_admin() {
                tracing::warn!(user_id = user_id.0, ?action, "non-admin selected an admin action");
                return Ok(());
            }
        }

        match action {
            MenuAction::TranslateText => {
                self.modes.set(user_id, SessionMode::Translate).await;
                self.show(&q, "✏️ أرسل لي النص الذي تريد ترجمته:", None)
                    .await
            }
            MenuAction::About => self.show(&q, ABOUT_TEXT, None).await,
            MenuAction::AdminPanel => {
                self.show(&q, ADMIN_PANEL_TEXT, Some(menu::admin_panel()))
                    .await
            }
            MenuAction::UserCount => match self.roster.users() {
                Ok(users) => {
                    self.show(&q, &format!("📊 عدد المشتركين في البوت: {}", users.len()), None)
                        .await
                }
                Err(e) => self.storage_failure(q.chat_id, q.message, e).await,
            },
            MenuAction::Broadcast => {
                self.modes.set(user_id, SessionMode::Broadcast).await;
                self.show(&q, "✏️ أرسل لي الرسالة التي تريد إرسالها لجميع المشتركين:", None)
                    .await
            }
            MenuAction::AddChannel => {
                self.modes.set(user_id, SessionMode::AddChannel).await;
                self.show(&q, "✏️ أرسل @اسم_القناة لإضافتها كشرط اشتراك:", None)
                    .await
            }
            MenuAction::RemoveChannelMenu => match self.roster.channels() {
                Ok(channels) if channels.is_empty() => {
                    self.show(&q, "⚠️ لا توجد قنوات لتتم إزالتها.", None).await
                }
                Ok(channels) => {
                    self.show(
                        &q,
                        "اختر القناة التي تريد إزالتها:",
                        Some(menu::channel_removal(&channels)),
                    )
                    .await
                }
                Err(e) => self.storage_failure(q.chat_id, q.message, e).await,
            },
            MenuAction::RemoveChannel(channel) => match self.roster.remove_channel(&channel) {
                Ok(true) => self.show(&q, &format!("✅ تم إزالة القناة {channel}"), None).await,
                Ok(false) => {
                    self.show(&q, &format!("ℹ️ القناة {channel} ليست مفروضة كشرط اشتراك."), None)
                        .await
                }
                Err(e) => self.storage_failure(q.chat_id, q.message, e).await,
            },
            MenuAction::ShowChannels => match self.roster.channels() {
                Ok(channels) if channels.is_empty() => {
                    self.show(&q, "⚠️ لا توجد أي قناة مفروضة حالياً.", None)
                        .await
                }
                Ok(channels) => {
                    let text = format!("📌 القنوات المفروضة كشرط للاشتراك:\n{}", channels.join("\n"));
                    self.show(&q, &text, None).await
                }
                Err(e) => self.storage_failure(q.chat_id, q.message, e).await,
            },
            MenuAction::CreateBackup => match self.roster.manual_backup() {
                Ok(name) => {
                    self.show(&q, &format!("✅ تم إنشاء نسخة احتياطية يدوية:\n{name}"), None)
                        .await
                }
                Err(e) => {
                    tracing::error!(error = %e, "manual backup failed");
                    self.show(&q, "⚠️ فشل في إنشاء النسخة الاحتياطية.", None).await
                }
            },
            MenuAction::RestoreMenu => {
                let files = self.roster.backups().list_recent(self.backup_list_limit);
                if files.is_empty() {
                    return self
                        .show(&q, "⚠️ لا توجد نسخ احتياطية متاحة للاستعادة.", None)
                        .await;
                }
                self.show(
                    &q,
                    "اختر النسخة الاحتياطية التي تريد استعادتها:",
                    Some(menu::backup_restore(&files)),
                )
                .await
            }
            MenuAction::Restore(file) => match self.roster.restore(&file) {
                Ok(()) => {
                    let text = format!(
                        "✅ تم استعادة النسخة الاحتياطية:\n{file}\n\n⚠️ يُنصح بإعادة تشغيل البوت لضمان تحديث البيانات."
                    );
                    self.show(&q, &text, None).await
                }
                Err(e) => {
                    tracing::error!(backup = %file, error = %e, "restore failed");
                    self.show(&q, "⚠️ فشلت استعادة النسخة الاحتياطية.", None).await
                }
            },
            MenuAction::BackToMain => {
                self.modes.clear(user_id).await;
                self.show(&q, MAIN_MENU_TEXT, Some(menu::main_menu(self.is_admin(user_id))))
                    .await
            }
        }
    }

    // ============== Helpers ==============

    /// Replace the menu message a button was pressed on, or send a fresh one
    /// when there is nothing to edit.
    async fn show(&self, q: &CallbackQuery, text: &str, keyboard: Option<InlineKeyboard>) -> Result<()> {
        self.show_in(q.chat_id, q.message, text, keyboard).await
    }

    async fn show_in(
        &self,
        chat_id: ChatId,
        message: Option<MessageRef>,
        text: &str,
        keyboard: Option<InlineKeyboard>,
    ) -> Result<()> {
        let editable = message.filter(|_| self.messenger.capabilities().supports_edit);
        match (editable, keyboard) {
            (Some(msg), Some(kb)) => self.messenger.edit_menu(msg, text, kb).await,
            (Some(msg), None) => self.messenger.edit_text(msg, text).await,
            (None, Some(kb)) => self.messenger.send_menu(chat_id, text, kb).await.map(|_| ()),
            (None, None) => self.messenger.send_text(chat_id, text).await.map(|_| ()),
        }
    }

    /// Run the subscription gate; on a storage failure reply generically and
    /// return `None` so the caller stops.
    async fn gate_or_fail(&self, chat_id: ChatId, user_id: UserId) -> Result<Option<Vec<String>>> {
        match self.gate.unsubscribed_channels(user_id).await {
            Ok(missing) => Ok(Some(missing)),
            Err(e) => {
                self.storage_failure(chat_id, None, e).await?;
                Ok(None)
            }
        }
    }

    async fn storage_failure(
        &self,
        chat_id: ChatId,
        message: Option<MessageRef>,
        err: Error,
    ) -> Result<()> {
        tracing::error!(error = %err, "roster operation failed");
        self.show_in(chat_id, message, GENERIC_FAILURE, None).await
    }
}

fn subscription_notice(missing: &[String]) -> String {
    format!(
        "⚠️ يجب الاشتراك في جميع القنوات التالية للحصول على الخدمة:\n{}",
        missing.join("\n")
    )
}

fn clip(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let keep = max_chars.saturating_sub(3);
    format!("{}...", text.chars().take(keep).collect::<String>())
}
