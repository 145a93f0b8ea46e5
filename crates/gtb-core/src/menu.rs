//! Menu buttons and their callback payloads.
//!
//! Payloads are decoded once into [`MenuAction`] at the boundary; handlers
//! never string-match callback data themselves.

use crate::messaging::types::InlineKeyboard;

/// Telegram rejects callback data longer than this many bytes.
pub const MAX_CALLBACK_DATA: usize = 64;

const REMOVE_PREFIX: &str = "remove:";
const RESTORE_PREFIX: &str = "restore:";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MenuAction {
    TranslateText,
    About,
    AdminPanel,
    UserCount,
    Broadcast,
    AddChannel,
    RemoveChannelMenu,
    RemoveChannel(String),
    ShowChannels,
    CreateBackup,
    RestoreMenu,
    Restore(String),
    BackToMain,
}

impl MenuAction {
    pub fn decode(data: &str) -> Option<Self> {
        if let Some(channel) = data.strip_prefix(REMOVE_PREFIX) {
            return (!channel.is_empty()).then(|| MenuAction::RemoveChannel(channel.to_string()));
        }
        if let Some(file) = data.strip_prefix(RESTORE_PREFIX) {
            return (!file.is_empty()).then(|| MenuAction::Restore(file.to_string()));
        }

        let action = match data {
            "translate_text" => MenuAction::TranslateText,
            "about" => MenuAction::About,
            "admin_panel" => MenuAction::AdminPanel,
            "admin_count" => MenuAction::UserCount,
            "admin_broadcast" => MenuAction::Broadcast,
            "admin_add_channel" => MenuAction::AddChannel,
            "admin_remove_channel" => MenuAction::RemoveChannelMenu,
            "admin_show_channels" => MenuAction::ShowChannels,
            "admin_create_backup" => MenuAction::CreateBackup,
            "admin_restore_backup" => MenuAction::RestoreMenu,
            "back_to_main" => MenuAction::BackToMain,
            _ => return None,
        };
        Some(action)
    }

    pub fn encode(&self) -> String {
        match self {
            MenuAction::TranslateText => "translate_text".to_string(),
            MenuAction::About => "about".to_string(),
            MenuAction::AdminPanel => "admin_panel".to_string(),
            MenuAction::UserCount => "admin_count".to_string(),
            MenuAction::Broadcast => "admin_broadcast".to_string(),
            MenuAction::AddChannel => "admin_add_channel".to_string(),
            MenuAction::RemoveChannelMenu => "admin_remove_channel".to_string(),
            MenuAction::RemoveChannel(ch) => format!("{REMOVE_PREFIX}{ch}"),
            MenuAction::ShowChannels => "admin_show_channels".to_string(),
            MenuAction::CreateBackup => "admin_create_backup".to_string(),
            MenuAction::RestoreMenu => "admin_restore_backup".to_string(),
            MenuAction::Restore(file) => format!("{RESTORE_PREFIX}{file}"),
            MenuAction::BackToMain => "back_to_main".to_string(),
        }
    }

    /// Everything except the public main-menu entries is admin-only.
    pub fn requires_admin(&self) -> bool {
        !matches!(
            self,
            MenuAction::TranslateText | MenuAction::About | MenuAction::BackToMain
        )
    }
}

fn push(kb: &mut InlineKeyboard, label: impl Into<String>, action: &MenuAction) {
    let data = action.encode();
    if data.len() > MAX_CALLBACK_DATA {
        tracing::warn!(payload = %data, "menu entry skipped: callback data too long");
        return;
    }
    kb.push(label, data);
}

pub fn main_menu(is_admin: bool) -> InlineKeyboard {
    let mut kb = InlineKeyboard::default();
    push(&mut kb, "📝 ترجمة نص", &MenuAction::TranslateText);
    push(&mut kb, "ℹ️ معلومات عن البوت", &MenuAction::About);
    if is_admin {
        push(&mut kb, "🛠 لوحة تحكم الأدمِن", &MenuAction::AdminPanel);
    }
    kb
}

pub fn admin_panel() -> InlineKeyboard {
    let mut kb = InlineKeyboard::default();
    push(&mut kb, "📊 عدد المشتركين", &MenuAction::UserCount);
    push(&mut kb, "📣 إرسال رسالة جماعية", &MenuAction::Broadcast);
    push(&mut kb, "➕ إضافة قناة اشتراك", &MenuAction::AddChannel);
    push(&mut kb, "➖ إزالة قناة اشتراك", &MenuAction::RemoveChannelMenu);
    push(&mut kb, "📌 عرض قنوات الاشتراك", &MenuAction::ShowChannels);
    push(&mut kb, "💾 إنشاء نسخة احتياطية", &MenuAction::CreateBackup);
    push(&mut kb, "📂 استعادة نسخة احتياطية", &MenuAction::RestoreMenu);
    push(&mut kb, "↩️ رجوع", &MenuAction::BackToMain);
    kb
}

pub fn channel_removal(channels: &[String]) -> InlineKeyboard {
    let mut kb = InlineKeyboard::default();
    for ch in channels {
        push(&mut kb, ch.clone(), &MenuAction::RemoveChannel(ch.clone()));
    }
    push(&mut kb, "↩️ رجوع", &MenuAction::AdminPanel);
    kb
}

pub fn backup_restore(files: &[String]) -> InlineKeyboard {
    let mut kb = InlineKeyboard::default();
    for f in files {
        push(&mut kb, format!("📄 {f}"), &MenuAction::Restore(f.clone()));
    }
    push(&mut kb, "↩️ رجوع", &MenuAction::AdminPanel);
    kb
}

/// Whether `text` is acceptable as a channel handle: `@` followed by a
/// non-empty name without whitespace, short enough to fit a removal button.
pub fn is_channel_handle(text: &str) -> bool {
    let Some(name) = text.strip_prefix('@') else {
        return false;
    };
    !name.is_empty()
        && !name.chars().any(char::is_whitespace)
        && REMOVE_PREFIX.len() + text.len() <= MAX_CALLBACK_DATA
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_static_action_round_trips() {
        for action in [
            MenuAction::TranslateText,
            MenuAction::About,
            MenuAction::AdminPanel,
            MenuAction::UserCount,
            MenuAction::Broadcast,
            MenuAction::AddChannel,
            MenuAction::RemoveChannelMenu,
            MenuAction::ShowChannels,
            MenuAction::CreateBackup,
            MenuAction::RestoreMenu,
            MenuAction::BackToMain,
        ] {
            assert_eq!(MenuAction::decode(&action.encode()), Some(action));
        }
    }

    #[test]
    fn payload_actions_carry_their_target() {
        assert_eq!(
            MenuAction::decode("remove:@news"),
            Some(MenuAction::RemoveChannel("@news".to_string()))
        );
        assert_eq!(
            MenuAction::decode("restore:manual_backup_20261018_101500.json"),
            Some(MenuAction::Restore(
                "manual_backup_20261018_101500.json".to_string()
            ))
        );
        assert_eq!(MenuAction::decode("remove:"), None);
        assert_eq!(MenuAction::decode("askuser:1:2"), None);
    }

    #[test]
    fn only_public_entries_skip_the_admin_check() {
        assert!(!MenuAction::TranslateText.requires_admin());
        assert!(!MenuAction::BackToMain.requires_admin());
        assert!(MenuAction::Restore("x".into()).requires_admin());
        assert!(MenuAction::UserCount.requires_admin());
    }

    #[test]
    fn admin_entry_only_in_admin_main_menu() {
        assert!(!main_menu(false).callback_data().contains(&"admin_panel"));
        assert!(main_menu(true).callback_data().contains(&"admin_panel"));
    }

    #[test]
    fn list_menus_end_with_back_to_panel() {
        let kb = channel_removal(&["@a".to_string(), "@b".to_string()]);
        assert_eq!(kb.callback_data(), vec!["remove:@a", "remove:@b", "admin_panel"]);

        let kb = backup_restore(&["manual_backup_20261018_101500.json".to_string()]);
        assert_eq!(kb.buttons[0].label, "📄 manual_backup_20261018_101500.json");
        assert_eq!(kb.callback_data().last(), Some(&"admin_panel"));
    }

    #[test]
    fn oversized_payloads_are_left_out() {
        let long = format!("@{}", "x".repeat(80));
        let kb = channel_removal(&[long]);
        assert_eq!(kb.callback_data(), vec!["admin_panel"]);
    }

    #[test]
    fn channel_handle_validation() {
        assert!(is_channel_handle("@news"));
        assert!(!is_channel_handle("news"));
        assert!(!is_channel_handle("@"));
        assert!(!is_channel_handle("@two words"));
        assert!(!is_channel_handle(&format!("@{}", "x".repeat(60))));
    }
}
