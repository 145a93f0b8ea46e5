use std::sync::Arc;

use crate::{
    domain::UserId, messaging::port::MessagingPort, roster::RosterStore, Result,
};

/// Channel-subscription gate for non-admin users.
///
/// Not cached: every gated interaction costs one membership query per
/// configured channel, issued one after another.
pub struct SubscriptionGate {
    admin_id: UserId,
    roster: Arc<RosterStore>,
    messenger: Arc<dyn MessagingPort>,
}

impl SubscriptionGate {
    pub fn new(
        admin_id: UserId,
        roster: Arc<RosterStore>,
        messenger: Arc<dyn MessagingPort>,
    ) -> Self {
        Self {
            admin_id,
            roster,
            messenger,
        }
    }

    pub fn is_exempt(&self, user_id: UserId) -> bool {
        user_id == self.admin_id
    }

    /// Configured channels `user_id` has not joined, in roster order.
    ///
    /// A failed membership query counts as "not joined".
    pub async fn unsubscribed_channels(&self, user_id: UserId) -> Result<Vec<String>> {
        if self.is_exempt(user_id) {
            return Ok(Vec::new());
        }

        let mut missing = Vec::new();
        for channel in self.roster.channels()? {
            match self.messenger.member_status(&channel, user_id).await {
                Ok(status) if status.is_subscribed() => {}
                Ok(status) => {
                    tracing::debug!(user_id = user_id.0, channel = %channel, ?status, "not subscribed");
                    missing.push(channel);
                }
                Err(e) => {
                    tracing::warn!(channel = %channel, error = %e, "membership query failed; treating as not subscribed");
                    missing.push(channel);
                }
            }
        }
        Ok(missing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{backup::BackupManager, messaging::types::MemberStatus, testing::FakeMessenger};

    fn roster_with(root: &std::path::Path, channels: &[&str]) -> Arc<RosterStore> {
        let path = root.join("data.json");
        let store = RosterStore::new(path.clone(), BackupManager::new(path, root.join("b"), 10));
        for c in channels {
            store.add_channel(c).unwrap();
        }
        Arc::new(store)
    }

    #[tokio::test]
    async fn reports_exactly_the_one_missing_channel() {
        let root = tempfile::tempdir().unwrap();
        let roster = roster_with(root.path(), &["@a", "@b", "@c", "@d"]);
        let messenger = Arc::new(
            FakeMessenger::default()
                .with_status("@a", MemberStatus::Member)
                .with_status("@b", MemberStatus::Administrator)
                .with_status("@c", MemberStatus::Left)
                .with_status("@d", MemberStatus::Owner),
        );
        let gate = SubscriptionGate::new(UserId(1), roster, messenger.clone());

        assert_eq!(gate.unsubscribed_channels(UserId(99)).await.unwrap(), vec!["@c"]);
        assert_eq!(messenger.query_count(), 4);
    }

    #[tokio::test]
    async fn failed_query_is_treated_as_unsubscribed() {
        let root = tempfile::tempdir().unwrap();
        let roster = roster_with(root.path(), &["@ok", "@broken"]);
        let messenger = Arc::new(FakeMessenger::default().with_status("@ok", MemberStatus::Member));
        let gate = SubscriptionGate::new(UserId(1), roster, messenger);

        assert_eq!(
            gate.unsubscribed_channels(UserId(99)).await.unwrap(),
            vec!["@broken"]
        );
    }

    #[tokio::test]
    async fn restricted_and_banned_do_not_count() {
        let root = tempfile::tempdir().unwrap();
        let roster = roster_with(root.path(), &["@r", "@k"]);
        let messenger = Arc::new(
            FakeMessenger::default()
                .with_status("@r", MemberStatus::Restricted)
                .with_status("@k", MemberStatus::Banned),
        );
        let gate = SubscriptionGate::new(UserId(1), roster, messenger);
        assert_eq!(
            gate.unsubscribed_channels(UserId(5)).await.unwrap(),
            vec!["@r", "@k"]
        );
    }

    #[tokio::test]
    async fn admin_is_exempt_without_any_query() {
        let root = tempfile::tempdir().unwrap();
        let roster = roster_with(root.path(), &["@a"]);
        let messenger = Arc::new(FakeMessenger::default());
        let gate = SubscriptionGate::new(UserId(1), roster, messenger.clone());

        assert!(gate.unsubscribed_channels(UserId(1)).await.unwrap().is_empty());
        assert_eq!(messenger.query_count(), 0);
    }
}
