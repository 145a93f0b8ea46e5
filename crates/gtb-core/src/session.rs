use std::collections::HashMap;

use tokio::sync::Mutex;

use crate::domain::UserId;

/// How the next plain text message from a user should be interpreted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SessionMode {
    #[default]
    None,
    Translate,
    Broadcast,
    AddChannel,
}

/// Per-user session modes, owned by the controller.
///
/// A mode is entered from a menu button and survives exactly until the
/// message it was waiting for has been handled (or the user goes back to the
/// main menu).
#[derive(Default)]
pub struct SessionModes {
    inner: Mutex<HashMap<UserId, SessionMode>>,
}

impl SessionModes {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, user_id: UserId) -> SessionMode {
        self.inner
            .lock()
            .await
            .get(&user_id)
            .copied()
            .unwrap_or_default()
    }

    pub async fn set(&self, user_id: UserId, mode: SessionMode) {
        let mut map = self.inner.lock().await;
        if mode == SessionMode::None {
            map.remove(&user_id);
        } else {
            map.insert(user_id, mode);
        }
    }

    /// Clear the mode, returning what it was.
    pub async fn clear(&self, user_id: UserId) -> SessionMode {
        self.inner
            .lock()
            .await
            .remove(&user_id)
            .unwrap_or_default()
    }
}
