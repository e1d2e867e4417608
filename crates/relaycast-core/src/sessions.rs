use std::collections::HashMap;

use tokio::sync::Mutex;

use crate::domain::UserId;

/// An open one-to-one relay between a user and the admin.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Session {
    pub user_id: UserId,
    pub admin_id: UserId,
    pub active: bool,
}

/// At most one session per user.
#[derive(Default)]
pub struct SessionRegistry {
    inner: Mutex<HashMap<UserId, Session>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open (or refresh) the user's session. Overwrites any previous one.
    pub async fn open(&self, user_id: UserId, admin_id: UserId) {
        self.inner.lock().await.insert(
            user_id,
            Session {
                user_id,
                admin_id,
                active: true,
            },
        );
    }

    pub async fn close(&self, user_id: UserId) -> Option<Session> {
        self.inner.lock().await.remove(&user_id)
    }

    pub async fn is_active(&self, user_id: UserId) -> bool {
        self.inner
            .lock()
            .await
            .get(&user_id)
            .is_some_and(|s| s.active)
    }

    /// First open session bound to `admin_id`.
    ///
    /// With several sessions open this is an arbitrary one of them (map iteration
    /// order); there is no most-recent or oldest guarantee.
    pub async fn find_user_by_admin(&self, admin_id: UserId) -> Option<UserId> {
        self.inner
            .lock()
            .await
            .values()
            .find(|s| s.active && s.admin_id == admin_id)
            .map(|s| s.user_id)
    }

    pub async fn count(&self) -> usize {
        self.inner.lock().await.len()
    }
}
